/// Interaction rules: what the character can reach, which target wins,
/// and whether an opening leads anywhere.
///
/// Pure functions over entity states. These decide "what is legal"
/// without performing the interaction.
///
/// ## Interactable discovery
/// ┌──────────────────────────────┬────────────────────────────────┐
/// │ Candidate (priority order)    │ In range when                  │
/// ├──────────────────────────────┼────────────────────────────────┤
/// │ exit                          │ |Δx| ≤ r and |Δy| ≤ r of item  │
/// │ lever                         │ same                           │
/// │ box                           │ same                           │
/// │ opening (definition order)    │ ≤ width/2 along the wall and   │
/// │                               │ ≤ reach across it, measured    │
/// │                               │ from the opening's middle tile │
/// │ plate / spike / collectible   │ never (contact-driven)         │
/// └──────────────────────────────┴────────────────────────────────┘
/// Ties inside a priority class go to definition order. Only the
/// character's current container is searched.
///
/// ## Opening pairing
/// ┌──────────────────────────────────────────────┬─────────────┐
/// │ Condition (first matching partner wins)       │ Result      │
/// ├──────────────────────────────────────────────┼─────────────┤
/// │ no flush container with an opening on the     │ Misaligned  │
/// │ opposite wall at the same absolute offset     │             │
/// │ partner container is being dragged            │ Misaligned  │
/// │ partner container is red and not activated    │ Locked      │
/// │ otherwise                                     │ Partner     │
/// └──────────────────────────────────────────────┴─────────────┘

use super::entity::{ChildId, ContainerId, ContainerState, Highlight, ItemKind, OpeningState};
use super::geometry::TileVec;
use super::physics;

/// Something the character can interact with.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Interactable {
    Item { container: ContainerId, item: ChildId },
    Opening { container: ContainerId, opening: ChildId },
}

/// Tile-range test centred on the character.
#[inline]
pub fn in_range(character: TileVec, target: [f64; 2], range: [f64; 2]) -> bool {
    (character[0] as f64 - target[0]).abs() <= range[0]
        && (character[1] as f64 - target[1]).abs() <= range[1]
}

/// Lower value = picked first.
pub fn item_priority(kind: &ItemKind) -> Option<u8> {
    match kind {
        ItemKind::Exit => Some(0),
        ItemKind::Lever { .. } => Some(1),
        ItemKind::Box => Some(2),
        _ => None,
    }
}

/// The interactable the character would use right now, if any.
pub fn find_interactable(
    container: &ContainerState,
    character: TileVec,
    item_range: i32,
    opening_reach: i32,
) -> Option<Interactable> {
    let r = item_range as f64;
    let best_item = container.items.iter()
        .filter_map(|item| item_priority(&item.kind).map(|p| (p, item)))
        .filter(|(_, item)| {
            let target = [item.location[0] as f64, item.location[1] as f64];
            in_range(character, target, [r, r])
        })
        .min_by_key(|(p, _)| *p);
    if let Some((_, item)) = best_item {
        return Some(Interactable::Item { container: container.id, item: item.id });
    }

    container.openings.iter()
        .find(|o| {
            let (anchor, range) = o.range_anchor(container.dimensions, opening_reach as f64);
            in_range(character, anchor, range)
        })
        .map(|o| Interactable::Opening { container: container.id, opening: o.id })
}

/// Where an opening leads.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pairing {
    Partner { container: ContainerId, opening: ChildId },
    Locked,
    Misaligned,
}

impl Pairing {
    pub fn highlight(self) -> Highlight {
        match self {
            Pairing::Partner { .. } => Highlight::Ready,
            Pairing::Locked => Highlight::Locked,
            Pairing::Misaligned => Highlight::Misaligned,
        }
    }
}

/// Absolute tile offset of an opening along its wall.
#[inline]
pub fn absolute_wall_offset(container: &ContainerState, opening: &OpeningState) -> i32 {
    let j = opening.side.normal().other().index();
    opening.location + container.location[j]
}

/// Resolve where `opening` (on `source`) leads, searching every container
/// flush against its wall.
pub fn pair_opening(
    containers: &[ContainerState],
    source: &ContainerState,
    opening: &OpeningState,
) -> Pairing {
    let wanted = opening.side.opposite();
    let offset = absolute_wall_offset(source, opening);
    let mut locked = false;

    for id in physics::adjacent_containers(containers, source, opening.side) {
        let Some(other) = containers.iter().find(|c| c.id == id) else { continue };
        // Off the grid until released; its tile location is stale.
        if other.motion.is_attached() {
            continue;
        }
        for candidate in other.openings.iter().filter(|o| o.side == wanted) {
            if absolute_wall_offset(other, candidate) != offset {
                continue;
            }
            if other.is_locked() {
                locked = true;
                continue;
            }
            return Pairing::Partner { container: other.id, opening: candidate.id };
        }
    }

    if locked { Pairing::Locked } else { Pairing::Misaligned }
}

/// Where the character lands after passing from `from` (on the source
/// container) into `to` (on `target`). The offset along the wall is kept;
/// across it the character is placed just inside the near edge.
pub fn travel_location(
    character: TileVec,
    from: &OpeningState,
    to: &OpeningState,
    target: &ContainerState,
) -> TileVec {
    let i = from.side.normal().index();
    let j = from.side.normal().other().index();
    let mut loc = [0; 2];
    loc[j] = character[j] - from.location + to.location;
    loc[i] = if from.side.is_negative() { target.dimensions[i] - 2 } else { 0 };
    loc
}

/// Does a carried box stay with the character?
#[inline]
pub fn within_carry_range(box_location: TileVec, character: TileVec, carry_range: i32) -> bool {
    let r = carry_range as f64;
    in_range(character, [box_location[0] as f64, box_location[1] as f64], [r, r])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Color, Drag, ItemState, Motion};
    use crate::domain::geometry::{Axis, Rect, Side};

    fn container(id: ContainerId, color: Color, location: TileVec, dimensions: TileVec) -> ContainerState {
        ContainerState {
            id,
            color,
            motion: Motion::for_color(color, Axis::X),
            location,
            dimensions,
            rect: Rect::default(),
            side: vec![],
            activated: if color.has_activation() { Some(false) } else { None },
            openings: vec![],
            items: vec![],
            platforms: vec![],
        }
    }

    fn opening(id: ChildId, container: ContainerId, side: Side, location: i32, width: i32) -> OpeningState {
        OpeningState { id, container, side, location, width, rect: Rect::default(), highlight: Highlight::None }
    }

    fn item(id: ChildId, kind: ItemKind, location: TileVec) -> ItemState {
        ItemState {
            id,
            container: 1,
            kind,
            location,
            dimensions: kind.dimensions(),
            activated: false,
            rect: Rect::default(),
            y_vel: 0.0,
            highlight: Highlight::None,
        }
    }

    #[test]
    fn exit_beats_lever_beats_box() {
        let mut c = container(1, Color::Green, [0, 0], [8, 6]);
        c.items = vec![
            item(1, ItemKind::Box, [3, 3]),
            item(2, ItemKind::Lever { color: Color::Red }, [2, 3]),
            item(3, ItemKind::Spike, [3, 3]),
        ];
        assert_eq!(find_interactable(&c, [3, 3], 1, 2), Some(Interactable::Item { container: 1, item: 2 }));
        c.items.push(item(4, ItemKind::Exit, [4, 2]));
        assert_eq!(find_interactable(&c, [3, 3], 1, 2), Some(Interactable::Item { container: 1, item: 4 }));
    }

    #[test]
    fn ties_go_to_definition_order() {
        let mut c = container(1, Color::Green, [0, 0], [8, 6]);
        c.items = vec![item(1, ItemKind::Box, [4, 3]), item(2, ItemKind::Box, [2, 3])];
        assert_eq!(find_interactable(&c, [3, 3], 1, 2), Some(Interactable::Item { container: 1, item: 1 }));
    }

    #[test]
    fn items_win_over_openings_and_contact_items_never_count() {
        let mut c = container(1, Color::Green, [0, 0], [6, 4]);
        c.openings = vec![opening(1, 1, Side::Right, 2, 2)];
        c.items = vec![item(1, ItemKind::Collectible, [5, 2])];
        assert_eq!(find_interactable(&c, [5, 2], 1, 2), Some(Interactable::Opening { container: 1, opening: 1 }));
        c.items.push(item(2, ItemKind::Box, [5, 3]));
        assert_eq!(find_interactable(&c, [5, 2], 1, 2), Some(Interactable::Item { container: 1, item: 2 }));
        assert_eq!(find_interactable(&c, [0, 0], 1, 2), None);
    }

    #[test]
    fn pairing_needs_opposite_wall_and_matching_offset() {
        let mut a = container(1, Color::Green, [0, 0], [4, 4]);
        a.openings = vec![opening(1, 1, Side::Right, 1, 2)];
        let mut b = container(2, Color::Blue, [4, 1], [4, 4]);
        b.openings = vec![opening(7, 2, Side::Top, 0, 2), opening(8, 2, Side::Left, 0, 2)];
        let all = vec![a.clone(), b];
        assert_eq!(pair_opening(&all, &a, &a.openings[0]), Pairing::Partner { container: 2, opening: 8 });

        let mut shifted = all.clone();
        shifted[1].location = [4, 2];
        assert_eq!(pair_opening(&shifted, &a, &a.openings[0]), Pairing::Misaligned);
    }

    #[test]
    fn locked_red_partner_is_reported() {
        let mut a = container(1, Color::Green, [0, 0], [4, 4]);
        a.openings = vec![opening(1, 1, Side::Bottom, 0, 2)];
        let mut b = container(2, Color::Red, [0, 4], [4, 2]);
        b.openings = vec![opening(1, 2, Side::Top, 0, 2)];
        let mut all = vec![a.clone(), b];
        assert_eq!(pair_opening(&all, &a, &a.openings[0]), Pairing::Locked);
        all[1].activated = Some(true);
        assert_eq!(pair_opening(&all, &a, &a.openings[0]), Pairing::Partner { container: 2, opening: 1 });
    }

    #[test]
    fn dragged_partner_does_not_pair() {
        let mut a = container(1, Color::Green, [0, 0], [4, 4]);
        a.openings = vec![opening(1, 1, Side::Right, 1, 2)];
        let mut b = container(2, Color::Blue, [4, 1], [4, 4]);
        b.openings = vec![opening(1, 2, Side::Left, 0, 2)];
        let mut all = vec![a.clone(), b];
        all[1].motion = Motion::Draggable {
            axis: Axis::X,
            drag: Some(Drag { pointer_offset: 5.0, moving_positive: true }),
        };
        assert_eq!(pair_opening(&all, &a, &a.openings[0]), Pairing::Misaligned);

        all[1].motion = Motion::Draggable { axis: Axis::X, drag: None };
        assert_eq!(pair_opening(&all, &a, &a.openings[0]), Pairing::Partner { container: 2, opening: 1 });
    }

    #[test]
    fn travel_keeps_offset_along_the_wall() {
        let from = opening(1, 1, Side::Right, 1, 2);
        let to = opening(2, 2, Side::Left, 3, 2);
        let target = container(2, Color::Blue, [6, 0], [5, 7]);
        assert_eq!(travel_location([5, 2], &from, &to, &target), [0, 4]);

        let from = opening(1, 1, Side::Top, 2, 2);
        let to = opening(2, 2, Side::Bottom, 0, 2);
        let target = container(2, Color::Blue, [0, 0], [4, 6]);
        assert_eq!(travel_location([3, 0], &from, &to, &target), [1, 4]);
    }

    #[test]
    fn carry_range_is_inclusive() {
        assert!(within_carry_range([0, 0], [3, 3], 3));
        assert!(!within_carry_range([0, 0], [4, 0], 3));
    }
}
