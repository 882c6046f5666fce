/// World: the complete state of a running level.
///
/// ## Entity store
///
/// `containers` is the single source of truth. Openings, items and
/// platforms live inside their owning container and are only reached
/// through it:
///   - `container(id)` / `item(cid, iid)` look up by id, `None` if absent,
///   - `update_container(id, f)` / `update_item(cid, iid, f)` / ... apply a
///     closure to one record and report whether it existed.
///
/// Callers treat a missing id as "skip this effect", never as a crash.
///
/// ## Coordinates
///
/// Container rects are absolute (viewport pixels). Everything inside a
/// container, character included, is relative to that container's
/// interior: `interior = rect size − 2 × border`.

use serde::Serialize;

use crate::config::SimConfig;
use crate::domain::entity::{
    Character, ChildId, Color, ContainerId, ContainerState, GameState, ItemKind, ItemState,
    OpeningState, PlatformState,
};
use crate::domain::geometry::{self, Layout, Rect, Side, TileVec};
use crate::domain::grid::Grid;
use crate::domain::physics;

pub struct World {
    // ── Level ──
    pub level_id: u32,
    pub level_name: String,
    pub grid: Grid,
    pub layout: Layout,

    // ── Entities ──
    pub containers: Vec<ContainerState>,
    pub character: Character,

    // ── Game tracking ──
    pub game: GameState,
    pub tick: u64,

    pub sim: SimConfig,
}

/// Owned, read-only copy of everything the presentation layer draws.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub containers: Vec<ContainerState>,
    pub character: Character,
    pub game: GameState,
    pub border: f64,
}

// ── Lookup / update-by-id ──

impl World {
    pub fn container(&self, id: ContainerId) -> Option<&ContainerState> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut ContainerState> {
        self.containers.iter_mut().find(|c| c.id == id)
    }

    pub fn item(&self, container: ContainerId, item: ChildId) -> Option<&ItemState> {
        self.container(container).and_then(|c| c.item(item))
    }

    pub fn opening(&self, container: ContainerId, opening: ChildId) -> Option<&OpeningState> {
        self.container(container).and_then(|c| c.opening(opening))
    }

    pub fn update_container(&mut self, id: ContainerId, f: impl FnOnce(&mut ContainerState)) -> bool {
        match self.container_mut(id) {
            Some(c) => {
                f(c);
                true
            }
            None => false,
        }
    }

    pub fn update_item(
        &mut self,
        container: ContainerId,
        item: ChildId,
        f: impl FnOnce(&mut ItemState),
    ) -> bool {
        self.container_mut(container)
            .and_then(|c| c.items.iter_mut().find(|i| i.id == item))
            .map(f)
            .is_some()
    }

    pub fn update_opening(
        &mut self,
        container: ContainerId,
        opening: ChildId,
        f: impl FnOnce(&mut OpeningState),
    ) -> bool {
        self.container_mut(container)
            .and_then(|c| c.openings.iter_mut().find(|o| o.id == opening))
            .map(f)
            .is_some()
    }

    pub fn update_platform(
        &mut self,
        container: ContainerId,
        platform: ChildId,
        f: impl FnOnce(&mut PlatformState),
    ) -> bool {
        self.container_mut(container)
            .and_then(|c| c.platforms.iter_mut().find(|p| p.id == platform))
            .map(f)
            .is_some()
    }

    /// The container the character is in.
    pub fn character_container(&self) -> Option<&ContainerState> {
        self.container(self.character.container)
    }

    #[inline]
    pub fn character_is_in(&self, id: ContainerId) -> bool {
        self.character.container == id
    }

    /// Is any container mid-drag?
    pub fn container_is_moving(&self) -> bool {
        self.containers.iter().any(|c| c.motion.is_attached())
    }
}

// ── Derived geometry ──

impl World {
    /// Interior size of a container in pixels.
    pub fn interior(&self, container: &ContainerState) -> [f64; 2] {
        interior_of(&container.rect, self.layout.border)
    }

    /// Tile speed → pixels per tick on `axis_index`.
    pub fn per_frame(&self, unit: f64, axis_index: usize) -> f64 {
        geometry::to_pixels_per_frame(unit, self.layout.block[axis_index], self.sim.frame_ms)
    }

    /// Recompute tile location of the character from its pixel rect.
    pub fn relocate_character(&mut self) {
        self.character.location = geometry::floor_tile(&self.character.rect, self.layout.block);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            containers: self.containers.clone(),
            character: self.character.clone(),
            game: self.game.clone(),
            border: self.layout.border,
        }
    }
}

// ── Activation ──

impl World {
    /// Flip `activated` on every container of `color`. Returns how many
    /// containers changed.
    pub fn toggle_activation(&mut self, color: Color) -> usize {
        let mut n = 0;
        for c in self.containers.iter_mut().filter(|c| c.color == color) {
            if let Some(a) = c.activated.as_mut() {
                *a = !*a;
                n += 1;
            }
        }
        n
    }
}

// ── Layout ──

impl World {
    /// Lay every rect out again from tile locations for a new viewport.
    /// Items and the character are clamped into their container's interior.
    pub fn relayout(&mut self, viewport: [f64; 2]) {
        self.layout = Layout::new(viewport, [self.grid.width, self.grid.height]);
        let layout = self.layout;

        for c in &mut self.containers {
            c.rect = layout.tile_rect(c.location, c.dimensions);
            let interior = interior_of(&c.rect, layout.border);
            for o in &mut c.openings {
                o.rect = opening_rect(o.side, o.location, o.width, c.dimensions, &layout);
            }
            for p in &mut c.platforms {
                p.rect = geometry::interior_rect(p.location, dims_f64(p.dimensions), layout.block);
            }
            for i in &mut c.items {
                i.rect = item_rect(&i.kind, i.location, i.dimensions, i.activated, layout.block);
                clamp_into(&mut i.rect, interior);
            }
        }

        let interior = self.character_container()
            .map(|c| interior_of(&c.rect, layout.border))
            .unwrap_or([0.0, 0.0]);
        self.character.rect = character_rect(self.character.location, self.character.size, layout.block);
        clamp_into(&mut self.character.rect, interior);
    }
}

// ══════════════════════════════════════════════════════════════
// Rect builders (shared with level construction)
// ══════════════════════════════════════════════════════════════

#[inline]
fn dims_f64(d: TileVec) -> [f64; 2] {
    [d[0] as f64, d[1] as f64]
}

pub fn interior_of(rect: &Rect, border: f64) -> [f64; 2] {
    [(rect.width - 2.0 * border).max(0.0), (rect.height - 2.0 * border).max(0.0)]
}

/// Keep `rect` inside an interior of `size`, top-left first.
pub fn clamp_into(rect: &mut Rect, size: [f64; 2]) {
    rect.left = rect.left.min(size[0] - rect.width).max(0.0);
    rect.top = rect.top.min(physics::floor_top(size[1], rect.height)).max(0.0);
}

pub fn character_rect(location: TileVec, size: TileVec, block: [f64; 2]) -> Rect {
    geometry::interior_rect(location, dims_f64(size), block)
}

/// Item rect inside its container. Plates are 0.4 of a tile tall and sink
/// to 0.2 while pressed; lever bases are half a tile.
pub fn item_rect(kind: &ItemKind, location: TileVec, dimensions: TileVec, pressed: bool, block: [f64; 2]) -> Rect {
    let mut rect = geometry::interior_rect(location, dims_f64(dimensions), block);
    rect.height *= kind.height_factor(pressed);
    if pressed && matches!(kind, ItemKind::Plate { .. }) {
        rect.top += 0.2 * block[1];
    }
    rect
}

/// An opening is a gap cut into the wall band, so it sits one border
/// outside the interior on its side.
pub fn opening_rect(side: Side, location: i32, width: i32, container_dims: TileVec, layout: &Layout) -> Rect {
    let bs = layout.block;
    let border = layout.border;
    let along_x = location as f64 * bs[0];
    let along_y = location as f64 * bs[1];
    match side {
        Side::Top => Rect::new(along_x, -border, width as f64 * bs[0], border),
        Side::Bottom => Rect::new(
            along_x,
            container_dims[1] as f64 * bs[1] - 2.0 * border,
            width as f64 * bs[0],
            border,
        ),
        Side::Left => Rect::new(-border, along_y, border, width as f64 * bs[1]),
        Side::Right => Rect::new(
            container_dims[0] as f64 * bs[0] - 2.0 * border,
            along_y,
            border,
            width as f64 * bs[1],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::tests::world_from_json;

    const TWO_ROOMS: &str = r#"{
        "id": 1, "name": "t", "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [1, 2] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 0], "dimensions": [6, 5],
              "openings": [], "items": [ { "id": 1, "itemType": "box", "location": [3, 4] } ],
              "platforms": [] },
            { "id": 2, "color": "red", "location": [6, 0], "dimensions": [4, 5],
              "openings": [], "items": [], "platforms": [] },
            { "id": 3, "color": "red", "location": [10, 0], "dimensions": [4, 5],
              "openings": [], "items": [], "platforms": [] }
        ]
    }"#;

    #[test]
    fn lookups_return_none_for_missing_ids() {
        let w = world_from_json(TWO_ROOMS);
        assert!(w.container(99).is_none());
        assert!(w.item(1, 99).is_none());
        assert!(w.item(99, 1).is_none());
        assert!(w.opening(1, 1).is_none());
    }

    #[test]
    fn update_by_id_reports_presence() {
        let mut w = world_from_json(TWO_ROOMS);
        assert!(w.update_item(1, 1, |i| i.activated = true));
        assert!(w.item(1, 1).map_or(false, |i| i.activated));
        assert!(!w.update_item(1, 2, |i| i.activated = true));
        assert!(!w.update_container(42, |c| c.location = [0, 0]));
        assert!(!w.update_platform(1, 1, |_| {}));
    }

    #[test]
    fn activation_toggles_every_container_of_a_colour() {
        let mut w = world_from_json(TWO_ROOMS);
        assert_eq!(w.toggle_activation(Color::Red), 2);
        assert!(w.container(2).map_or(false, |c| c.is_activated()));
        assert!(w.container(3).map_or(false, |c| c.is_activated()));
        // green has no activation flag
        assert_eq!(w.toggle_activation(Color::Green), 0);
        assert_eq!(w.container(1).and_then(|c| c.activated), None);
    }

    #[test]
    fn relayout_rebuilds_rects_from_tiles() {
        let mut w = world_from_json(TWO_ROOMS);
        w.relayout([1600.0, 1200.0]);
        let c = w.container(2).cloned().unwrap();
        let expected = w.layout.tile_rect([6, 0], [4, 5]);
        assert_eq!(c.rect, expected);
        let r = w.character.rect;
        assert!((r.left - w.layout.block[0]).abs() < 1e-9);
        assert!((r.width - w.layout.block[0]).abs() < 1e-9);
    }

    #[test]
    fn snapshot_is_a_detached_copy() {
        let mut w = world_from_json(TWO_ROOMS);
        let snap = w.snapshot();
        w.game.score = 1;
        w.containers.clear();
        assert_eq!(snap.containers.len(), 3);
        assert_eq!(snap.game.score, 10000);
    }

    #[test]
    fn pressed_plate_sinks() {
        let kind = ItemKind::Plate { color: Color::Red };
        let up = item_rect(&kind, [1, 2], [1, 1], false, [10.0, 10.0]);
        let down = item_rect(&kind, [1, 2], [1, 1], true, [10.0, 10.0]);
        assert!((up.height - 4.0).abs() < 1e-9);
        assert!((down.height - 2.0).abs() < 1e-9);
        assert!((down.top - up.top - 2.0).abs() < 1e-9);
    }
}
