/// Container motion: pointer drags and automatic movers.
///
/// ## Drag state machine (blue / red)
///
///   DETACHED ──attach──▶ ATTACHED ──release──▶ DETACHED
///
/// Attach needs a running game, the character outside the container and
/// no other drag in progress. On attach the container's tiles are lifted
/// off the grid; they are written back on release at the snapped tile.
/// While attached the pixel position follows the pointer and the tile
/// location tracks it, but the grid is never touched.
///
/// ## Auto-move (purple / orange)
///
/// Once per tick, one tile toward the positive end when activated and
/// toward the negative end otherwise. Skipped for the container holding
/// the character, and for everything while a drag is in progress.

use log::{debug, info};

use crate::domain::entity::{ContainerId, Drag, Motion};
use crate::domain::physics;
use super::event::GameEvent;
use super::world::World;

// ══════════════════════════════════════════════════════════════
// Dragging
// ══════════════════════════════════════════════════════════════

/// Grab container `id` at absolute `pointer`.
pub fn attach(world: &mut World, id: ContainerId, pointer: [f64; 2]) -> Option<GameEvent> {
    if !world.game.is_running() || world.character_is_in(id) || world.container_is_moving() {
        return None;
    }
    let c = world.container(id)?;
    let Motion::Draggable { axis, drag: None } = c.motion else { return None };

    let pointer_offset = pointer[axis.index()] - c.rect.pos(axis);
    let (location, dimensions) = (c.location, c.dimensions);
    world.grid.write_rect(location, dimensions, false);
    world.update_container(id, |c| {
        c.motion = Motion::Draggable {
            axis,
            drag: Some(Drag { pointer_offset, moving_positive: true }),
        };
    });
    debug!("container {id} attached at {location:?}");
    Some(GameEvent::ContainerAttached { id })
}

/// Follow the pointer with an attached container.
///
/// The move is refused when the tiles just ahead of the leading edge
/// are occupied. Otherwise the tile location is snapped toward the
/// pointer and swept there one tile at a time, so a fast pointer never
/// carries the container through another one.
pub fn drag(world: &mut World, id: ContainerId, pointer: [f64; 2]) {
    let Some(c) = world.container(id) else { return };
    let Motion::Draggable { axis, drag: Some(mut grab) } = c.motion else { return };
    let layout = world.layout;
    let i = axis.index();

    let (min, max) = layout.drag_bounds(axis, c.rect.size(axis));
    let old = c.rect.pos(axis);
    let wanted = (pointer[i] - grab.pointer_offset).min(max).max(min);
    if wanted == old {
        return;
    }
    let positive = wanted > old;
    grab.moving_positive = positive;

    let (location, dimensions) = (c.location, c.dimensions);
    let side = c.side.clone();
    if !physics::leading_edge_clear(&world.grid, location[i], dimensions[i], &side, axis, positive) {
        world.update_container(id, |c| c.motion = Motion::Draggable { axis, drag: Some(grab) });
        return;
    }

    let raw = layout.raw_tile(axis, wanted);
    let target = physics::snap_tile(&world.grid, location, dimensions, axis, raw, positive);
    let reached = physics::sweep(&world.grid, location, dimensions, axis, target);

    let mut pixel = if reached == target { wanted } else { layout.tile_pos(axis, reached) };
    let landed = physics::with_axis(location, axis, reached);
    if !physics::leading_edge_clear(&world.grid, reached, dimensions[i], &side, axis, positive) {
        // Up against something: no part of the rect may cross into it.
        let flush = layout.tile_pos(axis, reached);
        pixel = if positive { pixel.min(flush) } else { pixel.max(flush) };
    }

    world.update_container(id, |c| {
        c.rect.set_pos(axis, pixel);
        c.location = landed;
        c.motion = Motion::Draggable { axis, drag: Some(grab) };
    });
}

/// Drop an attached container on the nearest legal tile.
/// Allowed while paused so a pause never leaves a container in the air.
pub fn release(world: &mut World, id: ContainerId) -> Option<GameEvent> {
    let c = world.container(id)?;
    let Motion::Draggable { axis, drag: Some(grab) } = c.motion else { return None };
    let layout = world.layout;
    let (location, dimensions) = (c.location, c.dimensions);

    let raw = layout.raw_tile(axis, c.rect.pos(axis));
    let target = physics::snap_tile(&world.grid, location, dimensions, axis, raw, grab.moving_positive);
    let settled = physics::sweep(&world.grid, location, dimensions, axis, target);
    let location = physics::with_axis(location, axis, settled);

    world.grid.write_rect(location, dimensions, true);
    world.update_container(id, |c| {
        c.location = location;
        c.rect = layout.tile_rect(location, dimensions);
        c.motion = Motion::Draggable { axis, drag: None };
    });
    info!("container {id} released at {location:?}");
    Some(GameEvent::ContainerReleased { id, location })
}

pub fn release_all(world: &mut World) -> Vec<GameEvent> {
    let attached: Vec<ContainerId> = world.containers.iter()
        .filter(|c| c.motion.is_attached())
        .map(|c| c.id)
        .collect();
    attached.into_iter().filter_map(|id| release(world, id)).collect()
}

/// Topmost container under an absolute pointer position.
pub fn container_at(world: &World, pointer: [f64; 2]) -> Option<ContainerId> {
    let [x, y] = pointer;
    world.containers.iter()
        .rev()
        .find(|c| x >= c.rect.left && x < c.rect.right() && y >= c.rect.top && y < c.rect.bottom())
        .map(|c| c.id)
}

// ══════════════════════════════════════════════════════════════
// Auto-move
// ══════════════════════════════════════════════════════════════

pub fn auto_move(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.container_is_moving() {
        return;
    }
    let movers: Vec<ContainerId> = world.containers.iter()
        .filter(|c| matches!(c.motion, Motion::Auto { .. }))
        .filter(|c| !world.character_is_in(c.id))
        .map(|c| c.id)
        .collect();

    for id in movers {
        let Some(c) = world.container(id) else { continue };
        let Motion::Auto { axis } = c.motion else { continue };
        let positive = c.is_activated();
        let (location, dimensions) = (c.location, c.dimensions);
        let i = axis.index();

        if !physics::leading_edge_clear(&world.grid, location[i], dimensions[i], &c.side, axis, positive) {
            continue;
        }

        world.grid.write_rect(location, dimensions, false);
        let step = if positive { 1 } else { -1 };
        let next = (location[i] + step).clamp(0, physics::max_location(&world.grid, dimensions, axis));
        let moved = physics::with_axis(location, axis, next);
        world.grid.write_rect(moved, dimensions, true);

        if moved != location {
            let rect = world.layout.tile_rect(moved, dimensions);
            world.update_container(id, |c| {
                c.location = moved;
                c.rect = rect;
            });
            events.push(GameEvent::ContainerAutoMoved { id, location: moved });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Color;
    use crate::domain::geometry::{Axis, TileVec};
    use crate::sim::level::tests::world_from_json;

    /// Character in 1, blue x-mover 2, static obstacle 3.
    const CORRIDOR: &str = r#"{
        "id": 1, "dimensions": [12, 4],
        "character": { "startContainer": 1, "startLocation": [0, 0] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 0], "dimensions": [2, 4] },
            { "id": 2, "color": "blue", "movement": "x", "location": [3, 0], "dimensions": [2, 4] },
            { "id": 3, "color": "green", "location": [6, 0], "dimensions": [1, 4] }
        ]
    }"#;

    const LIFT: &str = r#"{
        "id": 2, "dimensions": [12, 6],
        "character": { "startContainer": 1, "startLocation": [0, 0] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 0], "dimensions": [2, 2] },
            { "id": 2, "color": "purple", "location": [4, 0], "dimensions": [2, 2] },
            { "id": 3, "color": "green", "location": [4, 5], "dimensions": [2, 1] }
        ]
    }"#;

    fn location(w: &World, id: ContainerId) -> TileVec {
        w.container(id).map(|c| c.location).unwrap()
    }

    /// Pointer that puts the left edge of a container grabbed 10px in at tile `x`.
    fn pointer_at(w: &World, x: f64) -> [f64; 2] {
        [x * w.layout.block[0] + w.layout.spacing(Axis::X) + 10.0, 50.0]
    }

    fn grab(w: &mut World, id: ContainerId) {
        let rect = w.container(id).unwrap().rect;
        assert!(attach(w, id, [rect.left + 10.0, rect.top + 10.0]).is_some());
    }

    fn footprint_total(w: &World) -> usize {
        w.containers.iter().map(|c| (c.dimensions[0] * c.dimensions[1]) as usize).sum()
    }

    #[test]
    fn attach_lifts_tiles_and_release_writes_them_back() {
        let mut w = world_from_json(CORRIDOR);
        grab(&mut w, 2);
        assert_eq!(w.grid.occupied_count(), footprint_total(&w) - 8);
        assert!(w.container_is_moving());
        assert_eq!(release(&mut w, 2), Some(GameEvent::ContainerReleased { id: 2, location: [3, 0] }));
        assert_eq!(w.grid.occupied_count(), footprint_total(&w));
        assert!(!w.container_is_moving());
    }

    #[test]
    fn attach_is_refused_for_static_occupied_or_paused() {
        let mut w = world_from_json(CORRIDOR);
        assert!(attach(&mut w, 3, [0.0, 0.0]).is_none());
        assert!(attach(&mut w, 1, [0.0, 0.0]).is_none());
        w.character.container = 2;
        assert!(attach(&mut w, 2, [0.0, 0.0]).is_none());
        w.character.container = 1;
        w.game.paused = true;
        assert!(attach(&mut w, 2, [0.0, 0.0]).is_none());
        assert!(attach(&mut w, 42, [0.0, 0.0]).is_none());
    }

    #[test]
    fn drag_never_tunnels_through_a_container() {
        let mut w = world_from_json(CORRIDOR);
        grab(&mut w, 2);
        let far = pointer_at(&w, 9.0);
        drag(&mut w, 2, far);
        assert_eq!(location(&w, 2), [4, 0]);
        let rect = w.container(2).unwrap().rect;
        assert!(rect.right() <= w.layout.tile_pos(Axis::X, 6) + 1e-9);
        release(&mut w, 2);
        assert_eq!(location(&w, 2), [4, 0]);
        assert!(!w.grid.is_occupied(3, 0));
        assert!(w.grid.is_occupied(5, 3));
        assert_eq!(w.grid.occupied_count(), footprint_total(&w));
    }

    #[test]
    fn small_pointer_steps_stop_at_a_thin_blocker() {
        let mut w = world_from_json(CORRIDOR);
        grab(&mut w, 2);
        let wall = w.layout.tile_pos(Axis::X, 6);

        let mut x = 3.0;
        while x <= 9.0 {
            let p = pointer_at(&w, x);
            drag(&mut w, 2, p);
            assert!(location(&w, 2)[0] <= 4);
            assert!(w.container(2).unwrap().rect.right() <= wall + 1e-9);
            x += 0.3;
        }
        assert_eq!(location(&w, 2), [4, 0]);

        // Back off to a position between tiles, then lunge past the blocker.
        let p = pointer_at(&w, 3.3);
        drag(&mut w, 2, p);
        assert_eq!(location(&w, 2), [3, 0]);
        let p = pointer_at(&w, 8.5);
        drag(&mut w, 2, p);
        assert_eq!(location(&w, 2), [4, 0]);
        assert!(w.container(2).unwrap().rect.right() <= wall + 1e-9);

        release(&mut w, 2);
        assert_eq!(location(&w, 2), [4, 0]);
        assert_eq!(w.grid.occupied_count(), footprint_total(&w));
    }

    #[test]
    fn release_snaps_away_from_a_neighbour() {
        let mut w = world_from_json(CORRIDOR);
        grab(&mut w, 2);
        let p = pointer_at(&w, 1.4);
        drag(&mut w, 2, p);
        assert_eq!(location(&w, 2), [2, 0]);
        release(&mut w, 2);
        let c = w.container(2).cloned().unwrap();
        assert_eq!(c.location, [2, 0]);
        assert_eq!(c.rect, w.layout.tile_rect([2, 0], [2, 4]));
    }

    #[test]
    fn drag_is_clamped_to_the_level() {
        let mut w = world_from_json(CORRIDOR);
        w.containers.retain(|c| c.id != 3);
        w.grid.write_rect([6, 0], [1, 4], false);
        grab(&mut w, 2);
        let p = pointer_at(&w, 40.0);
        drag(&mut w, 2, p);
        release(&mut w, 2);
        assert_eq!(location(&w, 2), [10, 0]);
    }

    #[test]
    fn release_all_drops_every_grab() {
        let mut w = world_from_json(CORRIDOR);
        grab(&mut w, 2);
        let events = release_all(&mut w);
        assert_eq!(events.len(), 1);
        assert!(release_all(&mut w).is_empty());
    }

    #[test]
    fn container_at_hits_rects() {
        let w = world_from_json(CORRIDOR);
        let r = w.container(2).unwrap().rect;
        assert_eq!(container_at(&w, [r.left + 1.0, r.top + 1.0]), Some(2));
        assert_eq!(container_at(&w, [r.right() + 1.0, r.top + 1.0]), None);
    }

    #[test]
    fn inactive_mover_stays_against_its_wall() {
        let mut w = world_from_json(LIFT);
        let mut events = vec![];
        auto_move(&mut w, &mut events);
        assert!(events.is_empty());
        assert_eq!(location(&w, 2), [4, 0]);
    }

    #[test]
    fn activated_mover_steps_one_tile_per_tick_until_blocked() {
        let mut w = world_from_json(LIFT);
        w.toggle_activation(Color::Purple);
        let mut events = vec![];
        auto_move(&mut w, &mut events);
        assert_eq!(location(&w, 2), [4, 1]);
        for _ in 0..10 {
            auto_move(&mut w, &mut events);
            assert_eq!(w.grid.occupied_count(), footprint_total(&w));
        }
        assert_eq!(location(&w, 2), [4, 3]);
        assert_eq!(events.len(), 3);
        assert_eq!(w.container(2).unwrap().rect, w.layout.tile_rect([4, 3], [2, 2]));

        w.toggle_activation(Color::Purple);
        auto_move(&mut w, &mut events);
        assert_eq!(location(&w, 2), [4, 2]);
    }

    #[test]
    fn mover_holding_the_character_stays_put() {
        let mut w = world_from_json(LIFT);
        w.toggle_activation(Color::Purple);
        w.character.container = 2;
        let mut events = vec![];
        auto_move(&mut w, &mut events);
        assert_eq!(location(&w, 2), [4, 0]);
    }
}
