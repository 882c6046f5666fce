/// Collision, adjacency and snapping queries.
///
/// Pure functions over the occupancy grid and entity states. Nothing
/// here mutates the world; the motion and character systems call these
/// and apply the results.
///
/// ## Axis-generic container queries
///
/// A container moves along one axis (`axis`). Its "leading edge" is the
/// row/column of tiles just past its footprint in the direction of
/// travel, spanning the full breadth on the other axis. Every container
/// query below is written once in terms of `axis.index()` /
/// `axis.other().index()` and works for both x and y movers.

use super::entity::{ContainerId, ContainerState, PlatformState};
use super::geometry::{Axis, Rect, Side, TileVec};
use super::grid::Grid;

// ══════════════════════════════════════════════════════════════
// Pixel collision
// ══════════════════════════════════════════════════════════════

/// First platform overlapping `rect` (both in the same container's
/// interior space), in definition order.
pub fn colliding_platform<'a>(rect: &Rect, platforms: &'a [PlatformState]) -> Option<&'a PlatformState> {
    platforms.iter().find(|p| rect.overlaps(&p.rect))
}

/// Is something at `rect` resting on a platform? Probes one pixel below.
pub fn resting_on_platform(rect: &Rect, platforms: &[PlatformState]) -> bool {
    colliding_platform(&rect.shifted_down(1.0), platforms).is_some()
}

/// Lowest `top` an entity of `height` may take inside an interior of
/// `interior_height`.
#[inline]
pub fn floor_top(interior_height: f64, height: f64) -> f64 {
    (interior_height - height).max(0.0)
}

/// Is an entity at `rect` above both the floor and every platform?
pub fn is_in_air(rect: &Rect, interior_height: f64, platforms: &[PlatformState]) -> bool {
    if resting_on_platform(rect, platforms) {
        return false;
    }
    rect.top < floor_top(interior_height, rect.height)
}

// ══════════════════════════════════════════════════════════════
// Adjacency
// ══════════════════════════════════════════════════════════════

/// Containers flush against `side` of `source`: zero gap on the side's
/// axis, and a strict overlap of spans on the other axis (corner
/// contact does not count). Returned in store order.
pub fn adjacent_containers(
    containers: &[ContainerState],
    source: &ContainerState,
    side: Side,
) -> Vec<ContainerId> {
    let i = side.normal().index();
    let j = side.normal().other().index();
    let (loc, dim) = (source.location, source.dimensions);

    containers.iter()
        .filter(|other| other.id != source.id)
        .filter(|other| {
            let (oloc, odim) = (other.location, other.dimensions);
            let flush = if side.is_negative() {
                loc[i] == oloc[i] + odim[i]
            } else {
                loc[i] + dim[i] == oloc[i]
            };
            let spans_overlap = loc[j] < oloc[j] + odim[j] && loc[j] + dim[j] > oloc[j];
            flush && spans_overlap
        })
        .map(|other| other.id)
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Container motion queries (tile space)
// ══════════════════════════════════════════════════════════════

/// `location` with its `axis` component replaced.
#[inline]
pub fn with_axis(location: TileVec, axis: Axis, value: i32) -> TileVec {
    let mut l = location;
    l[axis.index()] = value;
    l
}

/// Largest legal location on `axis` for a footprint of `dimensions`.
#[inline]
pub fn max_location(grid: &Grid, dimensions: TileVec, axis: Axis) -> i32 {
    let len = match axis {
        Axis::X => grid.width,
        Axis::Y => grid.height,
    } as i32;
    (len - dimensions[axis.index()]).max(0)
}

/// Is the row/column just ahead of the footprint free across its whole
/// breadth? `position` and `length` are the footprint on `axis`; `side`
/// lists the tiles it spans on the other axis. The probe is clamped to
/// the level, so a container already against the wall probes its own
/// (lifted) edge tiles.
pub fn leading_edge_clear(
    grid: &Grid,
    position: i32,
    length: i32,
    side: &[i32],
    axis: Axis,
    positive: bool,
) -> bool {
    let i = axis.index();
    let j = axis.other().index();
    let len = match axis {
        Axis::X => grid.width,
        Axis::Y => grid.height,
    } as i32;
    let ahead = if positive {
        (position + length).min(len - 1)
    } else {
        (position - 1).max(0)
    };

    side.iter().all(|&k| {
        let mut probe = [0; 2];
        probe[i] = ahead;
        probe[j] = k;
        !grid.is_occupied(probe[0], probe[1])
    })
}

/// Can the footprint sit at `value` on `axis` without leaving the level
/// or covering an occupied tile?
pub fn footprint_free(grid: &Grid, location: TileVec, dimensions: TileVec, axis: Axis, value: i32) -> bool {
    value >= 0
        && value <= max_location(grid, dimensions, axis)
        && !grid.rect_occupied(with_axis(location, axis, value), dimensions)
}

/// Nearest legal tile for an unrounded tile position `raw` on `axis`.
///
/// Tries, in order: the rounded tile, the other neighbour of `raw`
/// (floor if it rounded up, ceil if it rounded down), then walks from the
/// rounded tile back against the direction of travel, then forward.
/// Falls back to the current location if nothing is free.
pub fn snap_tile(
    grid: &Grid,
    location: TileVec,
    dimensions: TileVec,
    axis: Axis,
    raw: f64,
    positive: bool,
) -> i32 {
    let max = max_location(grid, dimensions, axis);
    let free = |v: i32| footprint_free(grid, location, dimensions, axis, v);

    let rounded = (raw.round() as i32).clamp(0, max);
    if free(rounded) {
        return rounded;
    }
    let alternate = if raw < rounded as f64 { raw.floor() } else { raw.ceil() } as i32;
    if free(alternate) {
        return alternate;
    }

    let back = if positive { -1 } else { 1 };
    for step in [back, -back] {
        let mut v = rounded + step;
        while (0..=max).contains(&v) {
            if free(v) {
                return v;
            }
            v += step;
        }
    }
    location[axis.index()]
}

/// Walk from the current location toward `target` one tile at a time and
/// stop before the first blocked footprint. Never skips over a container.
pub fn sweep(grid: &Grid, location: TileVec, dimensions: TileVec, axis: Axis, target: i32) -> i32 {
    let mut current = location[axis.index()];
    let step = (target - current).signum();
    while current != target {
        let next = current + step;
        if !footprint_free(grid, location, dimensions, axis, next) {
            break;
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Color, Motion};

    fn container(id: ContainerId, location: TileVec, dimensions: TileVec) -> ContainerState {
        ContainerState {
            id,
            color: Color::Blue,
            motion: Motion::for_color(Color::Blue, Axis::X),
            location,
            dimensions,
            rect: Rect::default(),
            side: vec![],
            activated: None,
            openings: vec![],
            items: vec![],
            platforms: vec![],
        }
    }

    fn platform(rect: Rect) -> PlatformState {
        PlatformState { id: 1, container: 1, location: [0, 0], dimensions: [1, 1], rect }
    }

    // ── adjacency ──

    #[test]
    fn adjacency_requires_flush_edge_and_span_overlap() {
        let a = container(1, [0, 0], [4, 4]);
        let right_a = container(2, [4, 1], [2, 2]);
        let right_b = container(3, [4, 3], [2, 3]);
        let corner = container(4, [4, 4], [2, 2]);
        let gap = container(5, [5, 0], [1, 1]);
        let all = vec![a.clone(), right_a, right_b, corner, gap];

        assert_eq!(adjacent_containers(&all, &a, Side::Right), vec![2, 3]);
        assert!(adjacent_containers(&all, &a, Side::Left).is_empty());
        assert!(adjacent_containers(&all, &a, Side::Bottom).is_empty());
    }

    #[test]
    fn adjacency_is_symmetric() {
        let a = container(1, [0, 0], [3, 3]);
        let b = container(2, [1, 3], [3, 2]);
        let all = vec![a.clone(), b.clone()];
        assert_eq!(adjacent_containers(&all, &a, Side::Bottom), vec![2]);
        assert_eq!(adjacent_containers(&all, &b, Side::Top), vec![1]);
    }

    // ── leading edge ──

    #[test]
    fn leading_edge_checks_full_breadth() {
        // mover at [2,0] 2×3, obstacle touches only its lowest row
        let g = Grid::from_footprints(10, 6, [([4, 2], [1, 1])]);
        assert!(!leading_edge_clear(&g, 2, 2, &[0, 1, 2], Axis::X, true));
        assert!(leading_edge_clear(&g, 2, 2, &[0, 1, 2], Axis::X, false));
        assert!(leading_edge_clear(&g, 2, 2, &[0, 1], Axis::X, true));
    }

    #[test]
    fn leading_edge_at_wall_probes_own_edge() {
        let g = Grid::new(6, 6);
        assert!(leading_edge_clear(&g, 4, 2, &[0, 1], Axis::Y, true));
        assert!(leading_edge_clear(&g, 0, 2, &[0, 1], Axis::Y, false));
    }

    // ── snapping ──

    #[test]
    fn snap_rounds_to_the_nearest_free_tile() {
        let g = Grid::new(10, 4);
        assert_eq!(snap_tile(&g, [0, 0], [2, 2], Axis::X, 3.4, true), 3);
        assert_eq!(snap_tile(&g, [0, 0], [2, 2], Axis::X, 3.6, true), 4);
        assert_eq!(snap_tile(&g, [0, 0], [2, 2], Axis::X, 42.0, true), 8);
    }

    #[test]
    fn snap_backs_off_a_collision() {
        // obstacle at x=6; 2-wide mover rounding to 5 would cover it
        let g = Grid::from_footprints(10, 4, [([6, 0], [1, 4])]);
        assert_eq!(snap_tile(&g, [0, 0], [2, 2], Axis::X, 4.6, true), 4);
        assert_eq!(snap_tile(&g, [0, 0], [2, 2], Axis::X, 5.5, true), 4);
        // approaching from the right, walks forward past the obstacle
        assert_eq!(snap_tile(&g, [9, 0], [2, 2], Axis::X, 6.2, false), 7);
    }

    #[test]
    fn snap_is_idempotent() {
        let g = Grid::from_footprints(12, 4, [([7, 0], [2, 4])]);
        for raw in [0.0, 1.3, 4.49, 5.7, 6.1, 9.9] {
            let once = snap_tile(&g, [0, 0], [2, 2], Axis::X, raw, true);
            let twice = snap_tile(&g, [0, 0], [2, 2], Axis::X, once as f64, true);
            assert_eq!(once, twice, "raw = {raw}");
        }
    }

    // ── sweep ──

    #[test]
    fn sweep_stops_before_an_obstacle() {
        let g = Grid::from_footprints(12, 4, [([6, 0], [1, 4])]);
        assert_eq!(sweep(&g, [1, 0], [2, 2], Axis::X, 9), 4);
        assert_eq!(sweep(&g, [1, 0], [2, 2], Axis::X, 3), 3);
        assert_eq!(sweep(&g, [9, 0], [2, 2], Axis::X, 0), 7);
    }

    // ── platforms / air ──

    #[test]
    fn standing_on_a_platform_is_not_in_air() {
        let p = vec![platform(Rect::new(0.0, 100.0, 60.0, 20.0))];
        let on = Rect::new(10.0, 70.0, 30.0, 30.0);
        let above = Rect::new(10.0, 60.0, 30.0, 30.0);
        let beside = Rect::new(70.0, 70.0, 30.0, 30.0);
        assert!(!is_in_air(&on, 300.0, &p));
        assert!(is_in_air(&above, 300.0, &p));
        assert!(is_in_air(&beside, 300.0, &p));
        assert!(!is_in_air(&Rect::new(70.0, 270.0, 30.0, 30.0), 300.0, &p));
    }
}
