/// Occupancy grid: which tiles of the level are covered by a container.
///
/// Indexed `[x][y]` (columns first). `true` = some container's footprint
/// covers the tile. The grid is rewritten only when a container lifts off
/// (grab / auto-move start) or lands (release / auto-move end); a container
/// being dragged is never in the grid.

use super::geometry::TileVec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    cells: Vec<Vec<bool>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid { width, height, cells: vec![vec![false; height]; width] }
    }

    /// Grid with every footprint in `rects` (location, dimensions) marked.
    pub fn from_footprints(
        width: usize,
        height: usize,
        rects: impl IntoIterator<Item = (TileVec, TileVec)>,
    ) -> Self {
        let mut g = Grid::new(width, height);
        for (location, dimensions) in rects {
            g.write_rect(location, dimensions, true);
        }
        g
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Is (x, y) occupied? Out of bounds counts as occupied (the level wall).
    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        self.cells[x as usize][y as usize]
    }

    /// Mark (`value = true`) or lift (`false`) every tile of a footprint.
    /// Tiles outside the grid are ignored.
    pub fn write_rect(&mut self, location: TileVec, dimensions: TileVec, value: bool) {
        for x in location[0]..location[0] + dimensions[0] {
            for y in location[1]..location[1] + dimensions[1] {
                if self.in_bounds(x, y) {
                    self.cells[x as usize][y as usize] = value;
                }
            }
        }
    }

    /// True if any tile covered by the footprint is occupied
    /// (or lies outside the level).
    pub fn rect_occupied(&self, location: TileVec, dimensions: TileVec) -> bool {
        (location[0]..location[0] + dimensions[0])
            .any(|x| (location[1]..location[1] + dimensions[1]).any(|y| self.is_occupied(x, y)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| **c).count()
    }
}
