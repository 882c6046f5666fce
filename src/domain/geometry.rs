/// Geometry shared by every part of the simulation.
///
/// ## Two coordinate systems
///
///   - TILE:  integer grid cells. All gameplay decisions (occupancy,
///     adjacency, opening alignment, interaction range) happen here.
///   - PIXEL: `f64` screen space. Containers are positioned absolutely
///     inside the viewport; everything inside a container (items,
///     platforms, the character) is positioned relative to the
///     container's interior (its top-left corner inside the border).
///
/// ## Axis-generic access
///
/// Most motion logic is written once and run for either axis. `Axis`
/// indexes `[x, y]` pairs and `Rect` exposes `pos(axis)` / `size(axis)`
/// so the same code moves a container left/right or up/down.

use serde::{Deserialize, Serialize};

/// A tile-space pair, `[x, y]`.
pub type TileVec = [i32; 2];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    #[inline]
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// A wall of a container.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// The axis you cross when walking through this wall.
    /// Left/right walls are crossed along x, top/bottom along y.
    pub fn normal(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::X,
            Side::Top | Side::Bottom => Axis::Y,
        }
    }

    /// Top and left face the negative direction of their axis.
    pub fn is_negative(self) -> bool {
        matches!(self, Side::Top | Side::Left)
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect { left, top, width, height }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[inline]
    pub fn pos(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.left,
            Axis::Y => self.top,
        }
    }

    #[inline]
    pub fn size(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    #[inline]
    pub fn set_pos(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.left = value,
            Axis::Y => self.top = value,
        }
    }

    /// Half-open AABB test: edge-touching rectangles do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left + self.width > other.left
            && self.left < other.left + other.width
            && self.top + self.height > other.top
            && self.top < other.top + other.height
    }

    /// Same rectangle moved down by `dy` pixels.
    pub fn shifted_down(&self, dy: f64) -> Rect {
        Rect { top: self.top + dy, ..*self }
    }
}

// ══════════════════════════════════════════════════════════════
// Layout: where the level box sits in the viewport
// ══════════════════════════════════════════════════════════════

/// The on-screen level box and its pixel/tile ratio.
///
/// The box keeps a 4:3 aspect ratio, is as large as the viewport allows,
/// and is centred on the axis with spare room. `border` is the wall
/// thickness used for every container, derived from the viewport size.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Layout {
    pub border: f64,
    /// Margin left / top of the level box.
    pub origin: [f64; 2],
    /// Width / height of the level box, border excluded.
    pub size: [f64; 2],
    /// Pixels per tile along x / y.
    pub block: [f64; 2],
}

impl Layout {
    pub fn new(viewport: [f64; 2], grid: [usize; 2]) -> Self {
        let [vw, vh] = viewport;
        let border = (vw + vh) / 200.0;
        let double_border = 2.0 * border;
        let four_thirds_height = vh * 4.0 / 3.0;

        let (origin, size) = if vw < four_thirds_height {
            let three_fourths_width = vw * 3.0 / 4.0;
            let margin = (vh - three_fourths_width) / 2.0;
            ([0.0, margin], [vw - double_border, three_fourths_width - double_border])
        } else {
            let margin = (vw - four_thirds_height) / 2.0;
            ([margin, 0.0], [four_thirds_height - double_border, vh - double_border])
        };

        let block = [
            size[0] / grid[0].max(1) as f64,
            size[1] / grid[1].max(1) as f64,
        ];

        Layout { border, origin, size, block }
    }

    /// Distance from the viewport edge to tile 0 along `axis`.
    #[inline]
    pub fn spacing(&self, axis: Axis) -> f64 {
        self.origin[axis.index()] + self.border
    }

    /// Absolute pixel rect of a tile rectangle.
    pub fn tile_rect(&self, location: TileVec, dimensions: TileVec) -> Rect {
        tile_to_pixel(location, dimensions, self.block, self.origin, self.border)
    }

    /// Absolute pixel position of tile coordinate `tile` along `axis`.
    pub fn tile_pos(&self, axis: Axis, tile: i32) -> f64 {
        tile as f64 * self.block[axis.index()] + self.spacing(axis)
    }

    /// Unrounded tile coordinate of an absolute pixel position.
    pub fn raw_tile(&self, axis: Axis, pixel: f64) -> f64 {
        (pixel - self.spacing(axis)) / self.block[axis.index()]
    }

    /// Pixel bounds a container's leading edge may occupy along `axis`.
    pub fn drag_bounds(&self, axis: Axis, container_size: f64) -> (f64, f64) {
        let i = axis.index();
        let min = self.origin[i] + self.border;
        let max = self.origin[i] + self.size[i] - container_size + self.border;
        (min, max)
    }
}

/// Convert a tile rectangle to an absolute pixel rectangle.
pub fn tile_to_pixel(
    location: TileVec,
    dimensions: TileVec,
    block: [f64; 2],
    origin: [f64; 2],
    border: f64,
) -> Rect {
    Rect {
        left: location[0] as f64 * block[0] + origin[0] + border,
        top: location[1] as f64 * block[1] + origin[1] + border,
        width: dimensions[0] as f64 * block[0],
        height: dimensions[1] as f64 * block[1],
    }
}

/// Tile rectangle positioned inside a container interior (no origin, no border).
pub fn interior_rect(location: TileVec, dimensions: [f64; 2], block: [f64; 2]) -> Rect {
    Rect {
        left: location[0] as f64 * block[0],
        top: location[1] as f64 * block[1],
        width: dimensions[0] * block[0],
        height: dimensions[1] * block[1],
    }
}

/// Floor-divide an interior-relative pixel position into a tile location.
pub fn floor_tile(rect: &Rect, block: [f64; 2]) -> TileVec {
    [
        (rect.left / block[0]).floor() as i32,
        (rect.top / block[1]).floor() as i32,
    ]
}

/// Convert a per-frame unit (tiles) into pixels per frame.
#[inline]
pub fn to_pixels_per_frame(unit: f64, block: f64, frame_ms: f64) -> f64 {
    unit * block / frame_ms
}
