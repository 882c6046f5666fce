/// Entities: containers and the things they hold (openings, items,
/// platforms), plus the character and the game state.
///
/// Behaviour is carried by tagged variants rather than string tags:
///   - `Color` picks a container's behaviour class (`Motion`),
///   - `ItemKind` carries only the fields an item type needs
///     (only plates and levers have a colour),
///   - `activated` on a container exists only for red/purple/orange.
///
/// Pixel rects of openings, items, platforms and the character are
/// relative to the interior of the container that holds them.

use serde::{Deserialize, Serialize};

use super::geometry::{Axis, Rect, Side, TileVec};

pub type ContainerId = u32;
pub type ChildId = u32;

// ══════════════════════════════════════════════════════════════
// Colour and behaviour class
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Color {
    Blue,
    Red,
    Green,
    Purple,
    Orange,
    /// Any colour the game has no behaviour for. Static.
    Other,
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "blue" => Color::Blue,
            "red" => Color::Red,
            "green" => Color::Green,
            "purple" => Color::Purple,
            "orange" => Color::Orange,
            _ => Color::Other,
        }
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.name().to_string()
    }
}

impl Color {
    pub fn name(self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Red => "red",
            Color::Green => "green",
            Color::Purple => "purple",
            Color::Orange => "orange",
            Color::Other => "other",
        }
    }

    /// Blue and red containers follow the pointer.
    pub fn is_draggable(self) -> bool {
        matches!(self, Color::Blue | Color::Red)
    }

    /// Purple and orange containers drive themselves.
    pub fn is_auto(self) -> bool {
        matches!(self, Color::Purple | Color::Orange)
    }

    /// Colours that carry an activation flag.
    pub fn has_activation(self) -> bool {
        matches!(self, Color::Red | Color::Purple | Color::Orange)
    }
}

// ══════════════════════════════════════════════════════════════
// Containers
// ══════════════════════════════════════════════════════════════

/// A grab in progress.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct Drag {
    /// Pointer position relative to the container's leading (top/left) edge
    /// along the movement axis, captured on attach.
    pub pointer_offset: f64,
    /// Direction of the latest pointer move.
    pub moving_positive: bool,
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub enum Motion {
    Static,
    Draggable { axis: Axis, drag: Option<Drag> },
    Auto { axis: Axis },
}

impl Motion {
    pub fn for_color(color: Color, axis: Axis) -> Self {
        if color.is_draggable() {
            Motion::Draggable { axis, drag: None }
        } else if color.is_auto() {
            Motion::Auto { axis }
        } else {
            Motion::Static
        }
    }

    pub fn drag(&self) -> Option<Drag> {
        match *self {
            Motion::Draggable { drag, .. } => drag,
            _ => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.drag().is_some()
    }
}

/// Highlight painted on the interactable nearest the character.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub enum Highlight {
    #[default]
    None,
    /// Usable right now.
    Ready,
    /// An opening with no partner lined up on the other side.
    Misaligned,
    /// An opening lined up with a locked red container.
    Locked,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OpeningState {
    pub id: ChildId,
    pub container: ContainerId,
    pub side: Side,
    /// Tile offset along the wall.
    pub location: i32,
    /// Tile span along the wall.
    pub width: i32,
    pub rect: Rect,
    pub highlight: Highlight,
}

impl OpeningState {
    /// Tile the opening is measured from for interaction range, and the
    /// (x, y) ranges allowed around it: half the width along the wall,
    /// `reach` across it.
    pub fn range_anchor(&self, container_dims: TileVec, reach: f64) -> ([f64; 2], [f64; 2]) {
        let parallel = self.width as f64 / 2.0;
        let middle = self.location as f64 + parallel - 1.0;
        match self.side {
            Side::Top => ([middle, 0.0], [parallel, reach]),
            Side::Bottom => ([middle, container_dims[1] as f64], [parallel, reach]),
            Side::Left => ([0.0, middle], [reach, parallel]),
            Side::Right => ([container_dims[0] as f64, middle], [reach, parallel]),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum ItemKind {
    Exit,
    Lever { color: Color },
    Plate { color: Color },
    Box,
    Collectible,
    Spike,
}

impl ItemKind {
    /// Tile footprint. Exits are 2×2, everything else 1×1.
    pub fn dimensions(&self) -> TileVec {
        match self {
            ItemKind::Exit => [2, 2],
            _ => [1, 1],
        }
    }

    /// Height of the drawn shape as a fraction of a tile.
    pub fn height_factor(&self, pressed: bool) -> f64 {
        match self {
            ItemKind::Plate { .. } if pressed => 0.2,
            ItemKind::Plate { .. } => 0.4,
            ItemKind::Lever { .. } => 0.5,
            _ => 1.0,
        }
    }

    /// Collectibles float; everything else falls when unsupported.
    pub fn falls(&self) -> bool {
        !matches!(self, ItemKind::Collectible)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemState {
    pub id: ChildId,
    pub container: ContainerId,
    pub kind: ItemKind,
    pub location: TileVec,
    pub dimensions: TileVec,
    pub activated: bool,
    pub rect: Rect,
    /// Pixels per tick, positive = down.
    pub y_vel: f64,
    pub highlight: Highlight,
}

impl ItemState {
    /// Lever handle angle in degrees.
    pub fn lever_angle(&self) -> Option<f64> {
        match self.kind {
            ItemKind::Lever { .. } => Some(if self.activated { 135.0 } else { 45.0 }),
            _ => None,
        }
    }

    /// Collected collectibles are no longer drawn.
    pub fn is_visible(&self) -> bool {
        !(self.kind == ItemKind::Collectible && self.activated)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlatformState {
    pub id: ChildId,
    pub container: ContainerId,
    pub location: TileVec,
    pub dimensions: TileVec,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContainerState {
    pub id: ContainerId,
    pub color: Color,
    pub motion: Motion,
    /// Tile location of the top-left corner.
    pub location: TileVec,
    pub dimensions: TileVec,
    /// Absolute pixel rect in the viewport.
    pub rect: Rect,
    /// Tiles spanned on the axis the container does not move along.
    /// Fixed at load: a container only ever moves along its own axis.
    pub side: Vec<i32>,
    /// `Some` only for colours that can be activated.
    pub activated: Option<bool>,
    pub openings: Vec<OpeningState>,
    pub items: Vec<ItemState>,
    pub platforms: Vec<PlatformState>,
}

impl ContainerState {
    pub fn is_activated(&self) -> bool {
        self.activated.unwrap_or(false)
    }

    /// Red containers keep their openings shut until activated.
    pub fn is_locked(&self) -> bool {
        self.color == Color::Red && !self.is_activated()
    }

    pub fn item(&self, id: ChildId) -> Option<&ItemState> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn opening(&self, id: ChildId) -> Option<&OpeningState> {
        self.openings.iter().find(|o| o.id == id)
    }

    /// The box the character is carrying, if any.
    pub fn carried_box(&self) -> Option<&ItemState> {
        self.items.iter().find(|i| i.kind == ItemKind::Box && i.activated)
    }
}

// ══════════════════════════════════════════════════════════════
// Character and game state
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Character {
    pub size: TileVec,
    pub container: ContainerId,
    /// Tile location relative to the current container's interior.
    pub location: TileVec,
    pub rect: Rect,
    /// Tiles per frame unit; converted to pixels per tick.
    pub x_vel: f64,
    /// Pixels per tick, negative = up.
    pub y_vel: f64,
    pub y_acc: f64,
    pub y_jump_vel: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameState {
    pub paused: bool,
    pub score: u32,
    pub lives: i32,
    pub complete: bool,
    /// Set by a spike hit: the next hit costs no life and the character
    /// bounces once.
    pub grace: bool,
}

impl GameState {
    pub fn new(score: u32, lives: i32) -> Self {
        GameState { paused: false, score, lives, complete: false, grace: false }
    }

    pub fn is_running(&self) -> bool {
        !self.paused && !self.complete
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if !self.complete {
            return None;
        }
        Some(if self.lives >= 0 { Outcome::Won } else { Outcome::Lost })
    }

    /// Lives as shown to the player.
    pub fn display_lives(&self) -> u32 {
        self.lives.max(0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_known_and_unknown_names() {
        let c: Color = serde_json::from_str("\"purple\"").unwrap();
        assert_eq!(c, Color::Purple);
        let c: Color = serde_json::from_str("\"teal\"").unwrap();
        assert_eq!(c, Color::Other);
        assert!(!Color::Other.is_draggable() && !Color::Other.is_auto());
    }

    #[test]
    fn motion_follows_colour() {
        assert!(matches!(Motion::for_color(Color::Red, Axis::X), Motion::Draggable { axis: Axis::X, drag: None }));
        assert!(matches!(Motion::for_color(Color::Orange, Axis::Y), Motion::Auto { axis: Axis::Y }));
        assert_eq!(Motion::for_color(Color::Green, Axis::X), Motion::Static);
    }

    #[test]
    fn item_kinds_carry_their_own_rules() {
        assert_eq!(ItemKind::Exit.dimensions(), [2, 2]);
        assert_eq!(ItemKind::Spike.dimensions(), [1, 1]);
        assert!(!ItemKind::Collectible.falls());
        assert_eq!(ItemKind::Plate { color: Color::Red }.height_factor(true), 0.2);
        assert_eq!(ItemKind::Lever { color: Color::Red }.height_factor(true), 0.5);
    }

    #[test]
    fn outcome_depends_on_lives() {
        let mut g = GameState::new(10000, 0);
        assert_eq!(g.outcome(), None);
        g.complete = true;
        assert_eq!(g.outcome(), Some(Outcome::Won));
        g.lives = -1;
        assert_eq!(g.outcome(), Some(Outcome::Lost));
        assert_eq!(g.display_lives(), 0);
    }

    #[test]
    fn opening_range_anchor_sits_on_its_wall() {
        let o = OpeningState {
            id: 1,
            container: 1,
            side: Side::Right,
            location: 2,
            width: 2,
            rect: Rect::default(),
            highlight: Highlight::None,
        };
        let (anchor, range) = o.range_anchor([6, 5], 2.0);
        assert_eq!(anchor, [6.0, 2.0]);
        assert_eq!(range, [2.0, 1.0]);
    }
}
