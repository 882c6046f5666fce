/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.json` files, sorted by id)
///   2. Built-in embedded levels
///
/// ## Level format (`.json`, camelCase keys):
///   ```
///   { "id": 1, "name": "First Steps", "description": "...", "difficulty": 1,
///     "dimensions": [16, 12],
///     "character": { "startContainer": 1, "startLocation": [1, 3] },
///     "containers": [
///       { "id": 1, "color": "green", "movement": "y",
///         "location": [0, 4], "dimensions": [6, 5],
///         "openings":  [ { "id": 1, "border": "right", "location": 2, "width": 2 } ],
///         "items":     [ { "id": 1, "itemType": "lever", "location": [3, 4], "color": "red" } ],
///         "platforms": [ { "id": 1, "location": [0, 2], "dimensions": [2, 1] } ] } ],
///     "keybinds": { "k": "jump" } }
///   ```
///
/// A definition is validated in full before any state is built; a world
/// is either completely constructed or not at all.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::config::SimConfig;
use crate::domain::action::Keybinds;
use crate::domain::entity::{
    Character, ChildId, Color, ContainerId, ContainerState, GameState, Highlight, ItemKind,
    ItemState, Motion, OpeningState, PlatformState,
};
use crate::domain::geometry::{Axis, Layout, Rect, Side, TileVec};
use crate::domain::grid::Grid;
use crate::sim::world::World;

// ══════════════════════════════════════════════════════════════
// Definitions (immutable, as loaded)
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDef {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: u8,
    pub dimensions: [usize; 2],
    pub character: CharacterDef,
    pub containers: Vec<ContainerDef>,
    #[serde(default)]
    pub keybinds: HashMap<String, String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDef {
    pub start_container: ContainerId,
    pub start_location: TileVec,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDef {
    pub id: ContainerId,
    pub color: Color,
    #[serde(default = "default_movement")]
    pub movement: Axis,
    pub location: TileVec,
    pub dimensions: TileVec,
    #[serde(default)]
    pub openings: Vec<OpeningDef>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub platforms: Vec<PlatformDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OpeningDef {
    pub id: ChildId,
    pub border: Side,
    pub location: i32,
    pub width: i32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDef {
    pub id: ChildId,
    pub item_type: String,
    pub location: TileVec,
    #[serde(default)]
    pub color: Option<Color>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlatformDef {
    pub id: ChildId,
    pub location: TileVec,
    pub dimensions: TileVec,
}

fn default_movement() -> Axis {
    Axis::Y
}

impl LevelDef {
    /// Key table for this level: its own bindings over `base`.
    pub fn keybinds(&self, base: &Keybinds) -> Keybinds {
        if self.keybinds.is_empty() {
            return base.clone();
        }
        let (own, rejected) = Keybinds::from_table(&self.keybinds);
        for entry in rejected {
            warn!("level {}: ignoring keybind with unknown action: {entry}", self.id);
        }
        base.merged(&own)
    }
}

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level has zero width or height")]
    EmptyGrid,
    #[error("duplicate container id {0}")]
    DuplicateContainer(ContainerId),
    #[error("container {0} is empty or lies outside the level")]
    ContainerOutOfBounds(ContainerId),
    #[error("containers {0} and {1} overlap")]
    Overlap(ContainerId, ContainerId),
    #[error("start container {0} does not exist")]
    MissingStartContainer(ContainerId),
    #[error("start location {location:?} is outside container {container}")]
    StartOutside { container: ContainerId, location: TileVec },
    #[error("duplicate {what} id {id} in container {container}")]
    DuplicateChild { what: &'static str, container: ContainerId, id: ChildId },
    #[error("opening {opening} of container {container} runs past its wall")]
    OpeningOutOfBounds { container: ContainerId, opening: ChildId },
    #[error("{what} {id} of container {container} lies outside it")]
    ChildOutOfBounds { what: &'static str, container: ContainerId, id: ChildId },
    #[error("{kind} {item} of container {container} has no colour")]
    MissingColor { kind: &'static str, container: ContainerId, item: ChildId },
    #[error("item {item} of container {container} has unknown type '{item_type}'")]
    UnknownItemType { container: ContainerId, item: ChildId, item_type: String },
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

pub fn parse_level(text: &str) -> Result<LevelDef, LoadError> {
    let def: LevelDef = serde_json::from_str(text)?;
    validate(&def)?;
    Ok(def)
}

pub fn load_level_file(path: &Path) -> Result<LevelDef, LoadError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    parse_level(&text)
}

/// Levels from `dir` if it holds any valid ones, otherwise the embedded set.
pub fn available_levels(dir: &Path) -> Vec<LevelDef> {
    let levels = load_from_directory(dir);
    if levels.is_empty() {
        info!("no levels in {}, using built-in levels", dir.display());
        embedded_levels()
    } else {
        info!("loaded {} levels from {}", levels.len(), dir.display());
        levels
    }
}

/// Build a running world from a definition.
pub fn build_world(def: &LevelDef, viewport: [f64; 2], sim: SimConfig) -> Result<World, LoadError> {
    validate(def)?;

    let [w, h] = def.dimensions;
    let grid = Grid::from_footprints(w, h, def.containers.iter().map(|c| (c.location, c.dimensions)));
    let layout = Layout::new(viewport, def.dimensions);

    let containers = def.containers.iter()
        .map(build_container)
        .collect::<Result<Vec<_>, _>>()?;

    let character = Character {
        size: [1, 1],
        container: def.character.start_container,
        location: def.character.start_location,
        rect: Rect::default(),
        x_vel: sim.physics.x_vel,
        y_vel: 0.0,
        y_acc: sim.physics.y_acc,
        y_jump_vel: sim.physics.y_jump_vel,
    };

    let mut world = World {
        level_id: def.id,
        level_name: def.name.clone(),
        grid,
        layout,
        containers,
        character,
        game: GameState::new(sim.rules.start_score, sim.rules.start_lives),
        tick: 0,
        sim,
    };
    world.relayout(viewport);
    info!("level {} '{}' loaded: {} containers", def.id, def.name, world.containers.len());
    Ok(world)
}

// ══════════════════════════════════════════════════════════════
// Validation
// ══════════════════════════════════════════════════════════════

fn validate(def: &LevelDef) -> Result<(), LoadError> {
    let [w, h] = def.dimensions;
    if w == 0 || h == 0 {
        return Err(LoadError::EmptyGrid);
    }
    let (w, h) = (w as i32, h as i32);

    let mut ids = HashSet::new();
    for c in &def.containers {
        if !ids.insert(c.id) {
            return Err(LoadError::DuplicateContainer(c.id));
        }
        let [x, y] = c.location;
        let [cw, ch] = c.dimensions;
        if cw <= 0 || ch <= 0 || x < 0 || y < 0 || x + cw > w || y + ch > h {
            return Err(LoadError::ContainerOutOfBounds(c.id));
        }
        validate_children(c)?;
    }

    for (i, a) in def.containers.iter().enumerate() {
        for b in &def.containers[i + 1..] {
            if tiles_overlap(a.location, a.dimensions, b.location, b.dimensions) {
                return Err(LoadError::Overlap(a.id, b.id));
            }
        }
    }

    let start = def.character.start_container;
    let Some(container) = def.containers.iter().find(|c| c.id == start) else {
        return Err(LoadError::MissingStartContainer(start));
    };
    let loc = def.character.start_location;
    if !inside(loc, [1, 1], container.dimensions) {
        return Err(LoadError::StartOutside { container: start, location: loc });
    }
    Ok(())
}

fn validate_children(c: &ContainerDef) -> Result<(), LoadError> {
    let mut seen = HashSet::new();
    for o in &c.openings {
        if !seen.insert(o.id) {
            return Err(LoadError::DuplicateChild { what: "opening", container: c.id, id: o.id });
        }
        let wall = c.dimensions[o.border.normal().other().index()];
        if o.width <= 0 || o.location < 0 || o.location + o.width > wall {
            return Err(LoadError::OpeningOutOfBounds { container: c.id, opening: o.id });
        }
    }

    let mut seen = HashSet::new();
    for i in &c.items {
        if !seen.insert(i.id) {
            return Err(LoadError::DuplicateChild { what: "item", container: c.id, id: i.id });
        }
        let kind = item_kind(c.id, i)?;
        if !inside(i.location, kind.dimensions(), c.dimensions) {
            return Err(LoadError::ChildOutOfBounds { what: "item", container: c.id, id: i.id });
        }
    }

    let mut seen = HashSet::new();
    for p in &c.platforms {
        if !seen.insert(p.id) {
            return Err(LoadError::DuplicateChild { what: "platform", container: c.id, id: p.id });
        }
        if p.dimensions[0] <= 0 || p.dimensions[1] <= 0 || !inside(p.location, p.dimensions, c.dimensions) {
            return Err(LoadError::ChildOutOfBounds { what: "platform", container: c.id, id: p.id });
        }
    }
    Ok(())
}

fn item_kind(container: ContainerId, def: &ItemDef) -> Result<ItemKind, LoadError> {
    let colored = |kind: &'static str| {
        def.color.ok_or(LoadError::MissingColor { kind, container, item: def.id })
    };
    match def.item_type.as_str() {
        "exit" => Ok(ItemKind::Exit),
        "lever" => Ok(ItemKind::Lever { color: colored("lever")? }),
        "plate" => Ok(ItemKind::Plate { color: colored("plate")? }),
        "box" => Ok(ItemKind::Box),
        "collectible" => Ok(ItemKind::Collectible),
        "spike" => Ok(ItemKind::Spike),
        other => Err(LoadError::UnknownItemType {
            container,
            item: def.id,
            item_type: other.to_string(),
        }),
    }
}

fn inside(location: TileVec, dimensions: TileVec, bounds: TileVec) -> bool {
    location[0] >= 0
        && location[1] >= 0
        && location[0] + dimensions[0] <= bounds[0]
        && location[1] + dimensions[1] <= bounds[1]
}

fn tiles_overlap(al: TileVec, ad: TileVec, bl: TileVec, bd: TileVec) -> bool {
    al[0] < bl[0] + bd[0] && al[0] + ad[0] > bl[0] && al[1] < bl[1] + bd[1] && al[1] + ad[1] > bl[1]
}

// ══════════════════════════════════════════════════════════════
// State construction
// ══════════════════════════════════════════════════════════════

fn build_container(def: &ContainerDef) -> Result<ContainerState, LoadError> {
    let motion = Motion::for_color(def.color, def.movement);
    let across = def.movement.other().index();
    let side = (0..def.dimensions[across]).map(|k| def.location[across] + k).collect();

    let openings = def.openings.iter()
        .map(|o| OpeningState {
            id: o.id,
            container: def.id,
            side: o.border,
            location: o.location,
            width: o.width,
            rect: Rect::default(),
            highlight: Highlight::None,
        })
        .collect();

    let items = def.items.iter()
        .map(|i| {
            let kind = item_kind(def.id, i)?;
            Ok(ItemState {
                id: i.id,
                container: def.id,
                kind,
                location: i.location,
                dimensions: kind.dimensions(),
                activated: false,
                rect: Rect::default(),
                y_vel: 0.0,
                highlight: Highlight::None,
            })
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    let platforms = def.platforms.iter()
        .map(|p| PlatformState {
            id: p.id,
            container: def.id,
            location: p.location,
            dimensions: p.dimensions,
            rect: Rect::default(),
        })
        .collect();

    Ok(ContainerState {
        id: def.id,
        color: def.color,
        motion,
        location: def.location,
        dimensions: def.dimensions,
        rect: Rect::default(),
        side,
        activated: if def.color.has_activation() { Some(false) } else { None },
        openings,
        items,
        platforms,
    })
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .json files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };

    let mut levels: Vec<LevelDef> = vec![];
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "json") {
            match load_level_file(&path) {
                Ok(def) => {
                    if levels.iter().any(|l| l.id == def.id) {
                        warn!("{}: duplicate level id {}, skipped", path.display(), def.id);
                    } else {
                        levels.push(def);
                    }
                }
                Err(e) => warn!("{}: {e}", path.display()),
            }
        }
    }
    levels.sort_by_key(|l| l.id);
    levels
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

const EMBEDDED: &[&str] = &[
    r#"{
        "id": 1, "name": "First Steps", "difficulty": 1,
        "description": "Drag the blue room into line and walk through.",
        "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [1, 3] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 4], "dimensions": [6, 5],
              "openings": [ { "id": 1, "border": "right", "location": 2, "width": 2 } ],
              "items": [ { "id": 1, "itemType": "collectible", "location": [3, 2] } ] },
            { "id": 2, "color": "blue", "movement": "y", "location": [6, 0], "dimensions": [5, 5],
              "openings": [ { "id": 1, "border": "left", "location": 2, "width": 2 },
                            { "id": 2, "border": "right", "location": 2, "width": 2 } ] },
            { "id": 3, "color": "green", "location": [11, 4], "dimensions": [5, 5],
              "openings": [ { "id": 1, "border": "left", "location": 2, "width": 2 } ],
              "items": [ { "id": 1, "itemType": "exit", "location": [2, 3] } ] }
        ]
    }"#,
    r#"{
        "id": 2, "name": "Red Light", "difficulty": 2,
        "description": "Red rooms stay shut until something red is switched on.",
        "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [1, 3] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 4], "dimensions": [6, 5],
              "openings": [ { "id": 1, "border": "right", "location": 2, "width": 2 } ],
              "items": [ { "id": 1, "itemType": "lever", "location": [3, 4], "color": "red" } ] },
            { "id": 2, "color": "red", "movement": "y", "location": [6, 0], "dimensions": [5, 5],
              "openings": [ { "id": 1, "border": "left", "location": 2, "width": 2 },
                            { "id": 2, "border": "right", "location": 2, "width": 2 } ],
              "items": [ { "id": 1, "itemType": "collectible", "location": [2, 1] } ],
              "platforms": [ { "id": 1, "location": [2, 2], "dimensions": [2, 1] } ] },
            { "id": 3, "color": "green", "location": [11, 3], "dimensions": [5, 6],
              "openings": [ { "id": 1, "border": "left", "location": 3, "width": 2 } ],
              "items": [ { "id": 1, "itemType": "spike", "location": [2, 5] },
                         { "id": 2, "itemType": "exit", "location": [3, 4] } ] }
        ]
    }"#,
    r#"{
        "id": 3, "name": "Moving Parts", "difficulty": 3,
        "description": "Weigh the plate down and let the purple room come to you.",
        "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [5, 5] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 6], "dimensions": [7, 6],
              "openings": [ { "id": 1, "border": "right", "location": 3, "width": 2 } ],
              "items": [ { "id": 1, "itemType": "box", "location": [2, 5] },
                         { "id": 2, "itemType": "plate", "location": [4, 5], "color": "purple" },
                         { "id": 3, "itemType": "collectible", "location": [0, 2] } ],
              "platforms": [ { "id": 1, "location": [0, 3], "dimensions": [2, 1] } ] },
            { "id": 2, "color": "purple", "movement": "y", "location": [7, 0], "dimensions": [4, 5],
              "openings": [ { "id": 1, "border": "left", "location": 3, "width": 2 },
                            { "id": 2, "border": "right", "location": 3, "width": 2 } ] },
            { "id": 3, "color": "green", "location": [11, 4], "dimensions": [5, 7],
              "openings": [ { "id": 1, "border": "left", "location": 5, "width": 2 } ],
              "items": [ { "id": 1, "itemType": "exit", "location": [2, 5] },
                         { "id": 2, "itemType": "spike", "location": [4, 6] } ] },
            { "id": 4, "color": "green", "location": [7, 11], "dimensions": [4, 1] }
        ]
    }"#,
];

/// Built-in levels. These are validated like any file; one that fails is
/// logged and left out.
pub fn embedded_levels() -> Vec<LevelDef> {
    EMBEDDED.iter()
        .filter_map(|text| match parse_level(text) {
            Ok(def) => Some(def),
            Err(e) => {
                log::error!("built-in level rejected: {e}");
                None
            }
        })
        .collect()
}
