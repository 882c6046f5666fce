/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use std::collections::HashMap;
use std::path::PathBuf;

use log::warn;
use serde::Deserialize;

use crate::domain::action::Keybinds;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub keybinds: Keybinds,
    pub levels_dir: PathBuf,
    pub leaderboard_dir: PathBuf,
    pub log_file: PathBuf,
}

/// Everything the simulation reads while it runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    /// Tick period, and the frame unit used to convert tile speeds.
    pub frame_ms: f64,
    pub physics: PhysicsConfig,
    pub rules: RulesConfig,
}

/// Character/item kinematics, in tiles per frame unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub x_vel: f64,
    pub y_acc: f64,
    pub y_jump_vel: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RulesConfig {
    pub start_score: u32,
    pub score_decay: u32,
    pub collectible_bonus: u32,
    pub start_lives: i32,
    pub interact_range: i32,
    pub carry_range: i32,
    pub opening_reach: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        let t = TomlConfig::default();
        SimConfig::from_toml(&t)
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    keybinds: HashMap<String, String>,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_ms")]
    frame_ms: f64,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_x_vel")]
    x_vel: f64,
    #[serde(default = "default_y_acc")]
    y_acc: f64,
    #[serde(default = "default_y_jump_vel")]
    y_jump_vel: f64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_start_score")]
    start_score: u32,
    #[serde(default = "default_score_decay")]
    score_decay: u32,
    #[serde(default = "default_collectible_bonus")]
    collectible_bonus: u32,
    #[serde(default = "default_start_lives")]
    start_lives: i32,
    #[serde(default = "default_interact_range")]
    interact_range: i32,
    #[serde(default = "default_carry_range")]
    carry_range: i32,
    #[serde(default = "default_opening_reach")]
    opening_reach: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default)]
    leaderboard_dir: Option<String>,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_frame_ms() -> f64 { 1000.0 / 60.0 }
fn default_x_vel() -> f64 { 3.0 }
fn default_y_acc() -> f64 { 1.0 }
fn default_y_jump_vel() -> f64 { -13.0 }   // up is negative
fn default_start_score() -> u32 { 10000 }  // ~2.7 minutes of ticks at 60Hz
fn default_score_decay() -> u32 { 1 }
fn default_collectible_bonus() -> u32 { 1000 }
fn default_start_lives() -> i32 { 3 }
fn default_interact_range() -> i32 { 1 }
fn default_carry_range() -> i32 { 3 }
fn default_opening_reach() -> i32 { 2 }
fn default_levels_dir() -> String { "levels".into() }
fn default_log_file() -> String { "uncontained.log".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { frame_ms: default_frame_ms() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            x_vel: default_x_vel(),
            y_acc: default_y_acc(),
            y_jump_vel: default_y_jump_vel(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            start_score: default_start_score(),
            score_decay: default_score_decay(),
            collectible_bonus: default_collectible_bonus(),
            start_lives: default_start_lives(),
            interact_range: default_interact_range(),
            carry_range: default_carry_range(),
            opening_reach: default_opening_reach(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            leaderboard_dir: None,
            log_file: default_log_file(),
        }
    }
}

impl SimConfig {
    fn from_toml(t: &TomlConfig) -> Self {
        // A zero or negative frame would divide every speed by zero.
        let frame_ms = if t.timing.frame_ms > 0.0 { t.timing.frame_ms } else { default_frame_ms() };
        SimConfig {
            frame_ms,
            physics: PhysicsConfig {
                x_vel: t.physics.x_vel,
                y_acc: t.physics.y_acc,
                y_jump_vel: t.physics.y_jump_vel,
            },
            rules: RulesConfig {
                start_score: t.rules.start_score,
                score_decay: t.rules.score_decay,
                collectible_bonus: t.rules.collectible_bonus,
                start_lives: t.rules.start_lives,
                interact_range: t.rules.interact_range,
                carry_range: t.rules.carry_range,
                opening_reach: t.rules.opening_reach,
            },
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let leaderboard_dir = match &toml_cfg.general.leaderboard_dir {
            Some(dir) => PathBuf::from(dir),
            None => default_leaderboard_dir(),
        };

        let keybinds = if toml_cfg.keybinds.is_empty() {
            Keybinds::default()
        } else {
            let (table, rejected) = Keybinds::from_table(&toml_cfg.keybinds);
            for entry in rejected {
                warn!("config.toml: ignoring keybind with unknown action: {entry}");
            }
            Keybinds::default().merged(&table)
        };

        GameConfig {
            sim: SimConfig::from_toml(&toml_cfg),
            keybinds,
            levels_dir,
            leaderboard_dir,
            log_file: PathBuf::from(&toml_cfg.general.log_file),
        }
    }
}

/// Per-user data directory, e.g. `~/.local/share/uncontained/leaderboard`.
fn default_leaderboard_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("uncontained")
        .join("leaderboard")
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text),
                Err(e) => warn!("could not read {}: {e}", path.display()),
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config.toml parse error, using default settings: {e}");
            TomlConfig::default()
        }
    }
}
