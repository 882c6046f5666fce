/// Driver state: which screen is up and the level being played.
///
/// ## Phase transitions
///
///   LevelSelect ──enter──▶ Playing
///   Playing ──won, enter──▶ EnterInitials ──enter──▶ Leaderboard
///   Playing ──lost, enter──▶ Playing (same level, fresh)
///   Playing ──quit from pause / complete──▶ LevelSelect
///   Leaderboard ──enter / esc──▶ LevelSelect
///
/// The world itself only knows RUNNING / PAUSED / COMPLETE; everything
/// around it lives here.

use log::{info, warn};

use crate::config::GameConfig;
use crate::domain::action::{Actions, Keybinds};
use crate::domain::entity::ContainerId;
use crate::sim::leaderboard::{self, Entry, LeaderboardError};
use crate::sim::level::{self, LevelDef, LoadError};
use crate::sim::world::World;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    LevelSelect,
    Playing,
    EnterInitials,
    Leaderboard,
}

pub struct App {
    pub phase: Phase,
    pub config: GameConfig,
    pub levels: Vec<LevelDef>,

    // ── Level select ──
    pub select_cursor: usize,

    // ── Current level ──
    pub current: usize,
    pub world: Option<World>,
    pub actions: Actions,
    /// Configured keybinds with the level's own bindings merged on top.
    pub keybinds: Keybinds,
    /// Container following the mouse, if any.
    pub dragging: Option<ContainerId>,

    // ── Leaderboard ──
    pub initials: String,
    pub board: Vec<Entry>,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
}

impl App {
    pub fn new(config: GameConfig, levels: Vec<LevelDef>) -> Self {
        let keybinds = config.keybinds.clone();
        App {
            phase: Phase::LevelSelect,
            config,
            levels,
            select_cursor: 0,
            current: 0,
            world: None,
            actions: Actions::default(),
            keybinds,
            dragging: None,
            initials: String::new(),
            board: vec![],
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    // ── Level select ──

    pub fn select_prev(&mut self) {
        self.select_cursor = self.select_cursor.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.select_cursor + 1 < self.levels.len() {
            self.select_cursor += 1;
        }
    }

    /// Build a fresh world for level `index` and start playing it.
    pub fn start_level(&mut self, index: usize, viewport: [f64; 2]) -> Result<(), LoadError> {
        let Some(def) = self.levels.get(index) else {
            warn!("no level at index {index}");
            return Ok(());
        };
        let world = level::build_world(def, viewport, self.config.sim)?;
        info!("starting level {} \"{}\"", def.id, def.name);
        self.keybinds = def.keybinds(&self.config.keybinds);
        self.current = index;
        self.world = Some(world);
        self.actions = Actions::default();
        self.dragging = None;
        self.phase = Phase::Playing;
        Ok(())
    }

    pub fn back_to_select(&mut self) {
        if self.world.take().is_some() {
            self.select_cursor = self.current;
        }
        self.dragging = None;
        self.actions = Actions::default();
        self.phase = Phase::LevelSelect;
    }

    // ── Leaderboard ──

    pub fn begin_initials(&mut self) {
        self.initials.clear();
        self.phase = Phase::EnterInitials;
    }

    /// Accepts letters and digits up to three characters.
    pub fn push_initial(&mut self, c: char) {
        if self.initials.len() < 3 && c.is_ascii_alphanumeric() {
            self.initials.push(c.to_ascii_uppercase());
        }
    }

    pub fn pop_initial(&mut self) {
        self.initials.pop();
    }

    /// Record the finished level's score under the typed initials and
    /// show the board.
    pub fn submit_initials(&mut self) -> Result<(), LeaderboardError> {
        let Some(world) = self.world.as_ref() else {
            return Ok(());
        };
        let (level_id, score) = (world.level_id, world.game.score);
        leaderboard::add_entry(&self.config.leaderboard_dir, level_id, &self.initials, score)?;
        self.show_leaderboard(level_id);
        Ok(())
    }

    pub fn show_leaderboard(&mut self, level_id: u32) {
        let entries = leaderboard::read_entries(&self.config.leaderboard_dir, level_id);
        self.board = leaderboard::sorted_by_score(entries);
        self.phase = Phase::Leaderboard;
    }

    /// Level id shown on the leaderboard screen.
    pub fn board_level_id(&self) -> Option<u32> {
        self.world.as_ref().map(|w| w.level_id)
            .or_else(|| self.levels.get(self.select_cursor).map(|d| d.id))
    }
}
