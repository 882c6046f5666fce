/// Logical actions and the held-action flags sampled each tick.
///
/// Keys are mapped to actions through a `Keybinds` table. Movement and
/// jump are level-triggered: the controller records press/release into
/// `Actions`, and each tick samples whatever is held. Interact and pause
/// fire once per press and never sit in `Actions`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Left,
    Right,
    Jump,
    Interact,
    Pause,
}

impl Action {
    pub fn parse(name: &str) -> Option<Action> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Action::Left),
            "right" => Some(Action::Right),
            "jump" => Some(Action::Jump),
            "interact" => Some(Action::Interact),
            "pause" => Some(Action::Pause),
            _ => None,
        }
    }

    /// Actions that fire on press only.
    pub fn is_one_shot(self) -> bool {
        matches!(self, Action::Interact | Action::Pause)
    }
}

/// Held-action flags, owned by the controller and handed to each tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Actions {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Set on the press edge of jump, consumed when the jump fires,
    /// cleared on release. A tick that finds the character airborne
    /// drops it, so a mid-air press never fires on landing. Holding
    /// jump never jumps twice.
    pub jump_armed: bool,
}

impl Actions {
    /// Record a press or release. One-shot actions are ignored here.
    pub fn set(&mut self, action: Action, pressed: bool) {
        match action {
            Action::Left => self.left = pressed,
            Action::Right => self.right = pressed,
            Action::Jump => {
                if pressed && !self.jump {
                    self.jump_armed = true;
                }
                if !pressed {
                    self.jump_armed = false;
                }
                self.jump = pressed;
            }
            Action::Interact | Action::Pause => {}
        }
    }

    /// Release everything (used when the game pauses).
    pub fn clear(&mut self) {
        *self = Actions::default();
    }

    /// Horizontal intent: -1, 0 or 1. Left and right together cancel out.
    pub fn horizontal(&self) -> i32 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Key-binding table
// ══════════════════════════════════════════════════════════════

/// Key name → action. Key names are lowercase: single characters
/// (`"a"`), or named keys (`"left"`, `"space"`, `"esc"`, `"enter"`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keybinds {
    map: HashMap<String, Action>,
}

impl Default for Keybinds {
    fn default() -> Self {
        let mut kb = Keybinds { map: HashMap::new() };
        for (key, action) in [
            ("a", Action::Left),
            ("left", Action::Left),
            ("d", Action::Right),
            ("right", Action::Right),
            ("w", Action::Jump),
            ("up", Action::Jump),
            ("space", Action::Jump),
            ("e", Action::Interact),
            ("enter", Action::Interact),
            ("p", Action::Pause),
            ("esc", Action::Pause),
        ] {
            kb.bind(key, action);
        }
        kb
    }
}

impl Keybinds {
    pub fn empty() -> Self {
        Keybinds { map: HashMap::new() }
    }

    pub fn bind(&mut self, key: &str, action: Action) {
        self.map.insert(key.to_ascii_lowercase(), action);
    }

    /// Build from a name → name table, skipping unknown action names.
    /// Returns the table and the entries that were skipped.
    pub fn from_table(table: &HashMap<String, String>) -> (Self, Vec<String>) {
        let mut kb = Keybinds::empty();
        let mut rejected = Vec::new();
        for (key, name) in table {
            match Action::parse(name) {
                Some(action) => kb.bind(key, action),
                None => rejected.push(format!("{key} = {name}")),
            }
        }
        rejected.sort();
        (kb, rejected)
    }

    /// Overlay `other` on top of this table; `other` wins on conflicts.
    pub fn merged(&self, other: &Keybinds) -> Keybinds {
        let mut map = self.map.clone();
        map.extend(other.map.iter().map(|(k, v)| (k.clone(), *v)));
        Keybinds { map }
    }

    pub fn action_for(&self, key: &str) -> Option<Action> {
        self.map.get(&key.to_ascii_lowercase()).copied()
    }

    /// Keys bound to `action`, sorted, for help text.
    pub fn keys_for(&self, action: Action) -> Vec<&str> {
        let mut keys: Vec<&str> = self.map.iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| k.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}
