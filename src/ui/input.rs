/// Input state tracker.
///
/// Turns raw terminal events into what the game consumes:
///   - held keys, for the level-triggered actions (left, right, jump),
///   - fresh presses, for one-shot actions (interact, pause) and menus,
///   - left-button pointer events, for dragging containers,
///   - the latest terminal size after a resize.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::domain::action::{Action, Keybinds};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Left-button pointer activity, in terminal cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerEvent {
    Down { col: u16, row: u16 },
    Drag { col: u16, row: u16 },
    Up { col: u16, row: u16 },
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Level-triggered actions reported as held on the previous
    /// `action_transitions` call.
    held_actions: Vec<Action>,

    /// Raw key events collected during drain, for menus and text entry.
    pub raw_events: Vec<KeyEvent>,

    pub pointer_events: Vec<PointerEvent>,

    /// New terminal size (cols, rows) if a resize arrived this drain.
    pub resized: Option<(u16, u16)>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            held_actions: Vec::with_capacity(4),
            raw_events: Vec::with_capacity(8),
            pointer_events: Vec::with_capacity(8),
            resized: None,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.pointer_events.clear();
        self.resized = None;

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.apply(ev, Instant::now()),
                Err(_) => break,
            }
        }

        self.expire(Instant::now());
    }

    fn apply(&mut self, ev: Event, now: Instant) {
        match ev {
            Event::Key(key) => {
                self.raw_events.push(key);
                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&key.code);
                    }
                    // Without enhancement, rely on timeout-based expiry.
                    KeyEventKind::Release => {}
                    _ => {
                        let was_held = self.is_held_at(key.code, now);
                        self.last_active.insert(key.code, now);
                        if !was_held {
                            self.fresh_presses.push(key.code);
                        }
                    }
                }
            }
            Event::Mouse(mouse) => {
                if let Some(p) = pointer_event(mouse) {
                    self.pointer_events.push(p);
                }
            }
            Event::Resize(cols, rows) => self.resized = Some((cols, rows)),
            _ => {}
        }
    }

    /// Expire keys that have timed out (fallback for terminals without Release).
    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Action presses and releases since the last call.
    ///
    ///   one-shot (interact, pause)  → (action, true) on each fresh press
    ///   held (left, right, jump)    → (action, true) when the first bound
    ///                                 key goes down, (action, false) when
    ///                                 the last bound key comes up
    pub fn action_transitions(&mut self, keybinds: &Keybinds) -> Vec<(Action, bool)> {
        let mut out = Vec::new();

        for code in &self.fresh_presses {
            if let Some(action) = key_name(*code).and_then(|k| keybinds.action_for(&k)) {
                if action.is_one_shot() {
                    out.push((action, true));
                }
            }
        }

        let mut held: Vec<Action> = self.last_active.keys()
            .filter_map(|code| key_name(*code).and_then(|k| keybinds.action_for(&k)))
            .filter(|a| !a.is_one_shot())
            .collect();
        held.sort_by_key(|a| *a as u8);
        held.dedup();

        for a in &self.held_actions {
            if !held.contains(a) {
                out.push((*a, false));
            }
        }
        for a in &held {
            if !self.held_actions.contains(a) {
                out.push((*a, true));
            }
        }
        self.held_actions = held;
        out
    }

    /// Forget every held key and pending press, e.g. when a level starts
    /// or the game pauses.
    pub fn reset_held(&mut self) {
        self.last_active.clear();
        self.fresh_presses.clear();
        self.held_actions.clear();
    }

    // ── Internal ──

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active.get(&code)
            .map(|t| self.honor_release || now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

fn pointer_event(mouse: MouseEvent) -> Option<PointerEvent> {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down { col, row }),
        MouseEventKind::Drag(MouseButton::Left) => Some(PointerEvent::Drag { col, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up { col, row }),
        _ => None,
    }
}

/// Key name as used in keybind tables, or `None` for keys that can't be bound.
pub fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_lowercase().to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => return None,
    };
    Some(name)
}
