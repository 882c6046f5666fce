/// Entry point and game loop.

mod app;
mod config;
mod domain;
mod sim;
mod ui;

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEventKind};
use log::{info, warn};

use app::{App, Phase};
use config::GameConfig;
use domain::entity::Outcome;
use sim::event::GameEvent;
use sim::{level, motion, step};
use ui::input::{InputState, PointerEvent};
use ui::renderer::{self, Renderer};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Ticks a status message stays on screen.
const MESSAGE_TICKS: u32 = 90;

fn main() {
    let config = GameConfig::load();
    init_logging(&config.log_file);
    info!("uncontained {} starting", env!("CARGO_PKG_VERSION"));

    let levels = level::available_levels(&config.levels_dir);
    let mut app = App::new(config, levels);

    let mut renderer = Renderer::new();
    let honor_release = match renderer.init() {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let result = game_loop(&mut app, &mut renderer, honor_release);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Uncontained!");
}

/// Logs go to a file: the terminal is in raw mode on the alternate screen.
fn init_logging(path: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled, cannot open {}: {e}", path.display());
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn game_loop(app: &mut App, renderer: &mut Renderer, honor_release: bool) -> Result<(), Box<dyn Error>> {
    let mut input = InputState::new();
    input.honor_release = honor_release;
    let tick_rate = Duration::from_secs_f64(app.config.sim.frame_ms / 1000.0);
    let mut last_tick = Instant::now();

    loop {
        input.drain_events();

        if input.ctrl_c_pressed() {
            break;
        }
        if let Some((cols, rows)) = input.resized {
            on_resize(app, &mut input, cols, rows);
        }
        if handle_meta(app, &mut input, renderer.size()) {
            break;
        }
        if app.phase == Phase::Playing {
            handle_play_input(app, &mut input);
        }

        if last_tick.elapsed() >= tick_rate {
            app.anim_tick = app.anim_tick.wrapping_add(1);
            app.tick_message();

            if app.phase == Phase::Playing {
                if let Some(world) = app.world.as_mut() {
                    let events = step::step(world, &mut app.actions);
                    announce(app, &events);
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(app)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('j')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
const KEYS_BACK: &[KeyCode] = &[KeyCode::Esc];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_BOARD: &[KeyCode] = &[KeyCode::Char('l'), KeyCode::Char('L')];

fn start_level(app: &mut App, input: &mut InputState, index: usize, size: (u16, u16)) {
    input.reset_held();
    if let Err(e) = app.start_level(index, renderer::viewport(size.0, size.1)) {
        warn!("level {index} failed to load: {e}");
        app.back_to_select();
        app.set_message(&format!("Cannot load level: {e}"), MESSAGE_TICKS * 2);
    }
}

/// Screen-level keys. Returns true when the player quits.
fn handle_meta(app: &mut App, input: &mut InputState, size: (u16, u16)) -> bool {
    let confirm = input.any_pressed(KEYS_CONFIRM);
    let back = input.any_pressed(KEYS_BACK);

    match app.phase {
        // ── Level Select ──
        Phase::LevelSelect => {
            if input.any_pressed(KEYS_UP) {
                app.select_prev();
            } else if input.any_pressed(KEYS_DOWN) {
                app.select_next();
            } else if confirm {
                let index = app.select_cursor;
                start_level(app, input, index, size);
            } else if input.any_pressed(KEYS_BOARD) {
                if let Some(id) = app.levels.get(app.select_cursor).map(|d| d.id) {
                    app.show_leaderboard(id);
                }
            } else if back || input.any_pressed(KEYS_QUIT) {
                return true;
            }
        }

        // ── Playing: pause menu and end-of-level prompt ──
        Phase::Playing => {
            let Some((complete, paused, outcome)) = app.world.as_ref()
                .map(|w| (w.game.complete, w.game.paused, w.game.outcome()))
            else {
                app.back_to_select();
                return false;
            };
            if complete {
                if confirm {
                    if outcome == Some(Outcome::Won) {
                        app.begin_initials();
                    } else {
                        let index = app.current;
                        start_level(app, input, index, size);
                    }
                } else if back || input.any_pressed(KEYS_QUIT) {
                    app.back_to_select();
                }
            } else if paused {
                if input.any_pressed(KEYS_RESTART) {
                    let index = app.current;
                    start_level(app, input, index, size);
                } else if input.any_pressed(KEYS_QUIT) {
                    app.back_to_select();
                }
            }
        }

        // ── Initials ──
        Phase::EnterInitials => {
            if confirm {
                if let Err(e) = app.submit_initials() {
                    warn!("score not saved: {e}");
                    app.set_message(&e.to_string(), MESSAGE_TICKS);
                }
            } else if back {
                app.back_to_select();
            } else {
                for key in input.raw_events.iter().filter(|k| k.kind == KeyEventKind::Press) {
                    match key.code {
                        KeyCode::Char(c) => app.push_initial(c),
                        KeyCode::Backspace => app.pop_initial(),
                        _ => {}
                    }
                }
            }
        }

        // ── Leaderboard ──
        Phase::Leaderboard => {
            if confirm || back || input.any_pressed(KEYS_QUIT) {
                app.back_to_select();
            }
        }
    }
    false
}

/// Keyboard actions and mouse dragging while a level is on screen.
fn handle_play_input(app: &mut App, input: &mut InputState) {
    let Some(world) = app.world.as_mut() else { return };
    let mut events = Vec::new();

    for (action, pressed) in input.action_transitions(&app.keybinds) {
        events.extend(step::handle_action(world, &mut app.actions, action, pressed));
    }

    for pointer in &input.pointer_events {
        match *pointer {
            PointerEvent::Down { col, row } => {
                let px = renderer::cell_to_pixel(col, row);
                if let Some(id) = motion::container_at(world, px) {
                    if let Some(ev) = motion::attach(world, id, px) {
                        app.dragging = Some(id);
                        events.push(ev);
                    }
                }
            }
            PointerEvent::Drag { col, row } => {
                if let Some(id) = app.dragging {
                    motion::drag(world, id, renderer::cell_to_pixel(col, row));
                }
            }
            PointerEvent::Up { .. } => {
                if let Some(id) = app.dragging.take() {
                    events.extend(motion::release(world, id));
                }
            }
        }
    }

    // A pause releases every grab; stop following the mouse too.
    if let Some(id) = app.dragging {
        if !world.container(id).map_or(false, |c| c.motion.is_attached()) {
            app.dragging = None;
        }
    }

    if events.contains(&GameEvent::Paused) {
        input.reset_held();
    }
    announce(app, &events);
}

fn on_resize(app: &mut App, input: &mut InputState, cols: u16, rows: u16) {
    let Some(world) = app.world.as_mut() else { return };
    let events = step::resize(world, &mut app.actions, renderer::viewport(cols, rows));
    app.dragging = None;
    input.reset_held();
    info!("terminal resized to {cols}x{rows}");
    announce(app, &events);
}

/// Turn step events into status-bar messages.
fn announce(app: &mut App, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::CollectiblePicked { score, .. } => {
                app.set_message(&format!("Collected! Score {score}"), MESSAGE_TICKS);
            }
            GameEvent::SpikeHit { lives, life_lost: true } => {
                app.set_message(&format!("Ouch! Lives left: {}", (*lives).max(0)), MESSAGE_TICKS);
            }
            GameEvent::ActivationToggled { color, containers } if *containers > 0 => {
                app.set_message(&format!("{} containers toggled", color.name()), MESSAGE_TICKS);
            }
            GameEvent::Travelled { to, .. } => {
                app.set_message(&format!("Entered container {to}"), MESSAGE_TICKS / 2);
            }
            GameEvent::Completed(Outcome::Won) => app.set_message("Level complete!", MESSAGE_TICKS),
            GameEvent::Completed(Outcome::Lost) => app.set_message("Out of lives", MESSAGE_TICKS),
            _ => {}
        }
    }
}
