/// The step function: advances the world by one tick.
///
/// Processing order (while running):
///   1. Auto-move of purple / orange containers
///   2. Item gravity and contact activation
///   3. Character movement
///   4. Interactable highlight
///   5. Score decay (floor 0)
///
/// Nothing advances while paused or complete. Input arrives between
/// ticks through `handle_action` and the motion module's drag calls.
///
/// ## Game state
///
///   RUNNING ──pause / resize──▶ PAUSED ──pause──▶ RUNNING
///   RUNNING ──exit / lives < 0──▶ COMPLETE (terminal)

use log::info;

use crate::domain::action::{Action, Actions};
use super::character;
use super::event::GameEvent;
use super::items;
use super::motion;
use super::world::World;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, actions: &mut Actions) -> Vec<GameEvent> {
    if !world.game.is_running() {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    motion::auto_move(world, &mut events);
    items::update_items(world, &mut events);
    character::move_character(world, actions, &mut events);
    character::refresh_highlights(world);
    world.game.score = world.game.score.saturating_sub(world.sim.rules.score_decay);

    events
}

// ══════════════════════════════════════════════════════════════
// Input between ticks
// ══════════════════════════════════════════════════════════════

/// Route a logical key press or release. Interact and pause fire on the
/// press; movement and jump are recorded for the next tick to sample.
pub fn handle_action(world: &mut World, actions: &mut Actions, action: Action, pressed: bool) -> Vec<GameEvent> {
    match action {
        Action::Pause if pressed => toggle_pause(world, actions),
        Action::Interact if pressed => {
            let mut events = vec![];
            character::interact(world, &mut events);
            events
        }
        Action::Pause | Action::Interact => vec![],
        _ => {
            actions.set(action, pressed);
            vec![]
        }
    }
}

pub fn toggle_pause(world: &mut World, actions: &mut Actions) -> Vec<GameEvent> {
    if world.game.complete {
        return vec![];
    }
    if world.game.paused {
        world.game.paused = false;
        info!("resumed at tick {}", world.tick);
        vec![GameEvent::Resumed]
    } else {
        pause(world, actions)
    }
}

fn pause(world: &mut World, actions: &mut Actions) -> Vec<GameEvent> {
    let mut events = motion::release_all(world);
    actions.clear();
    world.game.paused = true;
    info!("paused at tick {}", world.tick);
    events.push(GameEvent::Paused);
    events
}

/// New viewport size. Pauses a running game (never resumes one) and lays
/// everything out again from tile locations.
pub fn resize(world: &mut World, actions: &mut Actions, viewport: [f64; 2]) -> Vec<GameEvent> {
    let events = if world.game.is_running() {
        pause(world, actions)
    } else {
        motion::release_all(world)
    };
    world.relayout(viewport);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Highlight, Outcome};
    use crate::domain::geometry::Axis;
    use crate::domain::rules::{self, Pairing};
    use crate::sim::level::tests::world_from_json;

    const WALK: &str = r#"{
        "id": 1, "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [2, 2] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 0], "dimensions": [10, 4],
              "items": [ { "id": 1, "itemType": "exit", "location": [8, 2] } ] },
            { "id": 2, "color": "blue", "movement": "x", "location": [10, 0], "dimensions": [2, 4] }
        ]
    }"#;

    const GATE: &str = r#"{
        "id": 2, "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [5, 3] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 0], "dimensions": [6, 5],
              "openings": [ { "id": 1, "border": "right", "location": 2, "width": 2 } ],
              "items": [ { "id": 1, "itemType": "lever", "location": [1, 4], "color": "red" } ] },
            { "id": 2, "color": "red", "location": [6, 0], "dimensions": [4, 5],
              "openings": [ { "id": 1, "border": "left", "location": 2, "width": 2 } ] }
        ]
    }"#;

    const PLATE_GATE: &str = r#"{
        "id": 5, "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [5, 3] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 0], "dimensions": [6, 5],
              "openings": [ { "id": 1, "border": "right", "location": 2, "width": 2 } ],
              "items": [ { "id": 1, "itemType": "plate", "location": [5, 4], "color": "red" } ] },
            { "id": 2, "color": "red", "location": [6, 0], "dimensions": [4, 5],
              "openings": [ { "id": 1, "border": "left", "location": 2, "width": 2 } ] }
        ]
    }"#;

    const TREASURE: &str = r#"{
        "id": 3, "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [5, 5] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 0], "dimensions": [10, 8],
              "items": [ { "id": 1, "itemType": "collectible", "location": [5, 5] } ] }
        ]
    }"#;

    const PIT: &str = r#"{
        "id": 4, "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [2, 3] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 0], "dimensions": [6, 4],
              "items": [ { "id": 1, "itemType": "spike", "location": [2, 3] } ] }
        ]
    }"#;

    fn run(world: &mut World, actions: &mut Actions, n: usize) -> Vec<GameEvent> {
        (0..n).flat_map(|_| step(world, actions)).collect()
    }

    fn toggles(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| matches!(e, GameEvent::ActivationToggled { .. })).count()
    }

    #[test]
    fn holding_right_moves_x_vel_tiles_per_frame_unit() {
        let mut w = world_from_json(WALK);
        let mut actions = Actions::default();
        handle_action(&mut w, &mut actions, Action::Right, true);
        let start = w.character.rect.left;
        let per_tick = 3.0 * w.layout.block[0] / w.sim.frame_ms;

        run(&mut w, &mut actions, 10);
        assert!((w.character.rect.left - (start + 10.0 * per_tick)).abs() < 1e-6);

        run(&mut w, &mut actions, 200);
        let interior = w.interior(w.container(1).unwrap());
        assert!((w.character.rect.left - (interior[0] - w.character.rect.width)).abs() < 1e-6);
    }

    #[test]
    fn red_opening_opens_after_the_lever() {
        let mut w = world_from_json(GATE);
        let mut actions = Actions::default();
        run(&mut w, &mut actions, 60);
        assert_eq!(w.character.location, [4, 3]);
        assert_eq!(w.opening(1, 1).unwrap().highlight, Highlight::Locked);

        handle_action(&mut w, &mut actions, Action::Interact, true);
        assert_eq!(w.character.container, 1);

        let mut events = vec![];
        items::interact_item(&mut w, 1, 1, &mut events);
        run(&mut w, &mut actions, 1);
        assert_eq!(w.opening(1, 1).unwrap().highlight, Highlight::Ready);

        let events = handle_action(&mut w, &mut actions, Action::Interact, true);
        assert_eq!(w.character.container, 2);
        assert!(events.contains(&GameEvent::Travelled { from: 1, to: 2 }));
    }

    #[test]
    fn standing_on_a_plate_opens_the_red_gate_until_stepping_off() {
        let mut w = world_from_json(PLATE_GATE);
        let mut actions = Actions::default();
        let events = run(&mut w, &mut actions, 60);
        assert_eq!(w.character.container, 1);
        assert!(w.item(1, 1).unwrap().activated);
        assert!(w.container(2).unwrap().is_activated());
        assert_eq!(toggles(&events), 1);

        let pairing = |w: &World| {
            let c = w.container(1).unwrap();
            rules::pair_opening(&w.containers, c, c.opening(1).unwrap())
        };
        assert_eq!(pairing(&w), Pairing::Partner { container: 2, opening: 1 });
        assert_eq!(w.opening(1, 1).unwrap().highlight, Highlight::Ready);

        handle_action(&mut w, &mut actions, Action::Left, true);
        let events = run(&mut w, &mut actions, 60);
        assert!(!w.item(1, 1).unwrap().activated);
        assert!(!w.container(2).unwrap().is_activated());
        assert_eq!(toggles(&events), 1);
        assert_eq!(pairing(&w), Pairing::Locked);
    }

    #[test]
    fn collectible_pays_once_and_score_decays() {
        let mut w = world_from_json(TREASURE);
        let mut actions = Actions::default();
        run(&mut w, &mut actions, 1);
        assert_eq!(w.game.score, 10999);
        assert!(w.item(1, 1).unwrap().activated);
        run(&mut w, &mut actions, 5);
        assert_eq!(w.game.score, 10994);
    }

    #[test]
    fn score_never_goes_below_zero() {
        let mut w = world_from_json(WALK);
        w.game.score = 2;
        run(&mut w, &mut Actions::default(), 5);
        assert_eq!(w.game.score, 0);
    }

    #[test]
    fn two_spike_hits_from_one_life_lose_the_level() {
        let mut w = world_from_json(PIT);
        w.game.lives = 1;
        let mut actions = Actions::default();
        let mut events = vec![];
        for _ in 0..500 {
            events.extend(step(&mut w, &mut actions));
            if w.game.complete {
                break;
            }
        }
        assert_eq!(w.game.lives, -1);
        assert_eq!(w.game.outcome(), Some(Outcome::Lost));
        assert!(events.contains(&GameEvent::Completed(Outcome::Lost)));
        let hits = events.iter().filter(|e| matches!(e, GameEvent::SpikeHit { life_lost: true, .. })).count();
        assert_eq!(hits, 2);
    }

    #[test]
    fn paused_world_does_not_advance() {
        let mut w = world_from_json(WALK);
        let mut actions = Actions::default();
        handle_action(&mut w, &mut actions, Action::Right, true);
        let events = handle_action(&mut w, &mut actions, Action::Pause, true);
        assert_eq!(events, vec![GameEvent::Paused]);
        assert_eq!(actions, Actions::default());

        let before = (w.tick, w.game.score, w.character.rect);
        assert!(run(&mut w, &mut actions, 10).is_empty());
        assert_eq!(before, (w.tick, w.game.score, w.character.rect));

        // Releasing the key is not a press.
        assert!(handle_action(&mut w, &mut actions, Action::Pause, false).is_empty());
        assert_eq!(handle_action(&mut w, &mut actions, Action::Pause, true), vec![GameEvent::Resumed]);
        run(&mut w, &mut actions, 1);
        assert_eq!(w.tick, before.0 + 1);
    }

    #[test]
    fn pausing_drops_a_dragged_container() {
        let mut w = world_from_json(WALK);
        let mut actions = Actions::default();
        let r = w.container(2).unwrap().rect;
        motion::attach(&mut w, 2, [r.left + 5.0, r.top + 5.0]);
        let events = toggle_pause(&mut w, &mut actions);
        assert!(matches!(events[0], GameEvent::ContainerReleased { id: 2, .. }));
        assert!(!w.container_is_moving());
    }

    #[test]
    fn resize_pauses_and_relays_out() {
        let mut w = world_from_json(WALK);
        let mut actions = Actions::default();
        let events = resize(&mut w, &mut actions, [800.0, 600.0]);
        assert_eq!(events, vec![GameEvent::Paused]);
        assert!(w.game.paused);
        assert_eq!(w.container(2).unwrap().rect, w.layout.tile_rect([10, 0], [2, 4]));
        assert!((w.layout.tile_pos(Axis::X, 0) - w.layout.spacing(Axis::X)).abs() < 1e-9);

        // A second resize while paused stays paused.
        assert!(resize(&mut w, &mut actions, [1024.0, 768.0]).is_empty());
        assert!(w.game.paused);
    }

    #[test]
    fn exit_completes_and_freezes_the_level() {
        let mut w = world_from_json(WALK);
        let mut actions = Actions::default();
        handle_action(&mut w, &mut actions, Action::Right, true);
        run(&mut w, &mut actions, 200);
        let events = handle_action(&mut w, &mut actions, Action::Interact, true);
        assert_eq!(events, vec![GameEvent::Completed(Outcome::Won)]);
        assert!(run(&mut w, &mut actions, 5).is_empty());
        assert!(toggle_pause(&mut w, &mut actions).is_empty());
        assert!(w.game.paused);
    }

    #[test]
    fn grid_matches_footprints_after_play() {
        let mut w = world_from_json(WALK);
        let mut actions = Actions::default();
        let r = w.container(2).unwrap().rect;
        motion::attach(&mut w, 2, [r.left + 5.0, r.top + 5.0]);
        motion::drag(&mut w, 2, [r.left + 500.0, r.top + 5.0]);
        run(&mut w, &mut actions, 3);
        motion::release(&mut w, 2);
        run(&mut w, &mut actions, 3);
        let total: usize = w.containers.iter().map(|c| (c.dimensions[0] * c.dimensions[1]) as usize).sum();
        assert_eq!(w.grid.occupied_count(), total);
        for c in &w.containers {
            assert!(w.grid.rect_occupied(c.location, c.dimensions));
        }
    }
}
