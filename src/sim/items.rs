/// Item behaviour: gravity for loose items, contact-driven activation
/// and the interact handlers.
///
/// ## Per-type rules
/// ┌─────────────┬──────────────────────────┬─────────────────────────────────┐
/// │ Type        │ Trigger                  │ Effect                          │
/// ├─────────────┼──────────────────────────┼─────────────────────────────────┤
/// │ plate       │ character or box overlap │ sinks; toggles its colour on    │
/// │             │                          │ every press and every release   │
/// │ lever       │ interact                 │ flips; toggles its colour       │
/// │ box         │ interact                 │ carried / dropped               │
/// │ collectible │ first overlap            │ score += bonus, then hidden     │
/// │ spike       │ overlap begins           │ one life, unless grace is set;  │
/// │             │                          │ grace set, character bounces    │
/// │ exit        │ interact                 │ level complete                  │
/// └─────────────┴──────────────────────────┴─────────────────────────────────┘
///
/// Everything except collectibles falls when unsupported. A carried box
/// is moved by the character instead.

use log::{debug, info};

use crate::domain::entity::{ChildId, Color, ContainerId, ItemKind, ItemState, PlatformState};
use crate::domain::geometry::{self, Rect};
use crate::domain::physics;
use super::event::GameEvent;
use super::world::{interior_of, World};

pub fn update_items(world: &mut World, events: &mut Vec<GameEvent>) {
    apply_gravity(world);
    resolve_contacts(world, events);
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

fn apply_gravity(world: &mut World) {
    let gravity = world.per_frame(world.sim.physics.y_acc, 1);
    let block = world.layout.block;
    let border = world.layout.border;

    for c in &mut world.containers {
        let interior = interior_of(&c.rect, border);
        let platforms = &c.platforms;
        for item in c.items.iter_mut().filter(|i| i.kind.falls()) {
            if item.kind == ItemKind::Box && item.activated {
                item.y_vel = 0.0;
                continue;
            }
            fall(item, interior, platforms, gravity, block);
        }
    }
}

fn fall(item: &mut ItemState, interior: [f64; 2], platforms: &[PlatformState], gravity: f64, block: [f64; 2]) {
    if !physics::is_in_air(&item.rect, interior[1], platforms) {
        item.y_vel = 0.0;
        return;
    }
    item.rect.top += item.y_vel;
    if let Some(p) = physics::colliding_platform(&item.rect, platforms) {
        item.rect.top = p.rect.top - item.rect.height;
        item.y_vel = 0.0;
    } else {
        let floor = physics::floor_top(interior[1], item.rect.height);
        if item.rect.top >= floor {
            item.rect.top = floor;
            item.y_vel = 0.0;
        } else {
            item.y_vel += gravity;
        }
    }
    item.location = geometry::floor_tile(&item.rect, block);
}

// ══════════════════════════════════════════════════════════════
// Contact
// ══════════════════════════════════════════════════════════════

struct Contact {
    container: ContainerId,
    item: ChildId,
    kind: ItemKind,
    activated: bool,
    touches_character: bool,
    touches_box: bool,
}

/// Contact triggers across every container, not only the character's:
/// a box resting on a plate in another room keeps that plate pressed.
/// The character only touches items in its own container.
fn resolve_contacts(world: &mut World, events: &mut Vec<GameEvent>) {
    let character = world.character.rect;
    let home = world.character.container;

    let contacts: Vec<Contact> = world.containers.iter()
        .flat_map(|c| {
            let boxes: Vec<Rect> = c.items.iter()
                .filter(|i| i.kind == ItemKind::Box)
                .map(|i| i.rect)
                .collect();
            c.items.iter()
                .filter(|i| matches!(i.kind, ItemKind::Plate { .. } | ItemKind::Collectible | ItemKind::Spike))
                .map(move |i| Contact {
                    container: c.id,
                    item: i.id,
                    kind: i.kind,
                    activated: i.activated,
                    touches_character: c.id == home && i.rect.overlaps(&character),
                    touches_box: boxes.iter().any(|b| b.overlaps(&i.rect)),
                })
        })
        .collect();

    for contact in contacts {
        match contact.kind {
            ItemKind::Plate { color } => {
                let pressed = contact.touches_character || contact.touches_box;
                if pressed != contact.activated {
                    press_plate(world, &contact, color, pressed, events);
                }
            }
            ItemKind::Collectible => {
                if contact.touches_character && !contact.activated {
                    pick_collectible(world, &contact, events);
                }
            }
            ItemKind::Spike => touch_spike(world, &contact, events),
            _ => {}
        }
    }
}

fn press_plate(world: &mut World, contact: &Contact, color: Color, pressed: bool, events: &mut Vec<GameEvent>) {
    let block = world.layout.block[1];
    let kind = contact.kind;
    world.update_item(contact.container, contact.item, |plate| {
        // Sink or rise with the bottom edge fixed.
        let height = block * kind.height_factor(pressed);
        plate.rect.top += plate.rect.height - height;
        plate.rect.height = height;
        plate.activated = pressed;
    });
    debug!("plate {}/{} {}", contact.container, contact.item, if pressed { "pressed" } else { "released" });
    events.push(GameEvent::PlatePressed { container: contact.container, item: contact.item, pressed });
    toggle_color(world, color, events);
}

fn pick_collectible(world: &mut World, contact: &Contact, events: &mut Vec<GameEvent>) {
    world.update_item(contact.container, contact.item, |i| i.activated = true);
    world.game.score = world.game.score.saturating_add(world.sim.rules.collectible_bonus);
    info!("collectible {}/{} picked, score {}", contact.container, contact.item, world.game.score);
    events.push(GameEvent::CollectiblePicked {
        container: contact.container,
        item: contact.item,
        score: world.game.score,
    });
}

/// A spike costs a life only when contact begins, and not at all while
/// the grace flag from the previous hit is still set.
fn touch_spike(world: &mut World, contact: &Contact, events: &mut Vec<GameEvent>) {
    let touching = contact.touches_character;
    if touching == contact.activated {
        return;
    }
    world.update_item(contact.container, contact.item, |i| i.activated = touching);
    if !touching {
        return;
    }

    let game = &mut world.game;
    let life_lost = !game.grace;
    if life_lost {
        game.lives -= 1;
    }
    game.grace = true;
    info!("spike hit, lives {}", game.lives);
    events.push(GameEvent::SpikeHit { lives: game.lives, life_lost });

    if game.lives < 0 && !game.complete {
        game.paused = true;
        game.complete = true;
        if let Some(outcome) = game.outcome() {
            info!("level over: {outcome:?}");
            events.push(GameEvent::Completed(outcome));
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Interact handlers
// ══════════════════════════════════════════════════════════════

pub fn interact_item(world: &mut World, container: ContainerId, item: ChildId, events: &mut Vec<GameEvent>) {
    let Some(state) = world.item(container, item) else { return };
    let (kind, activated) = (state.kind, state.activated);

    match kind {
        ItemKind::Exit => {
            world.game.paused = true;
            world.game.complete = true;
            if let Some(outcome) = world.game.outcome() {
                info!("exit reached: {outcome:?}, score {}", world.game.score);
                events.push(GameEvent::Completed(outcome));
            }
        }
        ItemKind::Lever { color } => {
            let on = !activated;
            world.update_item(container, item, |i| i.activated = on);
            events.push(GameEvent::LeverFlipped { container, item, on });
            toggle_color(world, color, events);
        }
        ItemKind::Box => {
            let carried = !activated;
            world.update_item(container, item, |i| {
                i.activated = carried;
                i.y_vel = 0.0;
            });
            debug!("box {container}/{item} {}", if carried { "picked up" } else { "dropped" });
            events.push(GameEvent::BoxToggled { container, item, carried });
        }
        ItemKind::Plate { .. } | ItemKind::Collectible | ItemKind::Spike => {}
    }
}

fn toggle_color(world: &mut World, color: Color, events: &mut Vec<GameEvent>) {
    let containers = world.toggle_activation(color);
    info!("{} activation toggled on {containers} containers", color.name());
    events.push(GameEvent::ActivationToggled { color, containers });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Outcome;
    use crate::sim::level::tests::world_from_json;

    const ROOM: &str = r#"{
        "id": 1, "dimensions": [16, 12],
        "character": { "startContainer": 1, "startLocation": [2, 2] },
        "containers": [
            { "id": 1, "color": "green", "location": [0, 0], "dimensions": [8, 6],
              "items": [
                { "id": 1, "itemType": "box", "location": [5, 0] },
                { "id": 2, "itemType": "plate", "location": [5, 5], "color": "red" },
                { "id": 3, "itemType": "collectible", "location": [2, 2] },
                { "id": 4, "itemType": "lever", "location": [7, 5], "color": "red" },
                { "id": 5, "itemType": "box", "location": [1, 0] },
                { "id": 6, "itemType": "exit", "location": [0, 4] }
              ],
              "platforms": [ { "id": 1, "location": [0, 2], "dimensions": [2, 1] } ] },
            { "id": 2, "color": "red", "location": [8, 0], "dimensions": [4, 4] },
            { "id": 3, "color": "green", "location": [12, 0], "dimensions": [4, 4],
              "items": [ { "id": 1, "itemType": "spike", "location": [1, 3] } ] }
        ]
    }"#;

    fn settle(world: &mut World, events: &mut Vec<GameEvent>) {
        for _ in 0..200 {
            update_items(world, events);
        }
    }

    fn item(world: &World, container: ContainerId, id: ChildId) -> ItemState {
        world.item(container, id).cloned().unwrap()
    }

    #[test]
    fn loose_items_fall_to_the_floor_or_a_platform() {
        let mut w = world_from_json(ROOM);
        let mut events = vec![];
        settle(&mut w, &mut events);

        let interior = w.interior(w.container(1).unwrap());
        let on_floor = item(&w, 1, 6);
        assert!((on_floor.rect.bottom() - interior[1]).abs() < 1e-6);
        assert_eq!(on_floor.y_vel, 0.0);

        let on_platform = item(&w, 1, 5);
        let platform = w.container(1).unwrap().platforms[0].rect;
        assert!((on_platform.rect.bottom() - platform.top).abs() < 1e-6);
        assert_eq!(on_platform.y_vel, 0.0);
    }

    #[test]
    fn collectibles_float_and_pay_out_once() {
        let mut w = world_from_json(ROOM);
        let before = item(&w, 1, 3).rect;
        let mut events = vec![];
        update_items(&mut w, &mut events);
        assert_eq!(w.game.score, 11000);
        assert!(item(&w, 1, 3).activated);
        assert!(!item(&w, 1, 3).is_visible());
        assert_eq!(item(&w, 1, 3).rect, before);

        settle(&mut w, &mut events);
        assert_eq!(w.game.score, 11000);
        let picked = events.iter().filter(|e| matches!(e, GameEvent::CollectiblePicked { .. })).count();
        assert_eq!(picked, 1);
    }

    #[test]
    fn a_box_landing_on_a_plate_activates_its_colour() {
        let mut w = world_from_json(ROOM);
        let mut events = vec![];
        settle(&mut w, &mut events);
        let plate = item(&w, 1, 2);
        assert!(plate.activated);
        assert!((plate.rect.height - 0.2 * w.layout.block[1]).abs() < 1e-6);
        assert!(w.container(2).unwrap().is_activated());
        assert!(events.contains(&GameEvent::ActivationToggled { color: Color::Red, containers: 1 }));
    }

    #[test]
    fn lifting_the_box_releases_the_plate() {
        let mut w = world_from_json(ROOM);
        let mut events = vec![];
        settle(&mut w, &mut events);
        let plate_rect = item(&w, 1, 2).rect;
        w.update_item(1, 1, |b| b.rect.top -= 3.0 * b.rect.height);
        w.update_item(1, 1, |b| b.activated = true);
        update_items(&mut w, &mut events);
        let plate = item(&w, 1, 2);
        assert!(!plate.activated);
        assert!((plate.rect.bottom() - plate_rect.bottom()).abs() < 1e-6);
        assert!(!w.container(2).unwrap().is_activated());
    }

    #[test]
    fn lever_flips_and_toggles_its_colour() {
        let mut w = world_from_json(ROOM);
        let mut events = vec![];
        interact_item(&mut w, 1, 4, &mut events);
        assert!(item(&w, 1, 4).activated);
        assert_eq!(item(&w, 1, 4).lever_angle(), Some(135.0));
        assert!(w.container(2).unwrap().is_activated());
        interact_item(&mut w, 1, 4, &mut events);
        assert!(!w.container(2).unwrap().is_activated());
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn box_interact_toggles_carry() {
        let mut w = world_from_json(ROOM);
        let mut events = vec![];
        interact_item(&mut w, 1, 1, &mut events);
        assert_eq!(w.container(1).unwrap().carried_box().map(|b| b.id), Some(1));
        interact_item(&mut w, 1, 1, &mut events);
        assert!(w.container(1).unwrap().carried_box().is_none());
    }

    #[test]
    fn exit_completes_the_level_as_a_win() {
        let mut w = world_from_json(ROOM);
        let mut events = vec![];
        interact_item(&mut w, 1, 6, &mut events);
        assert!(w.game.complete && w.game.paused);
        assert_eq!(events, vec![GameEvent::Completed(Outcome::Won)]);
    }

    #[test]
    fn continuous_spike_contact_costs_one_life() {
        let mut w = world_from_json(ROOM);
        let spike = item(&w, 3, 1);
        w.character.container = 3;
        w.character.rect = spike.rect;
        let mut events = vec![];
        for _ in 0..10 {
            update_items(&mut w, &mut events);
        }
        assert_eq!(w.game.lives, 2);
        assert!(w.game.grace);

        // Breaking contact and touching again while grace holds is free.
        w.character.rect.top -= 3.0 * spike.rect.height;
        update_items(&mut w, &mut events);
        w.character.rect = spike.rect;
        update_items(&mut w, &mut events);
        assert_eq!(w.game.lives, 2);

        w.game.grace = false;
        w.character.rect.top -= 3.0 * spike.rect.height;
        update_items(&mut w, &mut events);
        w.character.rect = spike.rect;
        update_items(&mut w, &mut events);
        assert_eq!(w.game.lives, 1);
    }

    #[test]
    fn losing_the_last_life_ends_the_level() {
        let mut w = world_from_json(ROOM);
        w.game.lives = 0;
        let spike = item(&w, 3, 1);
        w.character.container = 3;
        w.character.rect = spike.rect;
        let mut events = vec![];
        update_items(&mut w, &mut events);
        assert_eq!(w.game.lives, -1);
        assert_eq!(w.game.outcome(), Some(Outcome::Lost));
        assert!(events.contains(&GameEvent::Completed(Outcome::Lost)));
    }

    #[test]
    fn spikes_ignore_a_character_in_another_container() {
        let mut w = world_from_json(ROOM);
        w.character.rect = item(&w, 3, 1).rect;
        let mut events = vec![];
        update_items(&mut w, &mut events);
        assert_eq!(w.game.lives, 3);
    }
}
