/// Character kinematics, interaction and travel between containers.
///
/// ## Movement per tick
///
///   1. Horizontal: `x_vel` tiles per frame unit toward the held
///      direction, stopped by platforms and the interior walls.
///   2. Vertical:
///        airborne  → integrate `y_vel`, land on / bump under platforms,
///                    clamp to floor and ceiling, then add gravity
///        grounded  → jump if jump was freshly pressed or a spike bounce
///                    is pending, otherwise stand still
///      A jump pressed while airborne is discarded, not buffered.
///   3. A carried box copies the character's displacement under the same
///      collision rules, and is dropped once it falls out of carry range.
///   4. Tile location is refreshed from the pixel rect (floor division).

use log::{debug, info};

use crate::domain::action::Actions;
use crate::domain::entity::{ChildId, ContainerId, Highlight, ItemKind, PlatformState};
use crate::domain::geometry::{self, Rect};
use crate::domain::physics;
use crate::domain::rules::{self, Interactable, Pairing};
use super::event::GameEvent;
use super::items;
use super::world::{character_rect, clamp_into, World};

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

pub fn move_character(world: &mut World, actions: &mut Actions, events: &mut Vec<GameEvent>) {
    let home = world.character.container;
    let Some(c) = world.container(home) else { return };
    let interior = world.interior(c);
    let platforms = c.platforms.clone();
    let carried = c.carried_box().map(|b| (b.id, b.location));

    let dir = actions.horizontal();
    let grace = world.game.grace;
    let in_air = physics::is_in_air(&world.character.rect, interior[1], &platforms);
    if in_air && !grace {
        actions.jump_armed = false;
    }

    if dir == 0 && !actions.jump_armed && !in_air && !grace {
        world.character.y_vel = 0.0;
        return;
    }

    let carried = match carried {
        Some((id, location)) if !rules::within_carry_range(location, world.character.location, world.sim.rules.carry_range) => {
            world.update_item(home, id, |b| b.activated = false);
            debug!("box {home}/{id} left behind");
            events.push(GameEvent::BoxToggled { container: home, item: id, carried: false });
            None
        }
        other => other.map(|(id, _)| id),
    };

    let before = world.character.rect;

    // ── Horizontal ──
    let dx = world.per_frame(world.character.x_vel, 0) * dir as f64;
    if dx != 0.0 {
        world.character.rect = slide_horizontal(world.character.rect, dx, interior, &platforms);
    }

    // ── Vertical ──
    let gravity = world.per_frame(world.character.y_acc, 1);
    let jump = world.per_frame(world.character.y_jump_vel, 1);
    let ch = &mut world.character;
    if in_air && !grace {
        ch.rect.top += ch.y_vel;
        ch.y_vel = settle_vertical(&mut ch.rect, ch.y_vel, interior, &platforms, gravity);
    } else if actions.jump_armed || grace {
        ch.y_vel = jump;
        ch.rect.top += ch.y_vel;
        ch.y_vel = settle_vertical(&mut ch.rect, ch.y_vel, interior, &platforms, 0.0);
        actions.jump_armed = false;
        world.game.grace = false;
    } else {
        ch.y_vel = 0.0;
    }

    // ── Carried box ──
    if let Some(id) = carried {
        let after = world.character.rect;
        let delta = [after.left - before.left, after.top - before.top];
        let block = world.layout.block;
        world.update_item(home, id, |b| {
            if delta[0] != 0.0 {
                b.rect = slide_horizontal(b.rect, delta[0], interior, &platforms);
            }
            b.rect.top += delta[1];
            settle_vertical(&mut b.rect, delta[1], interior, &platforms, 0.0);
            b.location = geometry::floor_tile(&b.rect, block);
        });
    }

    world.relocate_character();
}

/// Move `rect` by `dx`, stopping at the edge of a platform or a wall.
fn slide_horizontal(rect: Rect, dx: f64, interior: [f64; 2], platforms: &[PlatformState]) -> Rect {
    let mut r = rect;
    r.left += dx;
    if let Some(p) = physics::colliding_platform(&r, platforms) {
        r.left = if dx > 0.0 { p.rect.left - r.width } else { p.rect.right() };
    }
    r.left = r.left.min(interior[0] - r.width).max(0.0);
    r
}

/// Resolve a rect that has just moved vertically with velocity `vel`.
/// Returns the velocity for the next tick: zero after touching a
/// platform, the floor or the ceiling, otherwise `vel + gravity`.
fn settle_vertical(rect: &mut Rect, vel: f64, interior: [f64; 2], platforms: &[PlatformState], gravity: f64) -> f64 {
    if let Some(p) = physics::colliding_platform(rect, platforms) {
        rect.top = if vel > 0.0 { p.rect.top - rect.height } else { p.rect.bottom() };
        return 0.0;
    }
    let floor = physics::floor_top(interior[1], rect.height);
    if rect.top >= floor {
        rect.top = floor;
        return 0.0;
    }
    if rect.top < 0.0 {
        rect.top = 0.0;
        return 0.0;
    }
    vel + gravity
}

// ══════════════════════════════════════════════════════════════
// Interaction
// ══════════════════════════════════════════════════════════════

/// What the interact action would hit right now.
pub fn nearest_interactable(world: &World) -> Option<Interactable> {
    let c = world.character_container()?;
    let r = &world.sim.rules;
    rules::find_interactable(c, world.character.location, r.interact_range, r.opening_reach)
}

pub fn interact(world: &mut World, events: &mut Vec<GameEvent>) {
    if !world.game.is_running() {
        return;
    }
    match nearest_interactable(world) {
        Some(Interactable::Item { container, item }) => items::interact_item(world, container, item, events),
        Some(Interactable::Opening { container, opening }) => {
            travel(world, container, opening, events);
        }
        None => {}
    }
}

fn opening_pairing(world: &World, container: ContainerId, opening: ChildId) -> Option<Pairing> {
    let source = world.container(container)?;
    let from = source.opening(opening)?;
    Some(rules::pair_opening(&world.containers, source, from))
}

/// Walk through `opening` of `container`. Returns false when the opening
/// leads nowhere (misaligned or locked).
pub fn travel(world: &mut World, container: ContainerId, opening: ChildId, events: &mut Vec<GameEvent>) -> bool {
    let Some(Pairing::Partner { container: to_id, opening: to_opening }) = opening_pairing(world, container, opening) else {
        debug!("opening {container}/{opening} leads nowhere");
        return false;
    };
    let (Some(source), Some(target)) = (world.container(container), world.container(to_id)) else { return false };
    let (Some(from), Some(to)) = (source.opening(opening), target.opening(to_opening)) else { return false };

    let location = rules::travel_location(world.character.location, from, to, target);
    let interior = world.interior(target);
    let dropped: Vec<ChildId> = source.items.iter()
        .filter(|i| i.kind == ItemKind::Box && i.activated)
        .map(|i| i.id)
        .collect();

    for id in dropped {
        world.update_item(container, id, |b| b.activated = false);
        events.push(GameEvent::BoxToggled { container, item: id, carried: false });
    }

    let block = world.layout.block;
    let ch = &mut world.character;
    ch.container = to_id;
    ch.rect = character_rect(location, ch.size, block);
    clamp_into(&mut ch.rect, interior);
    ch.y_vel = 0.0;
    world.relocate_character();
    world.update_opening(container, opening, |o| o.highlight = Highlight::None);

    info!("travelled {container} -> {to_id} at {:?}", world.character.location);
    events.push(GameEvent::Travelled { from: container, to: to_id });
    true
}

/// Paint the highlight on whatever the interact action would hit and
/// clear it everywhere else.
pub fn refresh_highlights(world: &mut World) {
    for c in &mut world.containers {
        for i in &mut c.items {
            i.highlight = Highlight::None;
        }
        for o in &mut c.openings {
            o.highlight = Highlight::None;
        }
    }

    match nearest_interactable(world) {
        Some(Interactable::Item { container, item }) => {
            world.update_item(container, item, |i| i.highlight = Highlight::Ready);
        }
        Some(Interactable::Opening { container, opening }) => {
            if let Some(pairing) = opening_pairing(world, container, opening) {
                world.update_opening(container, opening, |o| o.highlight = pairing.highlight());
            }
        }
        None => {}
    }
}
