#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Sub-pixel stepper that moves actors through an area.
//!
//! Control code computes a velocity and calls the stepper once per axis per
//! tick. The stepper splits the distance into steps of at most one pixel,
//! consults the collision resolver whenever a step would change the
//! truncated position, and either moves the actor, slides it around a corner
//! or leans it against whatever blocked it.

use std::borrow::Cow;

use tilebound_core::{Direction, Hitbox, MoveVerdict, MovementProperties, ObjectId};
use tilebound_system_collision::can_move;
use tilebound_world::{Actor, ActorAction, Area};
use tracing::{debug, trace};

/// Largest perpendicular offset, in pixels, between an actor and one of
/// several blockers for that blocker to receive the push.
pub const PUSH_ALIGNMENT_TOLERANCE: f32 = 8.0;

/// Primary attempt plus at most one wiggle retry.
const MAX_ATTEMPTS: usize = 2;

/// Moves the actor up by `amount` pixels.
pub fn move_up(
    area: &mut Area,
    actor: &mut Actor,
    properties: &MovementProperties,
    amount: f32,
) -> bool {
    move_actor(area, actor, properties, Direction::Up, amount)
}

/// Moves the actor down by `amount` pixels.
pub fn move_down(
    area: &mut Area,
    actor: &mut Actor,
    properties: &MovementProperties,
    amount: f32,
) -> bool {
    move_actor(area, actor, properties, Direction::Down, amount)
}

/// Moves the actor left by `amount` pixels.
pub fn move_left(
    area: &mut Area,
    actor: &mut Actor,
    properties: &MovementProperties,
    amount: f32,
) -> bool {
    move_actor(area, actor, properties, Direction::Left, amount)
}

/// Moves the actor right by `amount` pixels.
pub fn move_right(
    area: &mut Area,
    actor: &mut Actor,
    properties: &MovementProperties,
    amount: f32,
) -> bool {
    move_actor(area, actor, properties, Direction::Right, amount)
}

/// Moves the actor `amount` pixels in `direction`.
///
/// Returns `true` when the whole distance was covered. A zero amount is a
/// successful no-op; negative and non-finite amounts move nothing and return
/// `false`. When a step is refused the actor keeps the progress made by
/// earlier steps of the same call.
pub fn move_actor(
    area: &mut Area,
    actor: &mut Actor,
    properties: &MovementProperties,
    direction: Direction,
    amount: f32,
) -> bool {
    if !amount.is_finite() || amount < 0.0 {
        return false;
    }

    let fraction = amount.fract();
    // Saturates for amounts beyond u64; the off-map sweep ends such moves.
    let mut whole_steps = amount.trunc() as u64;
    while whole_steps > 0 {
        let remaining = whole_steps as f32 + fraction;
        if sweep_is_unobstructed(area, &actor.movement_hitbox(), properties, direction, remaining) {
            let (dx, dy) = direction.delta();
            actor.translate(dx as f32 * remaining, dy as f32 * remaining);
            if actor.action() == ActorAction::Pushing {
                let _ = actor.set_action(ActorAction::Walking);
            }
            return true;
        }
        if !step_once(area, actor, properties, direction, 1.0) {
            return false;
        }
        whole_steps -= 1;
    }
    fraction == 0.0 || step_once(area, actor, properties, direction, fraction)
}

/// Moves the actor by a velocity, horizontal axis first, and reports which
/// axes were fully covered. Blocking one axis never stops the other, so
/// diagonal movement slides along walls.
pub fn move_by(
    area: &mut Area,
    actor: &mut Actor,
    properties: &MovementProperties,
    dx: f32,
    dy: f32,
) -> (bool, bool) {
    let horizontal = if dx < 0.0 {
        move_left(area, actor, properties, -dx)
    } else {
        move_right(area, actor, properties, dx)
    };
    let vertical = if dy < 0.0 {
        move_up(area, actor, properties, -dy)
    } else {
        move_down(area, actor, properties, dy)
    };
    (horizontal, vertical)
}

/// Reports whether sweeping the hitbox `distance` pixels stays clear of the
/// map and of every object the mover collides with. Off the map nothing but
/// objects can refuse a step, so such a sweep needs no per-pixel resolution.
fn sweep_is_unobstructed(
    area: &Area,
    hitbox: &Hitbox,
    properties: &MovementProperties,
    direction: Direction,
    distance: f32,
) -> bool {
    let (columns, rows) = area.dimensions();
    let tile_size = area.tile_size() as f32;
    let map = Hitbox::new(0.0, 0.0, columns as f32 * tile_size, rows as f32 * tile_size);

    let Hitbox { x, y, w, h } = *hitbox;
    let swept = match direction {
        Direction::Up => Hitbox::new(x, y - distance, w, h + distance),
        Direction::Down => Hitbox::new(x, y, w, h + distance),
        Direction::Left => Hitbox::new(x - distance, y, w + distance, h),
        Direction::Right => Hitbox::new(x, y, w + distance, h),
    };
    let swept = Hitbox::new(swept.x - 1.0, swept.y - 1.0, swept.w + 2.0, swept.h + 2.0);

    !swept.overlaps(&map)
        && area
            .objects()
            .all(|object| properties.excludes(object.id()) || !swept.overlaps(&object.hitbox()))
}

fn step_once(
    area: &mut Area,
    actor: &mut Actor,
    properties: &MovementProperties,
    direction: Direction,
    amount: f32,
) -> bool {
    let mut attempt = direction;
    let mut properties = Cow::Borrowed(properties);

    for _ in 0..MAX_ATTEMPTS {
        let hitbox = actor.movement_hitbox();
        let (dx, dy) = attempt.delta();
        let (dx, dy) = (dx as f32 * amount, dy as f32 * amount);

        let target = hitbox.translated(dx, dy);
        let same_pixel = if attempt.is_horizontal() {
            hitbox.x.floor() == target.x.floor()
        } else {
            hitbox.y.floor() == target.y.floor()
        };
        if same_pixel {
            actor.translate(dx, dy);
            return true;
        }

        let blockage = match can_move(area, &hitbox, attempt, &properties) {
            MoveVerdict::Clear => {
                actor.translate(dx, dy);
                if actor.action() == ActorAction::Pushing {
                    let _ = actor.set_action(ActorAction::Walking);
                }
                return true;
            }
            MoveVerdict::Blocked(blockage) => blockage,
        };

        if let Some(wiggle) = blockage.wiggle.filter(|_| properties.can_wiggle) {
            trace!(actor = actor.id().get(), ?attempt, ?wiggle, "wiggle");
            attempt = wiggle;
            properties = Cow::Owned(properties.without_wiggle());
            continue;
        }

        if attempt == direction && properties.can_push && !blockage.pushed_objects.is_empty() {
            push_blockers(area, actor, direction, &blockage.pushed_objects);
        }
        return false;
    }
    false
}

fn push_blockers(area: &mut Area, actor: &mut Actor, direction: Direction, blockers: &[ObjectId]) {
    let _ = actor.set_action(ActorAction::Pushing);
    actor.set_facing(direction);

    if let [only] = blockers {
        let outcome = area.push_object(*only, direction);
        trace!(actor = actor.id().get(), object = only.get(), ?outcome, "push");
        return;
    }

    let hitbox = actor.movement_hitbox();
    for &id in blockers {
        let Some(blocker) = area.object(id).map(|object| object.hitbox()) else {
            continue;
        };
        let offset = if direction.is_horizontal() {
            (blocker.y - hitbox.y).abs()
        } else {
            (blocker.x - hitbox.x).abs()
        };
        if offset < PUSH_ALIGNMENT_TOLERANCE {
            let outcome = area.push_object(id, direction);
            trace!(actor = actor.id().get(), object = id.get(), ?outcome, "push");
        } else {
            debug!(actor = actor.id().get(), object = id.get(), offset, "push_misaligned");
        }
    }
}
