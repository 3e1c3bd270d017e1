//! Movers driven by control code through the movement system.

use tilebound_core::{Direction, Hitbox, ObjectId, Point};

/// High-level action an actor is performing, used to pick animations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActorAction {
    /// Standing still.
    #[default]
    Idle,
    /// Walking freely.
    Walking,
    /// Leaning against an object it is blocked by.
    Pushing,
}

/// Hero, enemy or projectile moving through an area.
///
/// Actors are not part of the area's object list; movement code receives them
/// separately so that an actor can be mutated while the area is queried.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    id: ObjectId,
    position: Point,
    hitbox: Hitbox,
    facing: Direction,
    action: ActorAction,
    action_time: u32,
}

impl Actor {
    /// Creates an actor at `position` whose movement hitbox is `hitbox`
    /// expressed relative to that position.
    #[must_use]
    pub fn new(id: ObjectId, position: Point, hitbox: Hitbox) -> Self {
        Self {
            id,
            position,
            hitbox,
            facing: Direction::Down,
            action: ActorAction::Idle,
            action_time: 0,
        }
    }

    /// Identifier of the actor.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Teleports the actor.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Moves the actor by the provided offsets without any collision check.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position = self.position.offset(dx, dy);
    }

    /// Collision rectangle in world coordinates.
    #[must_use]
    pub fn movement_hitbox(&self) -> Hitbox {
        self.hitbox.translated(self.position.x, self.position.y)
    }

    /// Direction the actor faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Turns the actor.
    pub fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
    }

    /// Current action.
    #[must_use]
    pub const fn action(&self) -> ActorAction {
        self.action
    }

    /// Ticks spent in the current action.
    #[must_use]
    pub const fn action_time(&self) -> u32 {
        self.action_time
    }

    /// Switches action, restarting the action timer only on an actual change.
    /// Returns whether the action changed.
    pub fn set_action(&mut self, action: ActorAction) -> bool {
        if self.action == action {
            return false;
        }
        self.action = action;
        self.action_time = 0;
        true
    }

    /// Advances the action timer by one tick.
    pub fn advance_action_time(&mut self) {
        self.action_time = self.action_time.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_hitbox_follows_position() {
        let mut actor = Actor::new(
            ObjectId::new(1),
            Point::new(10.0, 20.0),
            Hitbox::new(2.0, 4.0, 12.0, 12.0),
        );
        assert_eq!(actor.movement_hitbox(), Hitbox::new(12.0, 24.0, 12.0, 12.0));
        actor.translate(1.5, -2.0);
        assert_eq!(actor.movement_hitbox(), Hitbox::new(13.5, 22.0, 12.0, 12.0));
    }

    #[test]
    fn action_timer_resets_only_on_transition() {
        let mut actor = Actor::new(ObjectId::new(1), Point::default(), Hitbox::default());
        actor.advance_action_time();
        assert!(actor.set_action(ActorAction::Pushing));
        assert_eq!(actor.action_time(), 0);
        actor.advance_action_time();
        actor.advance_action_time();
        assert!(!actor.set_action(ActorAction::Pushing));
        assert_eq!(actor.action_time(), 2);
    }
}
