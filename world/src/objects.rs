//! Area objects and the capabilities movement code can discover on them.

use std::fmt;

use tilebound_core::{Direction, Hitbox, ObjectId, Point, TileBehaviors};

/// Consecutive ticks of contact before a pushed block starts to move.
pub const PUSH_THRESHOLD: u32 = 20;

/// Pixels a committed block travels per tick.
pub const BLOCK_SLIDE_SPEED: f32 = 2.0;

/// Anything living in an area's object list.
///
/// Only `id` and `hitbox` are mandatory. Optional capabilities are exposed
/// through the `as_*` accessors, which return `None` unless the object opts
/// in.
pub trait AreaObject: fmt::Debug {
    /// Identifier of the object.
    fn id(&self) -> ObjectId;

    /// Collision rectangle in world coordinates.
    fn hitbox(&self) -> Hitbox;

    /// Behaviors this object overlays on the tiles it covers.
    fn as_behavior_provider(&self) -> Option<&dyn BehaviorProvider> {
        None
    }

    /// Read access to the push/pull capability.
    fn as_pushable(&self) -> Option<&dyn Pushable> {
        None
    }

    /// Write access to the push/pull capability.
    fn as_pushable_mut(&mut self) -> Option<&mut dyn Pushable> {
        None
    }

    /// Called once at the end of every tick.
    fn end_tick(&mut self) {}
}

/// Objects that act as dynamic tiles.
pub trait BehaviorProvider {
    /// Behaviors at a point inside the object's hitbox.
    fn behaviors_at(&self, point: Point) -> Option<TileBehaviors>;
}

/// Objects that react to being pushed or pulled.
pub trait Pushable {
    /// Registers one tick of pushing in `direction`.
    fn on_push(&mut self, direction: Direction) -> PushResponse;

    /// Registers a pull toward `direction` by `puller`.
    fn on_pull(&mut self, direction: Direction, puller: ObjectId) -> PushResponse;

    /// Starts moving `distance` pixels in `direction`; the destination has
    /// already been checked.
    fn commit_move(&mut self, direction: Direction, distance: f32);

    /// Drops any accumulated push progress after a refused move.
    fn cancel_push(&mut self);

    /// Reports whether a committed move is still in progress.
    fn is_moving(&self) -> bool;
}

/// Reaction of a [`Pushable`] to a push or pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushResponse {
    /// The object is busy and ignored the request.
    Ignored,
    /// Contact was registered but the object does not move yet.
    Resisting,
    /// The object wants to move one tile in the provided direction.
    Ready(Direction),
}

/// Result of routing a push or pull through an area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum PushOutcome {
    /// No object carries the requested identifier.
    Missing,
    /// The object cannot be pushed or pulled.
    NotPushable,
    /// The object is mid-move and ignored the request.
    Ignored,
    /// Contact was registered; the object keeps still for now.
    Resisting,
    /// The object started moving.
    Moving,
    /// The object wanted to move but the destination was not open.
    Obstructed,
}

/// Contact bookkeeping of a pushable object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PushState {
    /// Consecutive ticks of contact so far.
    pub push_counter: u32,
    /// Whether a push arrived during the current tick.
    pub pushed_this_frame: bool,
    /// Direction of the push being counted.
    pub direction: Option<Direction>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Slide {
    direction: Direction,
    target: Point,
    remaining: f32,
}

/// Solid, tile-sized block that slides one tile after sustained pushing.
#[derive(Clone, Debug, PartialEq)]
pub struct PushableBlock {
    id: ObjectId,
    position: Point,
    size: f32,
    push: PushState,
    slide: Option<Slide>,
}

impl PushableBlock {
    /// Creates a block with its top-left corner at `position`.
    #[must_use]
    pub fn new(id: ObjectId, position: Point, size: f32) -> Self {
        Self {
            id,
            position,
            size,
            push: PushState::default(),
            slide: None,
        }
    }

    /// Top-left corner of the block.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Current contact bookkeeping.
    #[must_use]
    pub const fn push_state(&self) -> PushState {
        self.push
    }
}

impl AreaObject for PushableBlock {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position.x, self.position.y, self.size, self.size)
    }

    fn as_behavior_provider(&self) -> Option<&dyn BehaviorProvider> {
        Some(self)
    }

    fn as_pushable(&self) -> Option<&dyn Pushable> {
        Some(self)
    }

    fn as_pushable_mut(&mut self) -> Option<&mut dyn Pushable> {
        Some(self)
    }

    fn end_tick(&mut self) {
        if let Some(mut slide) = self.slide {
            let step = slide.remaining.min(BLOCK_SLIDE_SPEED);
            let (dx, dy) = slide.direction.delta();
            self.position = self.position.offset(dx as f32 * step, dy as f32 * step);
            slide.remaining -= step;
            if slide.remaining <= 0.0 {
                self.position = slide.target;
                self.slide = None;
            } else {
                self.slide = Some(slide);
            }
        } else if !self.push.pushed_this_frame {
            self.push.push_counter = 0;
            self.push.direction = None;
        }
        self.push.pushed_this_frame = false;
    }
}

impl BehaviorProvider for PushableBlock {
    fn behaviors_at(&self, _point: Point) -> Option<TileBehaviors> {
        Some(TileBehaviors::solid_tile())
    }
}

impl Pushable for PushableBlock {
    fn on_push(&mut self, direction: Direction) -> PushResponse {
        if self.slide.is_some() {
            return PushResponse::Ignored;
        }
        if self.push.direction != Some(direction) {
            self.push.push_counter = 0;
            self.push.direction = Some(direction);
        }
        if !self.push.pushed_this_frame {
            self.push.pushed_this_frame = true;
            self.push.push_counter = self.push.push_counter.saturating_add(1);
        }

        if self.push.push_counter >= PUSH_THRESHOLD {
            PushResponse::Ready(direction)
        } else {
            PushResponse::Resisting
        }
    }

    fn on_pull(&mut self, direction: Direction, _puller: ObjectId) -> PushResponse {
        if self.slide.is_some() {
            PushResponse::Ignored
        } else {
            PushResponse::Ready(direction)
        }
    }

    fn commit_move(&mut self, direction: Direction, distance: f32) {
        let (dx, dy) = direction.delta();
        self.slide = Some(Slide {
            direction,
            target: self
                .position
                .offset(dx as f32 * distance, dy as f32 * distance),
            remaining: distance,
        });
        self.push = PushState::default();
    }

    fn cancel_push(&mut self) {
        self.push = PushState::default();
    }

    fn is_moving(&self) -> bool {
        self.slide.is_some()
    }
}

/// Static object overlaying fixed behaviors on the area, such as a raised
/// crystal switch or a cloud platform.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    id: ObjectId,
    hitbox: Hitbox,
    behaviors: TileBehaviors,
}

impl Obstacle {
    /// Creates an obstacle contributing `behaviors` inside `hitbox`.
    #[must_use]
    pub fn new(id: ObjectId, hitbox: Hitbox, behaviors: TileBehaviors) -> Self {
        Self {
            id,
            hitbox,
            behaviors,
        }
    }

    /// Creates a fully solid obstacle.
    #[must_use]
    pub fn solid(id: ObjectId, hitbox: Hitbox) -> Self {
        Self::new(id, hitbox, TileBehaviors::solid_tile())
    }
}

impl AreaObject for Obstacle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    fn as_behavior_provider(&self) -> Option<&dyn BehaviorProvider> {
        Some(self)
    }
}

impl BehaviorProvider for Obstacle {
    fn behaviors_at(&self, _point: Point) -> Option<TileBehaviors> {
        Some(self.behaviors.clone())
    }
}
