#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilebound movement engine.
//!
//! This crate defines the vocabulary that connects the authoritative area
//! state, the pure collision and movement systems, and adapters. Areas store
//! [`TileBehaviors`] per tile, systems receive [`Hitbox`] values and
//! [`MovementProperties`] describing what a mover is allowed to do, and the
//! collision resolver answers with a [`MoveVerdict`]. Everything here is plain
//! data: no type in this crate touches an area or an object list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Side length of a square tile, in pixels, used when an area does not
/// configure its own.
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// Number of fixed logic ticks simulated per second of game time.
pub const TICKS_PER_SECOND: u32 = 60;

/// Cardinal movement directions available to actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing `y`.
    Up,
    /// Movement toward increasing `y`.
    Down,
    /// Movement toward decreasing `x`.
    Left,
    /// Movement toward increasing `x`.
    Right,
}

impl Direction {
    /// All four directions in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether the direction moves along the `x` axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// The two directions perpendicular to this one, negative axis first.
    #[must_use]
    pub const fn perpendicular(self) -> [Direction; 2] {
        if self.is_horizontal() {
            [Self::Up, Self::Down]
        } else {
            [Self::Left, Self::Right]
        }
    }

    /// Unit step expressed as `(dx, dy)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Location in world space measured in (sub-)pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate, growing downward.
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Integer pixel containing the point.
    #[must_use]
    pub fn pixel(self) -> PixelCoord {
        PixelCoord::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Returns the point shifted by the provided offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Whole pixel in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixelCoord {
    /// Pixel column.
    pub x: i32,
    /// Pixel row.
    pub y: i32,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile that contains this pixel for the provided tile size.
    #[must_use]
    pub fn tile(self, tile_size: u32) -> TileCoord {
        let size = tile_size.max(1) as i32;
        TileCoord::new(self.x.div_euclid(size), self.y.div_euclid(size))
    }

    /// Position of the pixel relative to the top-left corner of its tile.
    #[must_use]
    pub fn local(self, tile_size: u32) -> (i32, i32) {
        let size = tile_size.max(1) as i32;
        (self.x.rem_euclid(size), self.y.rem_euclid(size))
    }

    /// Center of the pixel expressed as a world point.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    /// Neighbouring pixel one step in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// Index of a tile in an area's grid. Signed so that off-map tiles can be
/// named by queries that wander past the edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Tile column.
    pub x: i32,
    /// Tile row.
    pub y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in sub-pixel world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub w: f32,
    /// Height in pixels.
    pub h: f32,
}

impl Hitbox {
    /// Creates a new hitbox.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Returns the hitbox shifted by the provided offsets.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Returns the hitbox shifted by `distance` in `direction`.
    #[must_use]
    pub fn moved(&self, direction: Direction, distance: f32) -> Self {
        let (dx, dy) = direction.delta();
        self.translated(dx as f32 * distance, dy as f32 * distance)
    }

    /// Reports whether the point lies inside the rectangle. The left and top
    /// edges are inclusive, the right and bottom edges exclusive.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Reports whether the two rectangles share any area.
    #[must_use]
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Integer pixel rectangle occupied by the hitbox at its truncated
    /// position.
    #[must_use]
    pub fn footprint(&self) -> PixelRect {
        PixelRect::from_hitbox(self)
    }
}

/// Inclusive rectangle of whole pixels.
///
/// The footprint of a hitbox is anchored at `floor(x), floor(y)` and keeps the
/// hitbox size, so sub-pixel motion that leaves the truncated position alone
/// never changes which pixels are occupied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Leftmost occupied column.
    pub left: i32,
    /// Topmost occupied row.
    pub top: i32,
    /// Rightmost occupied column.
    pub right: i32,
    /// Bottommost occupied row.
    pub bottom: i32,
}

impl PixelRect {
    /// Computes the footprint of a hitbox.
    #[must_use]
    pub fn from_hitbox(hitbox: &Hitbox) -> Self {
        let left = hitbox.x.floor() as i32;
        let top = hitbox.y.floor() as i32;
        let width = (hitbox.w.ceil() as i32).max(1);
        let height = (hitbox.h.ceil() as i32).max(1);
        Self {
            left,
            top,
            right: left.saturating_add(width - 1),
            bottom: top.saturating_add(height - 1),
        }
    }

    /// Number of pixel columns.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right.saturating_sub(self.left).saturating_add(1)
    }

    /// Number of pixel rows.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top).saturating_add(1)
    }

    /// Corner pixels in the order top-left, top-right, bottom-left,
    /// bottom-right.
    #[must_use]
    pub const fn corners(&self) -> [PixelCoord; 4] {
        [
            PixelCoord::new(self.left, self.top),
            PixelCoord::new(self.right, self.top),
            PixelCoord::new(self.left, self.bottom),
            PixelCoord::new(self.right, self.bottom),
        ]
    }

    /// Iterates every pixel of the rectangle row by row.
    pub fn pixels(&self) -> impl Iterator<Item = PixelCoord> {
        let (left, right) = (self.left, self.right);
        (self.top..=self.bottom)
            .flat_map(move |y| (left..=right).map(move |x| PixelCoord::new(x, y)))
    }
}

/// Sub-tile solidity expressed as a four-bit quadrant bitmap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolidMask(u8);

impl SolidMask {
    /// No quadrant is solid.
    pub const EMPTY: Self = Self(0);
    /// Top-left quadrant.
    pub const TOP_LEFT: Self = Self(0b0001);
    /// Top-right quadrant.
    pub const TOP_RIGHT: Self = Self(0b0010);
    /// Bottom-left quadrant.
    pub const BOTTOM_LEFT: Self = Self(0b0100);
    /// Bottom-right quadrant.
    pub const BOTTOM_RIGHT: Self = Self(0b1000);
    /// Every quadrant is solid.
    pub const FULL: Self = Self(0b1111);

    /// Creates a mask from raw bits; bits above the fourth are discarded.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::FULL.0)
    }

    /// Raw quadrant bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0 & Self::FULL.0
    }

    /// Reports whether no quadrant is solid.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits() == 0
    }

    /// Reports whether every quadrant is solid.
    #[must_use]
    pub const fn is_full(self) -> bool {
        self.bits() == Self::FULL.0
    }

    /// Combines two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.bits() | other.bits())
    }

    /// Reports whether the quadrant containing the tile-local pixel is solid.
    #[must_use]
    pub fn covers(self, local_x: i32, local_y: i32, tile_size: u32) -> bool {
        let half = (tile_size / 2).max(1) as i32;
        let quadrant = match (local_x >= half, local_y >= half) {
            (false, false) => Self::TOP_LEFT,
            (true, false) => Self::TOP_RIGHT,
            (false, true) => Self::BOTTOM_LEFT,
            (true, true) => Self::BOTTOM_RIGHT,
        };
        self.bits() & quadrant.bits() != 0
    }
}

/// Per-edge one-way ledge markers of a tile.
///
/// `Some(true)` marks the edge as a step-down that may only be crossed while
/// moving in that edge's direction, out of the tile. `Some(false)` explicitly
/// cancels a ledge contributed by another layer or object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Ledges {
    /// Top edge.
    pub up: Option<bool>,
    /// Bottom edge.
    pub down: Option<bool>,
    /// Left edge.
    pub left: Option<bool>,
    /// Right edge.
    pub right: Option<bool>,
}

impl Ledges {
    /// Ledges with only the provided edge marked.
    #[must_use]
    pub fn only(direction: Direction) -> Self {
        let mut ledges = Self::default();
        ledges.set(direction, Some(true));
        ledges
    }

    /// Marker stored for the edge in `direction`.
    #[must_use]
    pub const fn get(&self, direction: Direction) -> Option<bool> {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Overwrites the marker for the edge in `direction`.
    pub fn set(&mut self, direction: Direction, value: Option<bool>) {
        match direction {
            Direction::Up => self.up = value,
            Direction::Down => self.down = value,
            Direction::Left => self.left = value,
            Direction::Right => self.right = value,
        }
    }

    /// Reports whether the edge in `direction` is an active ledge.
    #[must_use]
    pub const fn is_ledge(&self, direction: Direction) -> bool {
        matches!(self.get(direction), Some(true))
    }

    /// Reports whether any edge is an active ledge.
    #[must_use]
    pub fn any(&self) -> bool {
        Direction::ALL.iter().any(|direction| self.is_ledge(*direction))
    }

    /// Folds another set of markers into this one. Explicit cancellations win
    /// over ledges from either side.
    pub fn merge(&mut self, other: &Ledges) {
        for direction in Direction::ALL {
            let merged = match (self.get(direction), other.get(direction)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), _) | (_, Some(true)) => Some(true),
                (None, None) => None,
            };
            self.set(direction, merged);
        }
    }
}

/// Orientation of a one-way boundary running diagonally through a tile. The
/// variant names the direction of descent across the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagonalLedge {
    /// Ground drops toward the top-left corner.
    UpLeft,
    /// Ground drops toward the top-right corner.
    UpRight,
    /// Ground drops toward the bottom-left corner.
    DownLeft,
    /// Ground drops toward the bottom-right corner.
    DownRight,
}

impl DiagonalLedge {
    /// Value of the linear form the boundary is a level set of: `x + y` for
    /// the up-left/down-right pair, `x - y` for the other.
    #[must_use]
    pub fn line_value(self, point: Point) -> f32 {
        match self {
            Self::UpLeft | Self::DownRight => point.x + point.y,
            Self::UpRight | Self::DownLeft => point.x - point.y,
        }
    }

    /// Level of the boundary line through the provided tile.
    #[must_use]
    pub fn boundary(self, tile: TileCoord, tile_size: u32) -> f32 {
        let size = tile_size as f32;
        match self {
            Self::UpLeft | Self::DownRight => (tile.x + tile.y + 1) as f32 * size,
            Self::UpRight | Self::DownLeft => (tile.x - tile.y) as f32 * size,
        }
    }

    /// Reports whether descending across the boundary increases
    /// [`line_value`](Self::line_value).
    #[must_use]
    pub const fn descends_increasing(self) -> bool {
        matches!(self, Self::DownRight | Self::UpRight)
    }

    /// Reports whether the point lies on the low side of the boundary of the
    /// provided tile.
    #[must_use]
    pub fn is_low_side(self, tile: TileCoord, tile_size: u32, point: Point) -> bool {
        let value = self.line_value(point);
        let boundary = self.boundary(tile, tile_size);
        if self.descends_increasing() {
            value >= boundary
        } else {
            value < boundary
        }
    }
}

/// Damage applied to actors touching a tile or object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitProperties {
    /// Damage dealt per touch.
    pub damage: u32,
    /// Whether the touch knocks the actor back.
    #[serde(default)]
    pub knockback: bool,
}

/// Movement-affecting flags of a single tile, or the merged contribution of
/// several layers and objects at one point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileBehaviors {
    /// Whole-tile solidity.
    pub solid: bool,
    /// Partial solidity by quadrant; ignored when `solid` is set.
    pub solid_mask: SolidMask,
    /// One-way step-down edges.
    pub ledges: Ledges,
    /// One-way diagonal boundary.
    pub diagonal_ledge: Option<DiagonalLedge>,
    /// Actors without `can_fall` may not enter.
    pub pit: bool,
    /// Deep water; actors without `can_swim` may not enter.
    pub water: bool,
    /// Wadeable water.
    pub shallow_water: bool,
    /// Lava floor.
    pub is_lava: bool,
    /// Ladders and vines.
    pub climbable: bool,
    /// Cloud floor that only some actors can stand on.
    pub cloud_ground: bool,
    /// Ice-like floor.
    pub slippery: bool,
    /// Minimum height an actor must have to stand here.
    pub ground_height: u8,
    /// Damage applied to overlapping actors.
    pub touch_hit: Option<HitProperties>,
}

impl TileBehaviors {
    /// Behaviors of a fully solid tile.
    #[must_use]
    pub fn solid_tile() -> Self {
        Self {
            solid: true,
            ..Self::default()
        }
    }

    /// Effective quadrant solidity.
    #[must_use]
    pub const fn solidity(&self) -> SolidMask {
        if self.solid {
            SolidMask::FULL
        } else {
            self.solid_mask
        }
    }

    /// Reports whether any part of the tile is solid.
    #[must_use]
    pub const fn is_partially_solid(&self) -> bool {
        !self.solidity().is_empty()
    }

    /// Reports whether the provided pixel is solid, interpreting the mask
    /// relative to the tile containing the pixel.
    #[must_use]
    pub fn is_solid_at(&self, pixel: PixelCoord, tile_size: u32) -> bool {
        let mask = self.solidity();
        if mask.is_empty() {
            return false;
        }
        if mask.is_full() {
            return true;
        }
        let (local_x, local_y) = pixel.local(tile_size);
        mask.covers(local_x, local_y, tile_size)
    }

    /// Reports whether the tile carries an axis-aligned or diagonal ledge.
    #[must_use]
    pub fn has_ledge(&self) -> bool {
        self.ledges.any() || self.diagonal_ledge.is_some()
    }

    /// Folds the behaviors of a more specific source into this record.
    pub fn merge(&mut self, other: &TileBehaviors) {
        self.solid |= other.solid;
        self.solid_mask = self.solid_mask.union(other.solid_mask);
        self.ledges.merge(&other.ledges);
        if other.diagonal_ledge.is_some() {
            self.diagonal_ledge = other.diagonal_ledge;
        }
        self.pit |= other.pit;
        self.water |= other.water;
        self.shallow_water |= other.shallow_water;
        self.is_lava |= other.is_lava;
        self.climbable |= other.climbable;
        self.cloud_ground |= other.cloud_ground;
        self.slippery |= other.slippery;
        self.ground_height = self.ground_height.max(other.ground_height);
        self.touch_hit = match (self.touch_hit, other.touch_hit) {
            (Some(current), Some(incoming)) if incoming.damage > current.damage => Some(incoming),
            (Some(current), _) => Some(current),
            (None, incoming) => incoming,
        };
    }

    /// Returns this record merged with `other`.
    #[must_use]
    pub fn merged(mut self, other: &TileBehaviors) -> Self {
        self.merge(other);
        self
    }
}

/// Unique identifier assigned to an actor or area object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Capabilities of a mover, passed into every movement call.
///
/// The mover itself is always part of the excluded object set; the only way
/// to build a value is through a constructor that records it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementProperties {
    /// May walk into pits.
    pub can_fall: bool,
    /// May enter deep water.
    pub can_swim: bool,
    /// Ignores one-way ledges in both directions.
    pub can_cross_ledges: bool,
    /// May slide around corners when partially blocked.
    pub can_wiggle: bool,
    /// Pushes solid objects it walks into.
    pub can_push: bool,
    /// Treats any partially solid tile as fully blocking.
    pub needs_full_tile: bool,
    mover: ObjectId,
    excluded_objects: BTreeSet<ObjectId>,
}

impl MovementProperties {
    /// Properties for `mover` with every capability disabled.
    #[must_use]
    pub fn for_mover(mover: ObjectId) -> Self {
        let mut excluded_objects = BTreeSet::new();
        let _ = excluded_objects.insert(mover);
        Self {
            can_fall: false,
            can_swim: false,
            can_cross_ledges: false,
            can_wiggle: false,
            can_push: false,
            needs_full_tile: false,
            mover,
            excluded_objects,
        }
    }

    /// Properties of the player-controlled hero.
    #[must_use]
    pub fn hero(mover: ObjectId) -> Self {
        Self {
            can_fall: true,
            can_swim: true,
            can_wiggle: true,
            can_push: true,
            ..Self::for_mover(mover)
        }
    }

    /// Properties of a flying projectile.
    #[must_use]
    pub fn projectile(mover: ObjectId) -> Self {
        Self {
            can_fall: true,
            can_swim: true,
            can_cross_ledges: true,
            ..Self::for_mover(mover)
        }
    }

    /// Identifier of the mover these properties were built for.
    #[must_use]
    pub const fn mover(&self) -> ObjectId {
        self.mover
    }

    /// Adds an object that should never block this mover.
    pub fn exclude(&mut self, object: ObjectId) {
        let _ = self.excluded_objects.insert(object);
    }

    /// Reports whether the object is ignored by collision checks.
    #[must_use]
    pub fn excludes(&self, object: ObjectId) -> bool {
        self.excluded_objects.contains(&object)
    }

    /// Copy of these properties with wiggling disabled.
    #[must_use]
    pub fn without_wiggle(&self) -> Self {
        Self {
            can_wiggle: false,
            ..self.clone()
        }
    }
}

/// Why a movement attempt was refused.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blockage {
    /// Perpendicular nudge that would let the mover slide around the corner.
    pub wiggle: Option<Direction>,
    /// Solid objects that stood in the way, in first-seen order.
    pub pushed_objects: Vec<ObjectId>,
}

/// Answer of the directional collision resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveVerdict {
    /// Nothing blocks the movement.
    Clear,
    /// The movement is refused.
    Blocked(Blockage),
}

impl MoveVerdict {
    /// Reports whether the movement may proceed.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    /// Suggested wiggle direction, if any.
    #[must_use]
    pub fn wiggle(&self) -> Option<Direction> {
        match self {
            Self::Clear => None,
            Self::Blocked(blockage) => blockage.wiggle,
        }
    }

    /// Objects that blocked the movement.
    #[must_use]
    pub fn pushed_objects(&self) -> &[ObjectId] {
        match self {
            Self::Clear => &[],
            Self::Blocked(blockage) => &blockage.pushed_objects,
        }
    }
}
