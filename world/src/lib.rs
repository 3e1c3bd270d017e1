#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative area state for Tilebound.
//!
//! An [`Area`] owns the layered tile behavior grid of one loaded map together
//! with the live objects standing on it. Systems read it through the
//! [`query`] module and mutate it only through explicit operations: tile
//! patches, object registration and the push/pull protocol.

mod actor;
mod definition;
mod grid;
mod objects;

use tilebound_core::{
    Direction, Hitbox, MovementProperties, ObjectId, Point, TileBehaviors, TileCoord,
};
use tracing::debug;

pub use actor::{Actor, ActorAction};
pub use definition::{AreaDefinition, AreaError, ObjectDefinition, EMPTY_TILE_SYMBOL};
pub use objects::{
    AreaObject, BehaviorProvider, Obstacle, PushOutcome, PushResponse, PushState, Pushable,
    PushableBlock, BLOCK_SLIDE_SPEED, PUSH_THRESHOLD,
};

use grid::BehaviorGrid;

/// One loaded map: its tile behavior grid and the objects placed on it.
#[derive(Debug)]
pub struct Area {
    tile_size: u32,
    grid: BehaviorGrid,
    objects: Vec<Box<dyn AreaObject>>,
}

impl Area {
    /// Creates an empty area of `columns` by `rows` tiles.
    #[must_use]
    pub fn new(columns: u32, rows: u32, tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            grid: BehaviorGrid::new(columns, rows),
            objects: Vec::new(),
        }
    }

    /// Instantiates an area from its static description.
    pub fn from_definition(definition: &AreaDefinition) -> Result<Self, AreaError> {
        if definition.tile_size == 0 {
            return Err(AreaError::ZeroTileSize);
        }

        let palette = definition::resolve_palette(&definition.palette)?;
        let mut area = Self::new(definition.columns, definition.rows, definition.tile_size);

        for layer in 0..definition.layers.len() {
            if layer > 0 {
                let _ = area.grid.push_layer();
            }
            for (column, row, symbol) in definition::layer_symbols(definition, layer)? {
                if symbol == EMPTY_TILE_SYMBOL {
                    continue;
                }
                let Some(behaviors) = palette.get(&symbol) else {
                    return Err(AreaError::UnknownTile { layer, symbol });
                };
                area.grid.set(
                    layer,
                    TileCoord::new(column as i32, row as i32),
                    Some((*behaviors).clone()),
                )?;
            }
        }

        let tile = area.tile_size as f32;
        for object in &definition.objects {
            let boxed: Box<dyn AreaObject> = match object {
                ObjectDefinition::Block { id, x, y } => Box::new(PushableBlock::new(
                    ObjectId::new(*id),
                    Point::new(*x, *y),
                    tile,
                )),
                ObjectDefinition::Obstacle {
                    id,
                    hitbox,
                    behaviors,
                } => Box::new(Obstacle::new(
                    ObjectId::new(*id),
                    *hitbox,
                    behaviors.clone(),
                )),
            };
            let _ = area.add_object(boxed)?;
        }

        debug!(
            columns = definition.columns,
            rows = definition.rows,
            layers = area.grid.layer_count(),
            objects = area.objects.len(),
            "area_loaded"
        );
        Ok(area)
    }

    /// Side length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    /// Number of behavior layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.grid.layer_count()
    }

    /// Adds an empty behavior layer on top and returns its index.
    pub fn push_layer(&mut self) -> usize {
        self.grid.push_layer()
    }

    /// Reports whether the point lies on the map.
    #[must_use]
    pub fn is_in_bounds(&self, point: Point) -> bool {
        let (columns, rows) = self.dimensions();
        let size = self.tile_size as f32;
        point.x >= 0.0
            && point.y >= 0.0
            && point.x < columns as f32 * size
            && point.y < rows as f32 * size
    }

    /// Reports whether the whole hitbox lies on the map.
    #[must_use]
    pub fn contains_hitbox(&self, hitbox: &Hitbox) -> bool {
        let footprint = hitbox.footprint();
        footprint
            .corners()
            .iter()
            .all(|corner| self.is_in_bounds(corner.center()))
    }

    /// Merged static behaviors of a tile. Off-map and empty tiles yield
    /// `None`.
    #[must_use]
    pub fn tile_behaviors(&self, tile: TileCoord) -> Option<&TileBehaviors> {
        self.grid.get(tile)
    }

    /// Replaces what one layer contributes to a tile at runtime, for example
    /// when a staff tile is placed or a brittle floor breaks.
    pub fn patch_tile(
        &mut self,
        layer: usize,
        tile: TileCoord,
        behaviors: Option<TileBehaviors>,
    ) -> Result<(), AreaError> {
        self.grid.set(layer, tile, behaviors)?;
        debug!(layer, x = tile.x, y = tile.y, "tile_patched");
        Ok(())
    }

    /// Registers an object, rejecting duplicate identifiers.
    pub fn add_object(&mut self, object: Box<dyn AreaObject>) -> Result<ObjectId, AreaError> {
        let id = object.id();
        if self.object_index(id).is_some() {
            return Err(AreaError::DuplicateObject(id.get()));
        }
        debug!(object = id.get(), "object_added");
        self.objects.push(object);
        Ok(id)
    }

    /// Removes an object from the area.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Box<dyn AreaObject>> {
        let index = self.object_index(id)?;
        Some(self.objects.remove(index))
    }

    /// Looks up an object by identifier.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&dyn AreaObject> {
        self.objects
            .iter()
            .find(|object| object.id() == id)
            .map(|object| object.as_ref())
    }

    /// Iterates the objects in registration order.
    pub fn objects(&self) -> impl Iterator<Item = &dyn AreaObject> + '_ {
        self.objects.iter().map(|object| object.as_ref())
    }

    /// Delivers one tick of pushing to an object.
    pub fn push_object(&mut self, id: ObjectId, direction: Direction) -> PushOutcome {
        let Some(index) = self.object_index(id) else {
            return PushOutcome::Missing;
        };
        let response = match self.objects[index].as_pushable_mut() {
            Some(pushable) => pushable.on_push(direction),
            None => return PushOutcome::NotPushable,
        };
        self.resolve_push(index, response, &MovementProperties::for_mover(id))
    }

    /// Delivers a pull toward `direction` by `puller` to an object.
    pub fn pull_object(
        &mut self,
        id: ObjectId,
        direction: Direction,
        puller: ObjectId,
    ) -> PushOutcome {
        let Some(index) = self.object_index(id) else {
            return PushOutcome::Missing;
        };
        let response = match self.objects[index].as_pushable_mut() {
            Some(pushable) => pushable.on_pull(direction, puller),
            None => return PushOutcome::NotPushable,
        };
        let mut properties = MovementProperties::for_mover(id);
        properties.exclude(puller);
        self.resolve_push(index, response, &properties)
    }

    /// Finishes the current tick for every object.
    pub fn end_tick(&mut self) {
        for object in &mut self.objects {
            object.end_tick();
        }
    }

    fn resolve_push(
        &mut self,
        index: usize,
        response: PushResponse,
        properties: &MovementProperties,
    ) -> PushOutcome {
        let direction = match response {
            PushResponse::Ignored => return PushOutcome::Ignored,
            PushResponse::Resisting => return PushOutcome::Resisting,
            PushResponse::Ready(direction) => direction,
        };

        let distance = self.tile_size as f32;
        let destination = self.objects[index].hitbox().moved(direction, distance);
        let open = self.contains_hitbox(&destination)
            && query::is_hitbox_open(self, &destination, properties);

        let object = &mut self.objects[index];
        let id = object.id();
        let Some(pushable) = object.as_pushable_mut() else {
            return PushOutcome::NotPushable;
        };
        if open {
            pushable.commit_move(direction, distance);
            debug!(object = id.get(), ?direction, "object_moving");
            PushOutcome::Moving
        } else {
            pushable.cancel_push();
            debug!(object = id.get(), ?direction, "object_obstructed");
            PushOutcome::Obstructed
        }
    }

    fn object_index(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id() == id)
    }
}

/// Query functions that provide read-only access to an area.
///
/// Every query is permissive off the map: points outside the grid carry no
/// tile behaviors, so they are neither solid, ledges, pits nor water. Use
/// [`Area::is_in_bounds`] where the distinction matters.
pub mod query {
    use tilebound_core::{Hitbox, MovementProperties, ObjectId, Point, TileBehaviors};

    use super::{Area, AreaObject};

    /// Static behaviors of the tile containing the point.
    #[must_use]
    pub fn tile_behaviors_at(area: &Area, point: Point) -> Option<&TileBehaviors> {
        area.tile_behaviors(point.pixel().tile(area.tile_size()))
    }

    /// Tile behaviors at the point merged with those of every object covering
    /// it.
    #[must_use]
    pub fn composite_behaviors(area: &Area, point: Point) -> TileBehaviors {
        merge_objects(area, point, |_| true)
    }

    /// Like [`composite_behaviors`] but skipping objects excluded by the
    /// mover's properties.
    #[must_use]
    pub fn composite_behaviors_for(
        area: &Area,
        point: Point,
        properties: &MovementProperties,
    ) -> TileBehaviors {
        merge_objects(area, point, |object| !properties.excludes(object.id()))
    }

    /// Reports whether the object is solid at a point.
    #[must_use]
    pub fn object_is_solid_at(object: &dyn AreaObject, point: Point) -> bool {
        if !object.hitbox().contains(point) {
            return false;
        }
        object
            .as_behavior_provider()
            .and_then(|provider| provider.behaviors_at(point))
            .is_some_and(|behaviors| behaviors.is_partially_solid())
    }

    /// Identifiers of non-excluded objects that are solid at the point, in
    /// registration order.
    pub fn solid_objects_at<'a>(
        area: &'a Area,
        point: Point,
        properties: &'a MovementProperties,
    ) -> impl Iterator<Item = ObjectId> + 'a {
        area.objects()
            .filter(move |object| !properties.excludes(object.id()))
            .filter(move |object| object_is_solid_at(*object, point))
            .map(|object| object.id())
    }

    /// Composite behaviors at the four corner pixels of a hitbox footprint,
    /// ordered top-left, top-right, bottom-left, bottom-right. Floor effects
    /// aggregate these themselves.
    #[must_use]
    pub fn corner_behaviors(area: &Area, hitbox: &Hitbox) -> [TileBehaviors; 4] {
        hitbox
            .footprint()
            .corners()
            .map(|corner| composite_behaviors(area, corner.center()))
    }

    /// Reports whether a mover with the provided properties may occupy the
    /// point.
    #[must_use]
    pub fn is_point_open(area: &Area, point: Point, properties: &MovementProperties) -> bool {
        let pixel = point.pixel();
        let tile_size = area.tile_size();
        if let Some(tile) = area.tile_behaviors(pixel.tile(tile_size)) {
            let solid = if properties.needs_full_tile {
                tile.is_partially_solid()
            } else {
                tile.is_solid_at(pixel, tile_size)
            };
            if solid {
                return false;
            }
        }
        if solid_objects_at(area, point, properties).next().is_some() {
            return false;
        }

        let composite = composite_behaviors_for(area, point, properties);
        !(composite.pit && !properties.can_fall) && !(composite.water && !properties.can_swim)
    }

    /// Reports whether every pixel of the hitbox footprint is open.
    #[must_use]
    pub fn is_hitbox_open(area: &Area, hitbox: &Hitbox, properties: &MovementProperties) -> bool {
        hitbox
            .footprint()
            .pixels()
            .all(|pixel| is_point_open(area, pixel.center(), properties))
    }

    fn merge_objects<F>(area: &Area, point: Point, mut include: F) -> TileBehaviors
    where
        F: FnMut(&dyn AreaObject) -> bool,
    {
        let mut behaviors = tile_behaviors_at(area, point).cloned().unwrap_or_default();
        for object in area.objects() {
            if !include(object) || !object.hitbox().contains(point) {
                continue;
            }
            if let Some(extra) = object
                .as_behavior_provider()
                .and_then(|provider| provider.behaviors_at(point))
            {
                behaviors.merge(&extra);
            }
        }
        behaviors
    }
}
