#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Directional collision resolver.
//!
//! Given a hitbox, a direction and the mover's capabilities, the resolver
//! decides whether the hitbox may advance one pixel. It inspects the leading
//! edge, the strip of pixels immediately beyond the hitbox footprint, one
//! sample per pixel so that no obstacle at least one pixel wide is skipped.
//!
//! Every sample pairs the footprint pixel it starts from with the pixel it
//! would enter. A sample is blocked by solidity only when it crosses *into*
//! something solid, which lets movers escape geometry they already overlap.

use tilebound_core::{
    Blockage, Direction, Hitbox, MoveVerdict, MovementProperties, ObjectId, PixelCoord,
    PixelRect, TileCoord,
};
use tilebound_world::{query, Area};

/// Resolves a one pixel step upward.
#[must_use]
pub fn can_move_up(area: &Area, hitbox: &Hitbox, properties: &MovementProperties) -> MoveVerdict {
    can_move(area, hitbox, Direction::Up, properties)
}

/// Resolves a one pixel step downward.
#[must_use]
pub fn can_move_down(
    area: &Area,
    hitbox: &Hitbox,
    properties: &MovementProperties,
) -> MoveVerdict {
    can_move(area, hitbox, Direction::Down, properties)
}

/// Resolves a one pixel step to the left.
#[must_use]
pub fn can_move_left(
    area: &Area,
    hitbox: &Hitbox,
    properties: &MovementProperties,
) -> MoveVerdict {
    can_move(area, hitbox, Direction::Left, properties)
}

/// Resolves a one pixel step to the right.
#[must_use]
pub fn can_move_right(
    area: &Area,
    hitbox: &Hitbox,
    properties: &MovementProperties,
) -> MoveVerdict {
    can_move(area, hitbox, Direction::Right, properties)
}

/// Resolves a one pixel step of `hitbox` in `direction`.
///
/// The verdict is [`MoveVerdict::Clear`] when every leading-edge sample is
/// open. A ledge, pit or water sample blocks without a wiggle suggestion.
/// When only solids block and exactly one end of the edge is blocked, a
/// wiggle-capable mover is told to slide toward the open end. Solid objects
/// met on the way are reported so that the caller can push them.
#[must_use]
pub fn can_move(
    area: &Area,
    hitbox: &Hitbox,
    direction: Direction,
    properties: &MovementProperties,
) -> MoveVerdict {
    let mut pushed_objects = Vec::new();
    let samples: Vec<Sample> = leading_edge(hitbox.footprint(), direction)
        .map(|from| classify(area, from, direction, properties, &mut pushed_objects))
        .collect();

    if samples.iter().all(|sample| *sample == Sample::Open) {
        return MoveVerdict::Clear;
    }

    let wiggle = if samples.contains(&Sample::Impassable) || !properties.can_wiggle {
        None
    } else {
        wiggle_direction(&samples, direction)
    };

    MoveVerdict::Blocked(Blockage {
        wiggle,
        pushed_objects,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Sample {
    Open,
    Solid,
    Impassable,
}

/// Footprint pixels along the side facing `direction`, ordered top to bottom
/// for horizontal movement and left to right for vertical movement.
fn leading_edge(footprint: PixelRect, direction: Direction) -> impl Iterator<Item = PixelCoord> {
    let PixelRect {
        left,
        top,
        right,
        bottom,
    } = footprint;
    let (fixed, range) = match direction {
        Direction::Up => (top, left..=right),
        Direction::Down => (bottom, left..=right),
        Direction::Left => (left, top..=bottom),
        Direction::Right => (right, top..=bottom),
    };
    range.map(move |along| {
        if direction.is_horizontal() {
            PixelCoord::new(fixed, along)
        } else {
            PixelCoord::new(along, fixed)
        }
    })
}

fn classify(
    area: &Area,
    from: PixelCoord,
    direction: Direction,
    properties: &MovementProperties,
    pushed_objects: &mut Vec<ObjectId>,
) -> Sample {
    let to = from.step(direction);
    let solid = crosses_into_tile_solid(area, from, to, properties)
        | crosses_into_objects(area, from, to, properties, pushed_objects);

    if crosses_ledge(area, from, to, direction, properties) || enters_hazard(area, from, to, properties)
    {
        Sample::Impassable
    } else if solid {
        Sample::Solid
    } else {
        Sample::Open
    }
}

fn crosses_into_tile_solid(
    area: &Area,
    from: PixelCoord,
    to: PixelCoord,
    properties: &MovementProperties,
) -> bool {
    let tile_size = area.tile_size();
    let solid_at = |pixel: PixelCoord| {
        area.tile_behaviors(pixel.tile(tile_size))
            .is_some_and(|behaviors| {
                if properties.needs_full_tile {
                    behaviors.is_partially_solid()
                } else {
                    behaviors.is_solid_at(pixel, tile_size)
                }
            })
    };
    solid_at(to) && !solid_at(from)
}

fn crosses_into_objects(
    area: &Area,
    from: PixelCoord,
    to: PixelCoord,
    properties: &MovementProperties,
    pushed_objects: &mut Vec<ObjectId>,
) -> bool {
    let (from, to) = (from.center(), to.center());
    let mut blocked = false;
    for object in area.objects() {
        if properties.excludes(object.id()) {
            continue;
        }
        if query::object_is_solid_at(object, to) && !query::object_is_solid_at(object, from) {
            blocked = true;
            if !pushed_objects.contains(&object.id()) {
                pushed_objects.push(object.id());
            }
        }
    }
    blocked
}

fn crosses_ledge(
    area: &Area,
    from: PixelCoord,
    to: PixelCoord,
    direction: Direction,
    properties: &MovementProperties,
) -> bool {
    if properties.can_cross_ledges {
        return false;
    }

    let tile_size = area.tile_size();
    let (from_tile, to_tile) = (from.tile(tile_size), to.tile(tile_size));
    if from_tile != to_tile {
        let entered = query::composite_behaviors_for(area, to.center(), properties);
        if entered.ledges.is_ledge(direction.opposite()) {
            return true;
        }
    }

    let climbs_diagonal = |pixel: PixelCoord, tile: TileCoord| {
        query::composite_behaviors_for(area, pixel.center(), properties)
            .diagonal_ledge
            .is_some_and(|ledge| {
                ledge.is_low_side(tile, tile_size, from.center())
                    && !ledge.is_low_side(tile, tile_size, to.center())
            })
    };
    climbs_diagonal(to, to_tile) || (from_tile != to_tile && climbs_diagonal(from, from_tile))
}

fn enters_hazard(
    area: &Area,
    from: PixelCoord,
    to: PixelCoord,
    properties: &MovementProperties,
) -> bool {
    if properties.can_fall && properties.can_swim {
        return false;
    }
    let source = query::composite_behaviors_for(area, from.center(), properties);
    let target = query::composite_behaviors_for(area, to.center(), properties);
    (!properties.can_fall && target.pit && !source.pit)
        || (!properties.can_swim && target.water && !source.water)
}

fn wiggle_direction(samples: &[Sample], direction: Direction) -> Option<Direction> {
    let first = samples.first()? != &Sample::Open;
    let last = samples.last()? != &Sample::Open;
    let [negative, positive] = direction.perpendicular();
    match (first, last) {
        (true, false) => Some(positive),
        (false, true) => Some(negative),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_edge_lists_pixels_in_axis_order() {
        let footprint = PixelRect {
            left: 2,
            top: 5,
            right: 4,
            bottom: 6,
        };
        let right: Vec<_> = leading_edge(footprint, Direction::Right).collect();
        assert_eq!(right, vec![PixelCoord::new(4, 5), PixelCoord::new(4, 6)]);
        let up: Vec<_> = leading_edge(footprint, Direction::Up).collect();
        assert_eq!(
            up,
            vec![
                PixelCoord::new(2, 5),
                PixelCoord::new(3, 5),
                PixelCoord::new(4, 5),
            ]
        );
    }

    #[test]
    fn wiggle_points_to_the_open_end() {
        use Sample::{Open, Solid};
        assert_eq!(
            wiggle_direction(&[Solid, Solid, Open], Direction::Right),
            Some(Direction::Down)
        );
        assert_eq!(
            wiggle_direction(&[Open, Solid], Direction::Down),
            Some(Direction::Left)
        );
        assert_eq!(wiggle_direction(&[Solid, Open, Solid], Direction::Up), None);
        assert_eq!(wiggle_direction(&[Open, Solid, Open], Direction::Up), None);
    }
}
