#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ledge-crossing estimator used for height and layer bookkeeping.

use tilebound_core::{Direction, Point, TileCoord};
use tilebound_world::Area;

/// Estimates how many ledges the straight segment from `start` to `end`
/// crosses.
///
/// Every tile in the bounding tile range of the segment that carries an
/// active edge ledge or a diagonal ledge contributes one half-plane test per
/// boundary. Crossing a boundary in its direction of descent counts `-1`,
/// crossing it the other way counts `+1`.
///
/// Only the sign of the result is reliable. Boundaries are tested as
/// unbounded lines, so on segments spanning several tiles a ledge can be
/// counted once per tile in its row or column. Reversing the segment always
/// negates the result.
#[must_use]
pub fn get_ledge_delta(area: &Area, start: Point, end: Point) -> i32 {
    let tile_size = area.tile_size();
    let first = start.pixel().tile(tile_size);
    let last = end.pixel().tile(tile_size);

    let mut delta = 0;
    for y in first.y.min(last.y)..=first.y.max(last.y) {
        for x in first.x.min(last.x)..=first.x.max(last.x) {
            let tile = TileCoord::new(x, y);
            let Some(behaviors) = area.tile_behaviors(tile) else {
                continue;
            };

            for direction in Direction::ALL {
                if behaviors.ledges.is_ledge(direction) {
                    delta += edge_crossing(tile, tile_size, direction, start, end);
                }
            }

            if let Some(ledge) = behaviors.diagonal_ledge {
                delta += crossing(
                    ledge.line_value(start),
                    ledge.line_value(end),
                    ledge.boundary(tile, tile_size),
                    ledge.descends_increasing(),
                );
            }
        }
    }
    delta
}

fn edge_crossing(
    tile: TileCoord,
    tile_size: u32,
    direction: Direction,
    start: Point,
    end: Point,
) -> i32 {
    let size = tile_size as f32;
    let (from, to, boundary) = match direction {
        Direction::Up => (start.y, end.y, tile.y as f32 * size),
        Direction::Down => (start.y, end.y, (tile.y + 1) as f32 * size),
        Direction::Left => (start.x, end.x, tile.x as f32 * size),
        Direction::Right => (start.x, end.x, (tile.x + 1) as f32 * size),
    };
    let descends_increasing = matches!(direction, Direction::Down | Direction::Right);
    crossing(from, to, boundary, descends_increasing)
}

/// Signed crossing of the level `boundary` by a value moving from `from` to
/// `to`. Values equal to the boundary count as past it.
fn crossing(from: f32, to: f32, boundary: f32, descends_increasing: bool) -> i32 {
    let increasing = from < boundary && to >= boundary;
    let decreasing = from >= boundary && to < boundary;
    match (increasing, decreasing, descends_increasing) {
        (true, _, true) | (_, true, false) => -1,
        (true, _, false) | (_, true, true) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::crossing;

    #[test]
    fn crossing_is_signed_by_descent_sense() {
        assert_eq!(crossing(10.0, 20.0, 16.0, true), -1);
        assert_eq!(crossing(20.0, 10.0, 16.0, true), 1);
        assert_eq!(crossing(20.0, 10.0, 16.0, false), -1);
        assert_eq!(crossing(10.0, 20.0, 16.0, false), 1);
        assert_eq!(crossing(10.0, 12.0, 16.0, true), 0);
    }

    #[test]
    fn landing_on_the_boundary_counts_as_crossing() {
        assert_eq!(crossing(15.5, 16.0, 16.0, true), -1);
        assert_eq!(crossing(16.0, 15.5, 16.0, true), 1);
        assert_eq!(crossing(16.0, 16.0, 16.0, true), 0);
    }
}
