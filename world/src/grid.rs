//! Layered tile behavior storage with a merged per-tile cache.

use tilebound_core::{TileBehaviors, TileCoord};

use crate::AreaError;

/// Dense behavior layers stacked bottom to top.
///
/// Readers only ever see `merged`, the per-tile fold of every layer computed
/// with [`TileBehaviors::merge`]. Writes go through [`BehaviorGrid::set`],
/// which recomputes the merged entry of the touched tile and nothing else.
#[derive(Clone, Debug)]
pub(crate) struct BehaviorGrid {
    columns: u32,
    rows: u32,
    layers: Vec<Vec<Option<TileBehaviors>>>,
    merged: Vec<Option<TileBehaviors>>,
}

impl BehaviorGrid {
    /// Creates a grid with a single empty layer.
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            layers: vec![vec![None; capacity]],
            merged: vec![None; capacity],
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Appends an empty layer on top of the stack and returns its index.
    pub(crate) fn push_layer(&mut self) -> usize {
        self.layers.push(vec![None; self.merged.len()]);
        self.layers.len() - 1
    }

    /// Merged behaviors of the tile, or `None` when the tile is empty or lies
    /// outside the grid.
    pub(crate) fn get(&self, tile: TileCoord) -> Option<&TileBehaviors> {
        self.index(tile)
            .and_then(|index| self.merged.get(index))
            .and_then(Option::as_ref)
    }

    /// Replaces the behaviors a single layer contributes to a tile.
    pub(crate) fn set(
        &mut self,
        layer: usize,
        tile: TileCoord,
        behaviors: Option<TileBehaviors>,
    ) -> Result<(), AreaError> {
        let count = self.layers.len();
        let Some(index) = self.index(tile) else {
            return Err(AreaError::TileOutOfBounds {
                x: tile.x,
                y: tile.y,
                columns: self.columns,
                rows: self.rows,
            });
        };
        let Some(slot) = self
            .layers
            .get_mut(layer)
            .and_then(|cells| cells.get_mut(index))
        else {
            return Err(AreaError::UnknownLayer { layer, count });
        };

        *slot = behaviors;
        self.invalidate(index);
        Ok(())
    }

    fn invalidate(&mut self, index: usize) {
        let mut merged: Option<TileBehaviors> = None;
        for layer in &self.layers {
            let Some(behaviors) = layer.get(index).and_then(Option::as_ref) else {
                continue;
            };
            merged = Some(match merged {
                Some(below) => below.merged(behaviors),
                None => behaviors.clone(),
            });
        }
        if let Some(slot) = self.merged.get_mut(index) {
            *slot = merged;
        }
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        let column = u32::try_from(tile.x).ok()?;
        let row = u32::try_from(tile.y).ok()?;
        if column < self.columns && row < self.rows {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilebound_core::{Direction, Ledges};

    #[test]
    fn new_grid_is_empty() {
        let grid = BehaviorGrid::new(3, 2);
        assert_eq!(grid.dimensions(), (3, 2));
        assert_eq!(grid.layer_count(), 1);
        assert!(grid.get(TileCoord::new(0, 0)).is_none());
        assert!(grid.get(TileCoord::new(-1, 0)).is_none());
        assert!(grid.get(TileCoord::new(3, 0)).is_none());
    }

    #[test]
    fn upper_layer_cancels_ledge_and_removal_restores_it() {
        let mut grid = BehaviorGrid::new(2, 2);
        let tile = TileCoord::new(1, 1);
        let ledge = TileBehaviors {
            ledges: Ledges::only(Direction::Down),
            ..TileBehaviors::default()
        };
        grid.set(0, tile, Some(ledge)).expect("base layer");

        let overlay = grid.push_layer();
        let cancel = TileBehaviors {
            ledges: Ledges {
                down: Some(false),
                ..Ledges::default()
            },
            ..TileBehaviors::default()
        };
        grid.set(overlay, tile, Some(cancel)).expect("overlay");
        let merged = grid.get(tile).expect("merged behaviors");
        assert!(!merged.ledges.is_ledge(Direction::Down));

        grid.set(overlay, tile, None).expect("clear overlay");
        let merged = grid.get(tile).expect("merged behaviors");
        assert!(merged.ledges.is_ledge(Direction::Down));
    }

    #[test]
    fn set_rejects_unknown_layers_and_tiles() {
        let mut grid = BehaviorGrid::new(2, 2);
        assert_eq!(
            grid.set(3, TileCoord::new(0, 0), None),
            Err(AreaError::UnknownLayer { layer: 3, count: 1 })
        );
        assert_eq!(
            grid.set(0, TileCoord::new(2, 0), None),
            Err(AreaError::TileOutOfBounds {
                x: 2,
                y: 0,
                columns: 2,
                rows: 2,
            })
        );
    }
}
