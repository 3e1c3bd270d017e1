//! Static area descriptions and the errors raised while instantiating them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tilebound_core::{Hitbox, TileBehaviors, DEFAULT_TILE_SIZE};

/// Layer symbol that contributes no behaviors to its tile.
pub const EMPTY_TILE_SYMBOL: char = '.';

/// Serializable description of an area as authored by content.
///
/// Each layer is a list of rows and each row a string with one palette symbol
/// per tile. Layers are stacked in order; later layers are more specific and
/// may cancel ledges of the layers below with explicit `false` markers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaDefinition {
    /// Side length of a tile in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Behaviors referenced by single-character symbols.
    #[serde(default)]
    pub palette: BTreeMap<String, TileBehaviors>,
    /// Behavior layers, bottom first.
    #[serde(default)]
    pub layers: Vec<Vec<String>>,
    /// Objects placed in the area when it loads.
    #[serde(default)]
    pub objects: Vec<ObjectDefinition>,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

/// Placement of an object inside an [`AreaDefinition`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObjectDefinition {
    /// Tile-sized block the hero can push or pull.
    Block {
        /// Identifier of the block.
        id: u32,
        /// Left edge in pixels.
        x: f32,
        /// Top edge in pixels.
        y: f32,
    },
    /// Static object that overlays its own behaviors on the tiles it covers.
    Obstacle {
        /// Identifier of the obstacle.
        id: u32,
        /// Area covered by the obstacle.
        hitbox: Hitbox,
        /// Behaviors contributed inside the hitbox.
        #[serde(default = "TileBehaviors::solid_tile")]
        behaviors: TileBehaviors,
    },
}

/// Errors raised while building or patching an area.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AreaError {
    /// The definition asked for zero-pixel tiles.
    #[error("tile size must be at least one pixel")]
    ZeroTileSize,
    /// A layer does not have one row per area row.
    #[error("layer {layer} has {actual} rows but the area is {expected} rows tall")]
    RowCountMismatch {
        /// Offending layer.
        layer: usize,
        /// Rows declared by the area.
        expected: u32,
        /// Rows found in the layer.
        actual: usize,
    },
    /// A row does not have one symbol per area column.
    #[error("row {row} of layer {layer} has {actual} tiles but the area is {expected} tiles wide")]
    RowWidthMismatch {
        /// Offending layer.
        layer: usize,
        /// Offending row.
        row: usize,
        /// Columns declared by the area.
        expected: u32,
        /// Symbols found in the row.
        actual: usize,
    },
    /// A palette key is not a single character.
    #[error("palette key {key:?} must be exactly one character")]
    InvalidPaletteKey {
        /// The rejected key.
        key: String,
    },
    /// A layer uses a symbol the palette does not define.
    #[error("symbol {symbol:?} in layer {layer} is not defined in the palette")]
    UnknownTile {
        /// Offending layer.
        layer: usize,
        /// The undefined symbol.
        symbol: char,
    },
    /// Two objects share an identifier.
    #[error("object id {0} is used more than once")]
    DuplicateObject(u32),
    /// A patch targeted a tile outside the grid.
    #[error("tile ({x}, {y}) lies outside the {columns}x{rows} area")]
    TileOutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
        /// Columns in the area.
        columns: u32,
        /// Rows in the area.
        rows: u32,
    },
    /// A patch targeted a layer that does not exist.
    #[error("layer {layer} does not exist; the area has {count} layers")]
    UnknownLayer {
        /// Requested layer.
        layer: usize,
        /// Layers in the area.
        count: usize,
    },
}

/// Resolves palette keys into single characters.
pub(crate) fn resolve_palette(
    palette: &BTreeMap<String, TileBehaviors>,
) -> Result<BTreeMap<char, &TileBehaviors>, AreaError> {
    let mut resolved = BTreeMap::new();
    for (key, behaviors) in palette {
        let mut chars = key.chars();
        let (Some(symbol), None) = (chars.next(), chars.next()) else {
            return Err(AreaError::InvalidPaletteKey { key: key.clone() });
        };
        if symbol == EMPTY_TILE_SYMBOL {
            return Err(AreaError::InvalidPaletteKey { key: key.clone() });
        }
        let _ = resolved.insert(symbol, behaviors);
    }
    Ok(resolved)
}

/// Checks a layer's shape and yields the symbol of every tile as
/// `(column, row, symbol)`.
pub(crate) fn layer_symbols(
    definition: &AreaDefinition,
    layer: usize,
) -> Result<Vec<(u32, u32, char)>, AreaError> {
    let Some(rows) = definition.layers.get(layer) else {
        return Ok(Vec::new());
    };
    if rows.len() != definition.rows as usize {
        return Err(AreaError::RowCountMismatch {
            layer,
            expected: definition.rows,
            actual: rows.len(),
        });
    }

    let mut symbols = Vec::with_capacity(rows.len() * definition.columns as usize);
    for (row_index, row) in rows.iter().enumerate() {
        let width = row.chars().count();
        if width != definition.columns as usize {
            return Err(AreaError::RowWidthMismatch {
                layer,
                row: row_index,
                expected: definition.columns,
                actual: width,
            });
        }
        for (column_index, symbol) in row.chars().enumerate() {
            symbols.push((column_index as u32, row_index as u32, symbol));
        }
    }
    Ok(symbols)
}
