//! Tile grid layout.
//!
//! Tiles are square crops of `tile_size` pixels laid on a regular grid. The
//! oversample factor shrinks the step between neighbouring tiles so that they
//! overlap:
//!
//! ```text
//! stride = max(1, round(tile_size / oversample_factor))
//!
//! oversample 1.0            oversample 2.0
//! ┌────┬────┬────┐          ┌────┐
//! │ 0  │ 1  │ 2  │          │ 0 ┌┼───┐
//! └────┴────┴────┘          └───┼┘ 1┌┼───┐
//!                               └───┼┘ 2 │
//!                                   └────┘
//! ```
//!
//! Along an axis of length `L`, the grid holds `1` tile when `L <= tile_size`
//! and `ceil((L - tile_size) / stride) + 1` tiles otherwise, so the last tile
//! always reaches the far edge. Tiles hanging over the edge are zero-padded
//! by the reader. An axis of length 0 holds no tiles.

use serde::Serialize;

use crate::error::SlideError;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default oversample factor: half-tile steps, each pixel covered by up to
/// four tiles.
pub const DEFAULT_OVERSAMPLE_FACTOR: f64 = 2.0;

// =============================================================================
// Tile Coordinate
// =============================================================================

/// Position of one tile on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileCoord {
    /// Position in the tile list
    pub index: usize,

    /// Grid row (0 = top)
    pub row: usize,

    /// Grid column (0 = left)
    pub col: usize,

    /// Left edge in slide pixels
    pub x: u32,

    /// Top edge in slide pixels
    pub y: u32,
}

// =============================================================================
// Tile Grid
// =============================================================================

/// Row-major list of tile positions covering a slide.
///
/// `tile_list()[i].index == i` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: u32,
    stride: u32,
    rows: usize,
    cols: usize,
    tiles: Vec<TileCoord>,
}

impl TileGrid {
    /// Lay out tiles over a `width x height` slide.
    ///
    /// # Errors
    ///
    /// Returns an error if `tile_size` is 0 or `oversample_factor` is not a
    /// finite number >= 1.0.
    pub fn new(
        width: u32,
        height: u32,
        tile_size: u32,
        oversample_factor: f64,
    ) -> Result<Self, SlideError> {
        if tile_size == 0 {
            return Err(SlideError::InvalidTileSize(tile_size));
        }
        if !oversample_factor.is_finite() || oversample_factor < 1.0 {
            return Err(SlideError::InvalidOversample(oversample_factor));
        }

        let stride = stride_for(tile_size, oversample_factor);
        let rows = axis_count(height, tile_size, stride);
        let cols = axis_count(width, tile_size, stride);

        let mut tiles = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                tiles.push(TileCoord {
                    index: tiles.len(),
                    row,
                    col,
                    x: col as u32 * stride,
                    y: row as u32 * stride,
                });
            }
        }

        Ok(Self {
            width,
            height,
            tile_size,
            stride,
            rows,
            cols,
            tiles,
        })
    }

    /// Slide `(width, height)` the grid was laid over.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Step between neighbouring tiles in pixels.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn tile_list(&self) -> &[TileCoord] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TileCoord> {
        self.tiles.get(index)
    }
}

/// Step between tiles for a given tile size and oversample factor.
pub fn stride_for(tile_size: u32, oversample_factor: f64) -> u32 {
    (f64::from(tile_size) / oversample_factor).round().max(1.0) as u32
}

fn axis_count(length: u32, tile_size: u32, stride: u32) -> usize {
    if length == 0 {
        0
    } else if length <= tile_size {
        1
    } else {
        (length - tile_size).div_ceil(stride) as usize + 1
    }
}

// =============================================================================
// Tests
// =============================================================================
