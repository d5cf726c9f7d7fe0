//! `TileSource` trait for index-addressed tile access.
//!
//! Drivers never touch slide pixels directly. They walk a source's tile list,
//! ask it for the content of a tile index, and hand the result to a reducer.
//! Anything that can turn an index into a [`TileImage`] can be tiled this way,
//! whether it is backed by a decoded image, a remote store or a test fixture.

use std::ops::Range;
use std::sync::Arc;

use crate::error::SlideError;
use crate::tile::TileImage;

use super::grid::{TileCoord, TileGrid};

// =============================================================================
// TileSource Trait
// =============================================================================

/// Index-addressed access to the tiles of one slide.
///
/// Implementations must be thread-safe: the batch pipeline calls
/// [`read_tile`](TileSource::read_tile) from several blocking threads at once.
pub trait TileSource: Send + Sync {
    /// Identifier used in logs (typically the slide path).
    fn identifier(&self) -> &str;

    /// The grid the tile indices refer to.
    fn grid(&self) -> &Arc<TileGrid>;

    /// Read the content of tile `index`.
    ///
    /// Can be called in any order, independently of [`generator`](TileSource::generator).
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::TileIndexOutOfRange`] if `index` is not in the
    /// tile list, or a read error from the backing store.
    fn read_tile(&self, index: usize) -> Result<TileImage, SlideError>;

    /// All tile positions, row-major.
    fn tile_list(&self) -> &[TileCoord] {
        self.grid().tile_list()
    }

    fn tile_count(&self) -> usize {
        self.tile_list().len()
    }

    /// Lazily read every tile in index order as `(image, index)`.
    ///
    /// The generator is exhausted after one pass; call again to restart.
    fn generator(&self) -> TileGenerator<'_, Self> {
        TileGenerator {
            source: self,
            next: 0,
        }
    }

    /// Every tile index, for feeding an external batching layer.
    fn generate_index(&self) -> Range<usize> {
        0..self.tile_count()
    }
}

// =============================================================================
// Tile Generator
// =============================================================================

/// Iterator over `(image, index)` pairs of a [`TileSource`].
///
/// A failed read is yielded as `Err` and iteration continues with the next
/// index.
pub struct TileGenerator<'a, S: TileSource + ?Sized> {
    source: &'a S,
    next: usize,
}

impl<S: TileSource + ?Sized> Iterator for TileGenerator<'_, S> {
    type Item = Result<(TileImage, usize), SlideError>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next;
        if index >= self.source.tile_count() {
            return None;
        }
        self.next += 1;

        Some(self.source.read_tile(index).map(|img| (img, index)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.source.tile_count().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<S: TileSource + ?Sized> ExactSizeIterator for TileGenerator<'_, S> {}

// =============================================================================
// Tests
// =============================================================================
