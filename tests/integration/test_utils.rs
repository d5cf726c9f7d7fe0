//! Test utilities for integration tests.
//!
//! This module provides synthetic slide images with known per-tile content
//! and an in-memory `TileSource` with read tracking.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, Rgb, RgbImage};

use wsi_tiler::{Slide, SlideError, SlideOptions, TileGrid, TileImage, TileSource};

// =============================================================================
// Synthetic Slides
// =============================================================================

/// Green value painted into tile `index` by [`indexed_tiles_image`].
pub fn green_for(index: usize) -> f64 {
    (index * 10) as f64
}

/// An image made of `cols x rows` solid blocks of `tile` pixels.
///
/// Block `i` (row-major) has red 255, green `10 * i` and blue 0, so with a
/// matching grid every tile has a known constant channel-1 mean.
pub fn indexed_tiles_image(cols: u32, rows: u32, tile: u32) -> RgbImage {
    assert!(cols * rows <= 26, "green channel would overflow");

    RgbImage::from_fn(cols * tile, rows * tile, |x, y| {
        let index = (y / tile) * cols + x / tile;
        Rgb([255, (index * 10) as u8, 0])
    })
}

/// Build an in-memory slide from [`indexed_tiles_image`].
pub fn indexed_slide(cols: u32, rows: u32, tile: u32, options: SlideOptions) -> Slide {
    let img = indexed_tiles_image(cols, rows, tile);
    Slide::from_image("indexed", DynamicImage::ImageRgb8(img), options).unwrap()
}

/// Save an image under `dir`; the format follows the file extension.
pub fn write_slide(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

// =============================================================================
// Fixture Source
// =============================================================================

/// A `TileSource` whose tile `i` is filled with `i`, tracking every read.
pub struct FixtureSource {
    grid: Arc<TileGrid>,
    tile_size: usize,
    fail_at: Option<usize>,
    reads: AtomicUsize,
}

impl FixtureSource {
    /// `cols x rows` adjacent tiles of `tile` pixels.
    pub fn new(cols: u32, rows: u32, tile: u32) -> Self {
        let grid = TileGrid::new(cols * tile, rows * tile, tile, 1.0).unwrap();
        Self {
            grid: Arc::new(grid),
            tile_size: tile as usize,
            fail_at: None,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl TileSource for FixtureSource {
    fn identifier(&self) -> &str {
        "fixture"
    }

    fn grid(&self) -> &Arc<TileGrid> {
        &self.grid
    }

    fn read_tile(&self, index: usize) -> Result<TileImage, SlideError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if index >= self.tile_count() {
            return Err(SlideError::TileIndexOutOfRange {
                index,
                count: self.tile_count(),
            });
        }
        if self.fail_at == Some(index) {
            return Err(SlideError::Decode(format!("corrupt tile {}", index)));
        }

        Ok(TileImage::filled(
            self.tile_size,
            self.tile_size,
            3,
            index as f32,
        ))
    }
}
