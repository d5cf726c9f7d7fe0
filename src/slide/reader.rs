//! Image-backed slide reader.
//!
//! [`Slide`] decodes a slide file once with the `image` crate, lays a
//! [`TileGrid`] over it and serves zero-padded RGB crops by tile index.
//! Decoding itself is entirely up to `image`; any format it can open (JPEG,
//! PNG, TIFF) can be tiled.
//!
//! The whole level-0 raster stays in memory as 8-bit RGB, so a slide costs
//! `width * height * 3` bytes for as long as the [`Slide`] lives: about
//! 30 GB for a 100k x 100k slide. The decoder runs without the `image`
//! crate's default 512 MiB allocation cap unless
//! [`SlideOptions::memory_limit`] sets one.

use std::path::Path;
use std::sync::Arc;

use image::imageops;
use image::{DynamicImage, ImageError, ImageReader, Limits, RgbImage};
use tracing::{debug, info};

use crate::error::SlideError;
use crate::tile::{Preprocess, TileImage};

use super::grid::{TileCoord, TileGrid, DEFAULT_OVERSAMPLE_FACTOR, DEFAULT_TILE_SIZE};
use super::source::TileSource;

// =============================================================================
// Slide Options
// =============================================================================

/// Options controlling how a slide is tiled.
#[derive(Debug, Clone)]
pub struct SlideOptions {
    /// Overlap multiplier; 1.0 means adjacent tiles, 2.0 means half-tile steps
    pub oversample_factor: f64,

    /// Tile edge length in pixels
    pub tile_size: u32,

    /// Transform applied to every tile after it is read
    pub preprocess: Preprocess,

    /// Maximum bytes the decoder may allocate; `None` means unlimited
    pub memory_limit: Option<u64>,
}

impl Default for SlideOptions {
    fn default() -> Self {
        Self {
            oversample_factor: DEFAULT_OVERSAMPLE_FACTOR,
            tile_size: DEFAULT_TILE_SIZE,
            preprocess: Preprocess::identity(),
            memory_limit: None,
        }
    }
}

impl SlideOptions {
    /// Default options with the given oversample factor.
    pub fn new(oversample_factor: f64) -> Self {
        Self {
            oversample_factor,
            ..Self::default()
        }
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_preprocess(mut self, preprocess: Preprocess) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Cap decoder allocations at `bytes`.
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit = Some(bytes);
        self
    }
}

// =============================================================================
// Slide
// =============================================================================

/// A decoded slide with its tile grid.
///
/// # Example
///
/// ```no_run
/// use wsi_tiler::slide::{Slide, SlideOptions, TileSource};
///
/// let slide = Slide::open("slide.tiff", SlideOptions::new(2.0))?;
/// for item in slide.generator() {
///     let (img, idx) = item?;
///     println!("tile {} is {:?}", idx, img.shape());
/// }
/// # Ok::<(), wsi_tiler::SlideError>(())
/// ```
pub struct Slide {
    identifier: String,
    image: RgbImage,
    grid: Arc<TileGrid>,
    options: SlideOptions,
}

impl Slide {
    /// Open and decode a slide file.
    ///
    /// The format is guessed from the file content, falling back to the
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid, the file cannot be read,
    /// decoding would exceed [`SlideOptions::memory_limit`], or its content
    /// cannot be decoded.
    pub fn open(path: impl AsRef<Path>, options: SlideOptions) -> Result<Self, SlideError> {
        let path = path.as_ref();
        let identifier = path.display().to_string();

        // Reject bad options before paying for a decode
        TileGrid::new(0, 0, options.tile_size, options.oversample_factor)?;

        let open_error = |e: std::io::Error| SlideError::Open {
            path: identifier.clone(),
            message: e.to_string(),
        };
        let mut reader = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(open_error)?;

        match options.memory_limit {
            Some(bytes) => {
                let mut limits = Limits::default();
                limits.max_alloc = Some(bytes);
                reader.limits(limits);
            }
            None => reader.no_limits(),
        }

        let image = reader
            .decode()
            .map_err(|e| decode_error(&identifier, e))?;

        Self::build(identifier, image.into_rgb8(), options)
    }

    /// Build a slide from an already decoded image.
    pub fn from_image(
        identifier: impl Into<String>,
        image: DynamicImage,
        options: SlideOptions,
    ) -> Result<Self, SlideError> {
        Self::build(identifier.into(), image.into_rgb8(), options)
    }

    fn build(
        identifier: String,
        image: RgbImage,
        options: SlideOptions,
    ) -> Result<Self, SlideError> {
        let grid = TileGrid::new(
            image.width(),
            image.height(),
            options.tile_size,
            options.oversample_factor,
        )?;

        let (rows, cols) = grid.shape();
        info!(
            slide = %identifier,
            width = image.width(),
            height = image.height(),
            rows,
            cols,
            stride = grid.stride(),
            "Opened slide"
        );

        Ok(Self {
            identifier,
            image,
            grid: Arc::new(grid),
            options,
        })
    }

    /// Slide `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn oversample_factor(&self) -> f64 {
        self.options.oversample_factor
    }

    pub fn tile_size(&self) -> u32 {
        self.options.tile_size
    }

    pub fn preprocess(&self) -> &Preprocess {
        &self.options.preprocess
    }

    /// Read the tile at `coord`, padding with zeros past the slide edge.
    ///
    /// The crop is preprocessed before it is returned.
    pub fn read_region(&self, coord: &TileCoord) -> TileImage {
        let size = self.options.tile_size;
        let inside = imageops::crop_imm(&self.image, coord.x, coord.y, size, size).to_image();

        let region = if inside.dimensions() == (size, size) {
            inside
        } else {
            let mut padded = RgbImage::new(size, size);
            imageops::replace(&mut padded, &inside, 0, 0);
            padded
        };

        self.options.preprocess.apply(TileImage::from_rgb(&region))
    }
}

fn decode_error(identifier: &str, error: ImageError) -> SlideError {
    match error {
        ImageError::IoError(io_err) => SlideError::Open {
            path: identifier.to_string(),
            message: io_err.to_string(),
        },
        ImageError::Limits(limit_err) => SlideError::MemoryLimit {
            path: identifier.to_string(),
            message: limit_err.to_string(),
        },
        other => SlideError::Decode(other.to_string()),
    }
}

impl TileSource for Slide {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn grid(&self) -> &Arc<TileGrid> {
        &self.grid
    }

    fn read_tile(&self, index: usize) -> Result<TileImage, SlideError> {
        let coord = self
            .grid
            .get(index)
            .ok_or(SlideError::TileIndexOutOfRange {
                index,
                count: self.grid.len(),
            })?;

        debug!(index, x = coord.x, y = coord.y, "Reading tile");
        Ok(self.read_region(coord))
    }
}

impl std::fmt::Debug for Slide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slide")
            .field("identifier", &self.identifier)
            .field("dimensions", &self.dimensions())
            .field("grid", &self.grid.shape())
            .field("options", &self.options)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
