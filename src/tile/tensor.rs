//! Tile tensors.
//!
//! Tiles are handed to reducers as dense `f32` tensors in row-major order:
//!
//! - [`TileImage`]: one image, layout `(height, width, channels)`
//! - [`TileBatch`]: `N` images of equal shape, layout
//!   `(n, height, width, channels)`, with the tile index of each image
//!
//! Channel values of a freshly read tile are the raw 8-bit samples widened to
//! `f32`. Any rescaling is the job of a [`super::Preprocess`].

use image::RgbImage;

use crate::error::ReduceError;

// =============================================================================
// Tile Image
// =============================================================================

/// A single tile as an `(H, W, C)` tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f32>,
}

impl TileImage {
    /// Wrap raw HWC data.
    ///
    /// Fails if `data.len() != height * width * channels`.
    pub fn from_vec(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, ReduceError> {
        let expected = height * width * channels;
        if data.len() != expected {
            return Err(ReduceError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// An image where every sample is `value`.
    pub fn filled(height: usize, width: usize, channels: usize, value: f32) -> Self {
        Self {
            height,
            width,
            channels,
            data: vec![value; height * width * channels],
        }
    }

    pub fn zeros(height: usize, width: usize, channels: usize) -> Self {
        Self::filled(height, width, channels, 0.0)
    }

    pub fn ones(height: usize, width: usize, channels: usize) -> Self {
        Self::filled(height, width, channels, 1.0)
    }

    /// Convert an 8-bit RGB image, keeping raw sample values.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let data = image.as_raw().iter().map(|&v| f32::from(v)).collect();
        Self {
            height: image.height() as usize,
            width: image.width() as usize,
            channels: 3,
            data,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    /// Number of spatial positions (`height * width`).
    pub fn pixel_count(&self) -> usize {
        self.height * self.width
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Sample at row `y`, column `x`, channel `c`.
    pub fn get(&self, y: usize, x: usize, c: usize) -> Option<f32> {
        if y >= self.height || x >= self.width || c >= self.channels {
            return None;
        }
        self.data
            .get((y * self.width + x) * self.channels + c)
            .copied()
    }

    /// Apply `f` to every sample.
    pub fn map_values(mut self, f: impl Fn(f32) -> f32) -> Self {
        for value in &mut self.data {
            *value = f(*value);
        }
        self
    }
}

// =============================================================================
// Tile Batch
// =============================================================================

/// A batch of equally-shaped tiles as an `(N, H, W, C)` tensor.
///
/// `indices()[i]` is the tile index of image `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct TileBatch {
    height: usize,
    width: usize,
    channels: usize,
    indices: Vec<usize>,
    data: Vec<f32>,
}

impl TileBatch {
    /// Stack `(image, index)` pairs into one batch, preserving order.
    pub fn from_tiles(tiles: Vec<(TileImage, usize)>) -> Result<Self, ReduceError> {
        let (height, width, channels) = tiles
            .first()
            .map(|(img, _)| img.shape())
            .unwrap_or((0, 0, 0));

        let mut indices = Vec::with_capacity(tiles.len());
        let mut data = Vec::with_capacity(tiles.len() * height * width * channels);

        for (img, idx) in tiles {
            if img.shape() != (height, width, channels) {
                return Err(ReduceError::MixedShapes {
                    first: (height, width, channels),
                    other: img.shape(),
                });
            }
            indices.push(idx);
            data.extend(img.into_vec());
        }

        Ok(Self {
            height,
            width,
            channels,
            indices,
            data,
        })
    }

    /// Number of images in the batch.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// `(n, height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.len(), self.height, self.width, self.channels)
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Raw HWC samples of image `i`.
    pub fn image_slice(&self, i: usize) -> Option<&[f32]> {
        if i >= self.len() {
            return None;
        }
        let stride = self.height * self.width * self.channels;
        Some(&self.data[i * stride..(i + 1) * stride])
    }

    /// Copy image `i` out as a standalone [`TileImage`].
    pub fn image(&self, i: usize) -> Option<TileImage> {
        self.image_slice(i).map(|data| TileImage {
            height: self.height,
            width: self.width,
            channels: self.channels,
            data: data.to_vec(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
