//! Per-tile reducers.
//!
//! A reducer collapses a tile into a small result vector that is later
//! placed into an output buffer. All reducers here average over the spatial
//! axes `(H, W)` of each image:
//!
//! - single image `(H, W, C)` → one result
//! - batch `(N, H, W, C)` → one result per image, never averaged across `N`
//!
//! The batch form is always exactly the single-image form applied to each
//! image in turn.

use crate::error::ReduceError;
use crate::tile::{TileBatch, TileImage};

/// Channel index of the blue-content statistic.
pub const BLUE_CONTENT_CHANNEL: usize = 1;

// =============================================================================
// Reducer Trait
// =============================================================================

/// Collapses a tile into a fixed-length result vector.
pub trait Reducer: Send + Sync {
    /// Length of the result vector for one tile.
    fn dim(&self) -> usize;

    /// Reduce one image.
    fn reduce(&self, image: &TileImage) -> Result<Vec<f32>, ReduceError>;

    /// Reduce every image of a batch.
    ///
    /// Returns `batch.len() * dim()` values, image-major.
    fn reduce_batch(&self, batch: &TileBatch) -> Result<Vec<f32>, ReduceError> {
        let mut out = Vec::with_capacity(batch.len() * self.dim());
        for i in 0..batch.len() {
            if let Some(image) = batch.image(i) {
                out.extend(self.reduce(&image)?);
            }
        }
        Ok(out)
    }
}

/// Mean of one channel over the spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMean {
    pub channel: usize,
}

impl ChannelMean {
    pub fn new(channel: usize) -> Self {
        Self { channel }
    }

    /// The blue-content statistic (channel 1).
    pub fn blue() -> Self {
        Self::new(BLUE_CONTENT_CHANNEL)
    }
}

impl Reducer for ChannelMean {
    fn dim(&self) -> usize {
        1
    }

    fn reduce(&self, image: &TileImage) -> Result<Vec<f32>, ReduceError> {
        channel_mean(image, self.channel).map(|v| vec![v])
    }

    fn reduce_batch(&self, batch: &TileBatch) -> Result<Vec<f32>, ReduceError> {
        channel_mean_batch(batch, self.channel)
    }
}

// =============================================================================
// Channel Mean
// =============================================================================

/// Mean of `channel` over the spatial axes of an `(H, W, C)` image.
///
/// # Errors
///
/// Returns an error if the channel does not exist or the image has no
/// pixels.
pub fn channel_mean(image: &TileImage, channel: usize) -> Result<f32, ReduceError> {
    mean_of_channel(
        image.as_slice(),
        image.pixel_count(),
        image.channels(),
        channel,
    )
}

/// Per-image mean of `channel` over the spatial axes of an `(N, H, W, C)`
/// batch.
///
/// Returns one value per image. An empty batch yields an empty vector.
pub fn channel_mean_batch(batch: &TileBatch, channel: usize) -> Result<Vec<f32>, ReduceError> {
    let (n, height, width, channels) = batch.shape();
    (0..n)
        .map(|i| {
            let data = batch.image_slice(i).unwrap_or_default();
            mean_of_channel(data, height * width, channels, channel)
        })
        .collect()
}

/// Mean of channel 1 of one image.
pub fn blue_content(image: &TileImage) -> Result<f32, ReduceError> {
    channel_mean(image, BLUE_CONTENT_CHANNEL)
}

/// Mean of channel 1 of each image in a batch.
pub fn blue_content_batch(batch: &TileBatch) -> Result<Vec<f32>, ReduceError> {
    channel_mean_batch(batch, BLUE_CONTENT_CHANNEL)
}

fn mean_of_channel(
    data: &[f32],
    pixels: usize,
    channels: usize,
    channel: usize,
) -> Result<f32, ReduceError> {
    if channel >= channels {
        return Err(ReduceError::ChannelOutOfRange { channel, channels });
    }
    if pixels == 0 {
        return Err(ReduceError::EmptyImage);
    }

    // Accumulate in f64 so large tiles don't lose precision
    let sum: f64 = data
        .iter()
        .skip(channel)
        .step_by(channels)
        .map(|&v| f64::from(v))
        .sum();

    Ok((sum / pixels as f64) as f32)
}

// =============================================================================
// Tests
// =============================================================================
