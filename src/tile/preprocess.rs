use std::fmt;
use std::sync::Arc;

use super::tensor::TileImage;

type PreprocessFn = dyn Fn(TileImage) -> TileImage + Send + Sync;

/// Per-tile transform applied right after a tile is read.
///
/// Cloning is cheap; the transform is shared behind an `Arc` so the same
/// preprocessing can run on many reader threads at once.
#[derive(Clone, Default)]
pub struct Preprocess {
    func: Option<Arc<PreprocessFn>>,
}

impl Preprocess {
    /// Leave tiles untouched.
    pub fn identity() -> Self {
        Self { func: None }
    }

    pub fn new(func: impl Fn(TileImage) -> TileImage + Send + Sync + 'static) -> Self {
        Self {
            func: Some(Arc::new(func)),
        }
    }

    /// Rescale 8-bit samples to `0.0..=1.0`.
    pub fn unit_scale() -> Self {
        Self::new(|tile| tile.map_values(|v| v / 255.0))
    }

    pub fn is_identity(&self) -> bool {
        self.func.is_none()
    }

    pub fn apply(&self, tile: TileImage) -> TileImage {
        match &self.func {
            Some(func) => func(tile),
            None => tile,
        }
    }
}

impl fmt::Debug for Preprocess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            f.write_str("Preprocess(identity)")
        } else {
            f.write_str("Preprocess(custom)")
        }
    }
}
