//! # WSI Tiler
//!
//! Tile a Whole Slide Image (WSI) and reduce every tile into a per-tile
//! output map.
//!
//! A slide is split into a grid of square, optionally overlapping tiles. Each
//! tile is read as an `(H, W, C)` tensor, collapsed by a [`Reducer`] into a
//! small result vector, and placed into a named output buffer at the tile's
//! grid position.
//!
//! ## Features
//!
//! - **Oversampled grids**: the oversample factor controls how much
//!   neighbouring tiles overlap
//! - **Two drivers**: a synchronous generator and a parallel, prefetching
//!   batch pipeline on tokio
//! - **Explicit reducer axes**: reducers always average over spatial axes,
//!   for single images and batches alike
//! - **JSON export**: output buffers serialize with serde
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`slide`] - Slide decoding, tile grid and the `TileSource` trait
//! - [`tile`] - Tile tensors and preprocessing
//! - [`reduce`] - Per-tile reducers (`blue_content` and friends)
//! - [`output`] - Named output buffers and placement
//! - [`pipeline`] - Prefetching batch pipeline
//! - [`runner`] - Drivers tying the above together
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wsi_tiler::{
//!     run_generator, ChannelMean, OutputMode, OutputSet, Slide, SlideOptions, TileSource,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let slide = Slide::open("slide.tiff", SlideOptions::new(2.0))?;
//!
//! let mut outputs = OutputSet::new(Arc::clone(slide.grid()));
//! outputs.initialize("blue", 1, OutputMode::Tile)?;
//!
//! let summary = run_generator(&slide, &ChannelMean::blue(), &mut outputs, "blue")?;
//! println!("processed {} tiles", summary.tile_count);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod reduce;
pub mod runner;
pub mod slide;
pub mod tile;

// Re-export commonly used types
pub use config::{
    Cli, Command, GenerateConfig, InfoConfig, PipelineRunConfig, ReduceArgs, SlideArgs,
};
pub use error::{OutputError, PipelineError, ReduceError, RunError, SlideError};
pub use output::{OutputBuffer, OutputMode, OutputSet};
pub use pipeline::{
    PipelineConfig, TilePipeline, DEFAULT_BATCH_SIZE, DEFAULT_NUM_PARALLEL_CALLS, DEFAULT_PREFETCH,
};
pub use reduce::{
    blue_content, blue_content_batch, channel_mean, channel_mean_batch, ChannelMean, Reducer,
    BLUE_CONTENT_CHANNEL,
};
pub use runner::{run_generator, run_pipeline, write_output, RunSummary, BLUE_OUTPUT};
pub use slide::{
    stride_for, Slide, SlideOptions, TileCoord, TileGenerator, TileGrid, TileSource,
    DEFAULT_OVERSAMPLE_FACTOR, DEFAULT_TILE_SIZE,
};
pub use tile::{Preprocess, TileBatch, TileImage};
