//! Batched, prefetching tile pipeline.
//!
//! [`TilePipeline`] turns an index sequence into a stream of [`TileBatch`]es.
//! Scheduling, threads and backpressure all come from tokio; this module only
//! wires a producer, a bounded set of blocking reads, a batcher and a bounded
//! prefetch queue together.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wsi_tiler::pipeline::{PipelineConfig, TilePipeline};
//! use wsi_tiler::slide::{Slide, SlideOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let slide = Arc::new(Slide::open("slide.tiff", SlideOptions::new(2.0))?);
//! let mut pipeline = TilePipeline::spawn(slide, PipelineConfig::default())?;
//!
//! while let Some(batch) = pipeline.next_batch().await? {
//!     println!("batch of {} tiles", batch.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`TileBatch`]: crate::tile::TileBatch

mod dataset;

pub use dataset::{
    PipelineConfig, TilePipeline, DEFAULT_BATCH_SIZE, DEFAULT_NUM_PARALLEL_CALLS, DEFAULT_PREFETCH,
};
