//! Tiling drivers.
//!
//! Two ways of running a reducer over every tile of a slide and placing the
//! results into an output buffer:
//!
//! - [`run_generator`]: synchronous, one tile at a time
//! - [`run_pipeline`]: batched through a prefetching [`TilePipeline`]
//!
//! Both expect the named buffer to be initialized beforehand and produce
//! identical buffers for the same slide and reducer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::RunError;
use crate::output::{OutputBuffer, OutputMode, OutputSet};
use crate::pipeline::{PipelineConfig, TilePipeline};
use crate::reduce::Reducer;
use crate::slide::TileSource;

/// Name of the output buffer the CLI writes blue-content results into.
pub const BLUE_OUTPUT: &str = "blue";

/// What a driver did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Tiles in the slide's tile list
    pub tile_count: usize,

    /// Tiles reduced and placed
    pub processed: usize,

    /// Batches consumed (0 for the synchronous driver)
    pub batches: usize,

    /// Wall-clock time of the processing loop
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Reduce every tile in order and place each result into `name`.
pub fn run_generator<S, R>(
    source: &S,
    reducer: &R,
    outputs: &mut OutputSet,
    name: &str,
) -> Result<RunSummary, RunError>
where
    S: TileSource + ?Sized,
    R: Reducer + ?Sized,
{
    let start = Instant::now();
    let mut processed = 0;

    for item in source.generator() {
        let (img, idx) = item?;
        let result = reducer.reduce(&img)?;
        outputs.place(&result, idx, name, OutputMode::Tile)?;
        processed += 1;
    }

    let summary = RunSummary {
        tile_count: source.tile_count(),
        processed,
        batches: 0,
        elapsed: start.elapsed(),
    };
    info!(
        slide = source.identifier(),
        processed,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Generator finished"
    );
    Ok(summary)
}

/// Drive a [`TilePipeline`] to exhaustion, placing batched results into
/// `name`.
///
/// Any error stops the run; the pipeline is torn down on return.
pub async fn run_pipeline<S, R>(
    source: Arc<S>,
    reducer: &R,
    outputs: &mut OutputSet,
    name: &str,
    config: PipelineConfig,
) -> Result<RunSummary, RunError>
where
    S: TileSource + 'static,
    R: Reducer + ?Sized,
{
    let tile_count = source.tile_count();
    let start = Instant::now();
    let mut pipeline = TilePipeline::spawn(source, config)?;

    let mut processed = 0;
    let mut batches = 0;
    while let Some(batch) = pipeline.next_batch().await? {
        let results = reducer.reduce_batch(&batch)?;
        outputs.place_batch(&results, batch.indices(), name, OutputMode::Tile)?;

        processed += batch.len();
        batches += 1;
        debug!(batch = batches, size = batch.len(), "Placed batch");
    }

    let elapsed = start.elapsed();
    info!(
        processed,
        batches,
        elapsed_ms = elapsed.as_millis() as u64,
        "Iterator exhausted"
    );

    Ok(RunSummary {
        tile_count,
        processed,
        batches,
        elapsed,
    })
}

/// Write a buffer as pretty-printed JSON.
pub fn write_output(buffer: &OutputBuffer, path: &Path) -> Result<(), RunError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, buffer)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!(output = buffer.name(), path = %path.display(), "Wrote output");
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
