//! Prefetching, parallel-read batch pipeline.
//!
//! ```text
//!  indices ──► producer ──► [read handles] ──► batcher ──► [batches] ──► next_batch()
//!              │  ▲          bounded by         │          bounded by
//!              ▼  │          num_parallel_calls │          prefetch
//!         spawn_blocking(read_tile)             └─ awaits handles in order,
//!         (Semaphore: num_parallel_calls)          groups batch_size results
//! ```
//!
//! Reads run on tokio's blocking pool; at most `num_parallel_calls` are in
//! flight at once. Results are batched in index order regardless of which
//! read finishes first.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{PipelineError, SlideError};
use crate::slide::TileSource;
use crate::tile::{TileBatch, TileImage};

/// Default number of concurrent tile reads.
pub const DEFAULT_NUM_PARALLEL_CALLS: usize = 8;

/// Default number of tiles per batch.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Default number of batches buffered ahead of the consumer.
pub const DEFAULT_PREFETCH: usize = 512;

type ReadHandle = JoinHandle<Result<(TileImage, usize), SlideError>>;

// =============================================================================
// Pipeline Configuration
// =============================================================================

/// Pipeline tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum concurrent tile reads
    pub num_parallel_calls: usize,

    /// Tiles per batch; the final batch may be shorter
    pub batch_size: usize,

    /// Completed batches buffered ahead of the consumer
    pub prefetch: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_parallel_calls: DEFAULT_NUM_PARALLEL_CALLS,
            batch_size: DEFAULT_BATCH_SIZE,
            prefetch: DEFAULT_PREFETCH,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.num_parallel_calls == 0 {
            return Err(PipelineError::InvalidConfig(
                "num_parallel_calls must be greater than 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if self.prefetch == 0 {
            return Err(PipelineError::InvalidConfig(
                "prefetch must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tile Pipeline
// =============================================================================

/// A running batch pipeline over a [`TileSource`].
///
/// Background tasks start on construction and are aborted when the pipeline
/// is dropped, so the pipeline's lifetime is the scope of all its work.
///
/// # Example
///
/// ```ignore
/// let mut pipeline = TilePipeline::spawn(Arc::new(slide), PipelineConfig::default())?;
/// while let Some(batch) = pipeline.next_batch().await? {
///     let blue = blue_content_batch(&batch)?;
///     outputs.place_batch(&blue, batch.indices(), "blue", OutputMode::Tile)?;
/// }
/// ```
pub struct TilePipeline {
    batches: mpsc::Receiver<Result<TileBatch, PipelineError>>,
    producer: JoinHandle<()>,
    batcher: JoinHandle<()>,
}

impl TilePipeline {
    /// Start a pipeline over every tile of `source`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(source: Arc<S>, config: PipelineConfig) -> Result<Self, PipelineError>
    where
        S: TileSource + 'static,
    {
        let indices = source.generate_index();
        Self::from_indices(source, indices, config)
    }

    /// Start a pipeline over an explicit index sequence.
    pub fn from_indices<S, I>(
        source: Arc<S>,
        indices: I,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError>
    where
        S: TileSource + 'static,
        I: IntoIterator<Item = usize>,
        I::IntoIter: Send + 'static,
    {
        config.validate()?;

        info!(
            slide = source.identifier(),
            num_parallel_calls = config.num_parallel_calls,
            batch_size = config.batch_size,
            prefetch = config.prefetch,
            "Starting tile pipeline"
        );

        let (read_tx, read_rx) = mpsc::channel(config.num_parallel_calls);
        let (batch_tx, batch_rx) = mpsc::channel(config.prefetch);
        let permits = Arc::new(Semaphore::new(config.num_parallel_calls));

        let producer = tokio::spawn(produce_reads(
            source,
            indices.into_iter(),
            permits,
            read_tx,
        ));
        let batcher = tokio::spawn(collect_batches(read_rx, config.batch_size, batch_tx));

        Ok(Self {
            batches: batch_rx,
            producer,
            batcher,
        })
    }

    /// Wait for the next batch.
    ///
    /// Returns `Ok(None)` once every index has been delivered. After an
    /// `Err`, the pipeline stops and the next call returns `Ok(None)`.
    pub async fn next_batch(&mut self) -> Result<Option<TileBatch>, PipelineError> {
        self.batches.recv().await.transpose()
    }
}

impl Drop for TilePipeline {
    fn drop(&mut self) {
        self.producer.abort();
        self.batcher.abort();
    }
}

/// Spawn one blocking read per index, holding a permit for its duration.
async fn produce_reads<S, I>(
    source: Arc<S>,
    indices: I,
    permits: Arc<Semaphore>,
    reads: mpsc::Sender<ReadHandle>,
) where
    S: TileSource + 'static,
    I: Iterator<Item = usize>,
{
    for index in indices {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };

        let source = Arc::clone(&source);
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            source.read_tile(index).map(|img| (img, index))
        });

        if reads.send(handle).await.is_err() {
            debug!(index, "Batcher stopped, halting reads");
            break;
        }
    }
}

/// Await reads in submission order and group them into batches.
async fn collect_batches(
    mut reads: mpsc::Receiver<ReadHandle>,
    batch_size: usize,
    batches: mpsc::Sender<Result<TileBatch, PipelineError>>,
) {
    let mut pending = Vec::with_capacity(batch_size);

    while let Some(handle) = reads.recv().await {
        let item = match handle.await {
            Ok(Ok(item)) => item,
            Ok(Err(e)) => {
                let _ = batches.send(Err(e.into())).await;
                return;
            }
            Err(e) => {
                let _ = batches.send(Err(PipelineError::Join(e.to_string()))).await;
                return;
            }
        };

        pending.push(item);
        if pending.len() == batch_size {
            let full = std::mem::replace(&mut pending, Vec::with_capacity(batch_size));
            if !send_batch(&batches, full).await {
                return;
            }
        }
    }

    if !pending.is_empty() {
        send_batch(&batches, pending).await;
    }
}

async fn send_batch(
    batches: &mpsc::Sender<Result<TileBatch, PipelineError>>,
    tiles: Vec<(TileImage, usize)>,
) -> bool {
    let batch = TileBatch::from_tiles(tiles).map_err(PipelineError::from);
    if let Ok(ref batch) = batch {
        debug!(
            size = batch.len(),
            first = batch.indices().first().copied(),
            "Batch ready"
        );
    }
    let failed = batch.is_err();
    batches.send(batch).await.is_ok() && !failed
}

// =============================================================================
// Tests
// =============================================================================
