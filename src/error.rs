use thiserror::Error;

/// Errors raised while opening a slide or reading its tiles
#[derive(Debug, Clone, Error)]
pub enum SlideError {
    /// The slide file could not be opened
    #[error("Failed to open slide {path}: {message}")]
    Open { path: String, message: String },

    /// The slide content could not be decoded into pixels
    #[error("Decode error: {0}")]
    Decode(String),

    /// Decoding would allocate more than the configured memory limit
    #[error("Slide {path} exceeds the decode memory limit: {message}")]
    MemoryLimit { path: String, message: String },

    /// Oversample factor must be finite and at least 1.0
    #[error("Invalid oversample factor: {0} (must be finite and >= 1.0)")]
    InvalidOversample(f64),

    /// Tile size must be non-zero
    #[error("Invalid tile size: {0} (must be greater than 0)")]
    InvalidTileSize(u32),

    /// Requested tile index is not in the tile list
    #[error("Tile index {index} out of range: slide has {count} tiles")]
    TileIndexOutOfRange { index: usize, count: usize },
}

/// Errors raised by per-tile reducers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReduceError {
    /// Requested channel does not exist in the image
    #[error("Channel {channel} out of range: image has {channels} channels")]
    ChannelOutOfRange { channel: usize, channels: usize },

    /// Image has no spatial pixels to average over
    #[error("Cannot reduce an image with no pixels")]
    EmptyImage,

    /// Tensor data does not match its declared shape
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Images in a batch do not share one shape
    #[error("Batch images differ in shape: {first:?} vs {other:?}")]
    MixedShapes {
        first: (usize, usize, usize),
        other: (usize, usize, usize),
    },
}

/// Errors raised when allocating or writing output buffers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutputError {
    /// No buffer was initialized under this name
    #[error("Unknown output: {0}")]
    UnknownOutput(String),

    /// Assembly mode is not supported (only "tile" is)
    #[error("Unsupported output mode: {0} (only \"tile\" is supported)")]
    UnsupportedMode(String),

    /// Result dimensionality must be non-zero
    #[error("Output dimension must be greater than 0")]
    InvalidDim,

    /// A placed value does not have the buffer's dimensionality
    #[error("Dimension mismatch for output {name}: expected {expected}, got {actual}")]
    DimMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Tile index is not on the grid the buffers were built for
    #[error("Tile index {index} out of range: grid has {count} tiles")]
    TileIndexOutOfRange { index: usize, count: usize },

    /// Batched values and indices disagree in length
    #[error("Batch length mismatch: {values} values of dim {dim} for {indices} indices")]
    BatchLength {
        values: usize,
        dim: usize,
        indices: usize,
    },
}

/// Errors surfaced by the prefetching batch pipeline
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Reading a tile failed
    #[error("Slide error: {0}")]
    Slide(#[from] SlideError),

    /// Read tiles could not be stacked into a batch
    #[error("Batch error: {0}")]
    Batch(#[from] ReduceError),

    /// A blocking read task panicked or was cancelled
    #[error("Tile read task failed: {0}")]
    Join(String),

    /// Pipeline parameters are unusable
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from a full tiling run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Slide(#[from] SlideError),

    #[error(transparent)]
    Reduce(#[from] ReduceError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A background task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),

    /// Writing the output file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the output buffer failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
