//! Slide abstraction layer.
//!
//! This module turns a slide into an indexed list of tiles that drivers can
//! iterate, read at random, or feed into the batch pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     run_generator / TilePipeline        │
//! └────────────────────┬────────────────────┘
//!                      │ generator() / generate_index()
//!                      ▼ read_tile(index)
//! ┌─────────────────────────────────────────┐
//! │           TileSource Trait              │
//! │  (index-addressed tile interface)       │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │     Slide       │    │      TileGrid       │
//! │ (decoded image) │    │ (row-major layout)  │
//! └─────────────────┘    └─────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use wsi_tiler::slide::{Slide, SlideOptions, TileSource};
//!
//! let slide = Slide::open("path/to/slide.tiff", SlideOptions::new(2.0))?;
//! println!("{} tiles", slide.tile_list().len());
//!
//! // Random access by index
//! let tile = slide.read_tile(0)?;
//! # Ok::<(), wsi_tiler::SlideError>(())
//! ```

mod grid;
mod reader;
mod source;

pub use grid::{stride_for, TileCoord, TileGrid, DEFAULT_OVERSAMPLE_FACTOR, DEFAULT_TILE_SIZE};
pub use reader::{Slide, SlideOptions};
pub use source::{TileGenerator, TileSource};
