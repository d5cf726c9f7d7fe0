//! Tile tensors and per-tile preprocessing.
//!
//! Everything a reducer sees passes through this module:
//!
//! ```text
//! ┌──────────────┐   read_tile()   ┌───────────┐  apply()  ┌───────────┐
//! │    Slide     │ ──────────────► │ TileImage │ ────────► │ TileImage │
//! │  (RGB crop)  │                 │  (raw u8  │ Preprocess│ (reducer  │
//! └──────────────┘                 │  as f32)  │           │  input)   │
//!                                  └───────────┘           └─────┬─────┘
//!                                                                │ batching
//!                                                                ▼
//!                                                          ┌───────────┐
//!                                                          │ TileBatch │
//!                                                          └───────────┘
//! ```
//!
//! # Components
//!
//! - [`TileImage`]: one tile, `(H, W, C)`
//! - [`TileBatch`]: stacked tiles, `(N, H, W, C)`, with their tile indices
//! - [`Preprocess`]: optional transform applied after every read
//!
//! # Example
//!
//! ```
//! use wsi_tiler::tile::{Preprocess, TileImage};
//!
//! let raw = TileImage::filled(4, 4, 3, 255.0);
//! let scaled = Preprocess::unit_scale().apply(raw);
//! assert_eq!(scaled.get(0, 0, 1), Some(1.0));
//! ```

mod preprocess;
mod tensor;

pub use preprocess::Preprocess;
pub use tensor::{TileBatch, TileImage};
