//! Output buffers for per-tile results.
//!
//! Reducer results are written into named buffers laid over the slide's tile
//! grid. In `tile` mode each grid cell holds one result vector:
//!
//! ```text
//!   tile_list[idx] = (row, col)         buffer "blue" (rows x cols x dim)
//!  ┌──────────────────────────┐        ┌─────┬─────┬─────┐
//!  │ place(x, idx, "blue") ───┼──────► │     │  x  │     │
//!  └──────────────────────────┘        ├─────┼─────┼─────┤
//!                                      │     │     │     │
//!                                      └─────┴─────┴─────┘
//! ```
//!
//! Placement accumulates and counts hits, so a cell placed more than once can
//! be averaged with [`OutputBuffer::averaged`].

mod buffer;
mod set;

pub use buffer::{OutputBuffer, OutputMode};
pub use set::OutputSet;
