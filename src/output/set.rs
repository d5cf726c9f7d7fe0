use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::OutputError;
use crate::slide::{TileCoord, TileGrid};

use super::buffer::{OutputBuffer, OutputMode};

/// Named output buffers laid over one tile grid.
///
/// Tile indices passed to [`place`](OutputSet::place) are resolved through
/// the grid, so a result always lands at the row and column of the tile it
/// was computed from.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wsi_tiler::output::{OutputMode, OutputSet};
/// use wsi_tiler::slide::TileGrid;
///
/// let grid = Arc::new(TileGrid::new(512, 256, 256, 1.0)?);
/// let mut outputs = OutputSet::new(grid);
///
/// outputs.initialize("blue", 1, OutputMode::Tile)?;
/// outputs.place(&[0.25], 1, "blue", OutputMode::Tile)?;
///
/// assert_eq!(outputs.get("blue").unwrap().get(0, 1), Some(&[0.25][..]));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct OutputSet {
    grid: Arc<TileGrid>,
    buffers: BTreeMap<String, OutputBuffer>,
}

impl OutputSet {
    pub fn new(grid: Arc<TileGrid>) -> Self {
        Self {
            grid,
            buffers: BTreeMap::new(),
        }
    }

    pub fn grid(&self) -> &Arc<TileGrid> {
        &self.grid
    }

    /// Allocate a zeroed buffer named `name` with `dim` values per tile.
    ///
    /// An existing buffer with the same name is replaced.
    pub fn initialize(
        &mut self,
        name: &str,
        dim: usize,
        mode: OutputMode,
    ) -> Result<&OutputBuffer, OutputError> {
        let (rows, cols) = match mode {
            OutputMode::Tile => self.grid.shape(),
        };
        let buffer = OutputBuffer::new(name, rows, cols, dim, mode)?;

        if self.buffers.insert(name.to_string(), buffer).is_some() {
            debug!(output = name, "Replaced existing output buffer");
        }
        debug!(output = name, rows, cols, dim, %mode, "Initialized output buffer");

        self.buffers
            .get(name)
            .ok_or_else(|| OutputError::UnknownOutput(name.to_string()))
    }

    /// Add the result `x` of tile `idx` into buffer `name`.
    pub fn place(
        &mut self,
        x: &[f32],
        idx: usize,
        name: &str,
        mode: OutputMode,
    ) -> Result<(), OutputError> {
        let coord = lookup(&self.grid, idx)?;
        let buffer = self
            .buffers
            .get_mut(name)
            .ok_or_else(|| OutputError::UnknownOutput(name.to_string()))?;

        match mode {
            OutputMode::Tile => buffer.add(coord.row, coord.col, x),
        }
    }

    /// Place a batch of results.
    ///
    /// `xs` holds `idxs.len()` result vectors back to back. Nothing is written
    /// unless every index and the total length check out.
    pub fn place_batch(
        &mut self,
        xs: &[f32],
        idxs: &[usize],
        name: &str,
        mode: OutputMode,
    ) -> Result<(), OutputError> {
        let buffer = self
            .buffers
            .get_mut(name)
            .ok_or_else(|| OutputError::UnknownOutput(name.to_string()))?;

        let dim = buffer.dim();
        if xs.len() != idxs.len() * dim {
            return Err(OutputError::BatchLength {
                values: xs.len(),
                dim,
                indices: idxs.len(),
            });
        }

        let coords = idxs
            .iter()
            .map(|&idx| lookup(&self.grid, idx))
            .collect::<Result<Vec<_>, _>>()?;

        for (coord, x) in coords.iter().zip(xs.chunks(dim)) {
            match mode {
                OutputMode::Tile => buffer.add(coord.row, coord.col, x)?,
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OutputBuffer> {
        self.buffers.get(name)
    }

    /// Buffer names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<OutputBuffer> {
        self.buffers.remove(name)
    }
}

fn lookup(grid: &TileGrid, idx: usize) -> Result<TileCoord, OutputError> {
    grid.get(idx)
        .copied()
        .ok_or(OutputError::TileIndexOutOfRange {
            index: idx,
            count: grid.len(),
        })
}
