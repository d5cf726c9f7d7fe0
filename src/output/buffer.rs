use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::OutputError;

// =============================================================================
// Output Mode
// =============================================================================

/// How per-tile results are assembled into a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One result vector per grid cell
    #[default]
    Tile,
}

impl FromStr for OutputMode {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tile" => Ok(OutputMode::Tile),
            _ => Err(OutputError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Tile => f.write_str("tile"),
        }
    }
}

// =============================================================================
// Output Buffer
// =============================================================================

/// A `rows x cols x dim` accumulator with a hit counter per cell.
///
/// Placing into a cell adds to what is already there. Use
/// [`averaged`](OutputBuffer::averaged) to divide each cell by the number of
/// times it was placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputBuffer {
    name: String,
    mode: OutputMode,
    rows: usize,
    cols: usize,
    dim: usize,
    values: Vec<f64>,
    counts: Vec<u32>,
}

impl OutputBuffer {
    /// Allocate a zeroed buffer.
    pub fn new(
        name: impl Into<String>,
        rows: usize,
        cols: usize,
        dim: usize,
        mode: OutputMode,
    ) -> Result<Self, OutputError> {
        if dim == 0 {
            return Err(OutputError::InvalidDim);
        }

        Ok(Self {
            name: name.into(),
            mode,
            rows,
            cols,
            dim,
            values: vec![0.0; rows * cols * dim],
            counts: vec![0; rows * cols],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// `(rows, cols, dim)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.dim)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Raw accumulated values, row-major `(rows, cols, dim)`.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Placement count per cell, row-major `(rows, cols)`.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Accumulated value vector at a cell.
    pub fn get(&self, row: usize, col: usize) -> Option<&[f64]> {
        let cell = self.cell(row, col)?;
        Some(&self.values[cell * self.dim..(cell + 1) * self.dim])
    }

    /// How many results were placed at a cell.
    pub fn count(&self, row: usize, col: usize) -> Option<u32> {
        self.cell(row, col).map(|cell| self.counts[cell])
    }

    /// Number of cells that received at least one result.
    pub fn placed_cells(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Add `value` into a cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the buffer; callers check against the
    /// grid first.
    pub(crate) fn add(&mut self, row: usize, col: usize, value: &[f32]) -> Result<(), OutputError> {
        if value.len() != self.dim {
            return Err(OutputError::DimMismatch {
                name: self.name.clone(),
                expected: self.dim,
                actual: value.len(),
            });
        }

        let cell = row * self.cols + col;
        let slot = &mut self.values[cell * self.dim..(cell + 1) * self.dim];
        for (acc, &v) in slot.iter_mut().zip(value) {
            *acc += f64::from(v);
        }
        self.counts[cell] += 1;

        Ok(())
    }

    /// Values divided by their cell's placement count.
    ///
    /// Cells that were never placed stay 0.
    pub fn averaged(&self) -> Vec<f64> {
        self.values
            .chunks(self.dim)
            .zip(&self.counts)
            .flat_map(|(chunk, &count)| {
                let scale = if count > 0 { 1.0 / f64::from(count) } else { 0.0 };
                chunk.iter().map(move |v| v * scale)
            })
            .collect()
    }

    fn cell(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
