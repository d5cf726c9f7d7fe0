//! Configuration management for WSI Tiler.
//!
//! This module provides the command-line interface:
//! - Subcommands via clap derive (`generate`, `pipeline`, `info`)
//! - Environment variables with `WSI_` prefix for the tuning knobs
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use wsi_tiler::config::{Cli, Command};
//!
//! match Cli::parse().into_command() {
//!     Command::Generate(config) => println!("tiling {}", config.slide.path.display()),
//!     Command::Pipeline(config) => println!("batches of {}", config.batch_size),
//!     Command::Info(config) => println!("inspecting {}", config.slide.path.display()),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `WSI_OVERSAMPLE` - Oversample factor (default: 2.0)
//! - `WSI_TILE_SIZE` - Tile edge length in pixels (default: 256)
//! - `WSI_MAX_MEMORY_MB` - Decode memory cap in MiB (default: unlimited)
//! - `WSI_CHANNEL` - Channel averaged by the reducer (default: 1)
//! - `WSI_PARALLEL` - Concurrent tile reads in the pipeline (default: 8)
//! - `WSI_BATCH_SIZE` - Tiles per batch (default: 32)
//! - `WSI_PREFETCH` - Batches buffered ahead (default: 512)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::pipeline::{
    PipelineConfig, DEFAULT_BATCH_SIZE, DEFAULT_NUM_PARALLEL_CALLS, DEFAULT_PREFETCH,
};
use crate::reduce::BLUE_CONTENT_CHANNEL;
use crate::slide::{SlideOptions, DEFAULT_OVERSAMPLE_FACTOR, DEFAULT_TILE_SIZE};
use crate::tile::Preprocess;

// =============================================================================
// CLI Arguments
// =============================================================================

/// WSI Tiler - reduce every tile of a Whole Slide Image into an output map.
#[derive(Parser, Debug, Clone)]
#[command(name = "wsi-tiler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reduce tiles one at a time, in order.
    Generate(GenerateConfig),

    /// Reduce tiles through the parallel, prefetching batch pipeline.
    Pipeline(PipelineRunConfig),

    /// Print slide dimensions and tile grid without processing.
    Info(InfoConfig),
}

// =============================================================================
// Shared Arguments
// =============================================================================

/// Which slide to open and how to tile it.
#[derive(Args, Debug, Clone)]
pub struct SlideArgs {
    /// Path to the slide image.
    #[arg(value_name = "SLIDE")]
    pub path: PathBuf,

    /// Overlap multiplier: 1.0 for adjacent tiles, 2.0 for half-tile steps.
    #[arg(long, default_value_t = DEFAULT_OVERSAMPLE_FACTOR, env = "WSI_OVERSAMPLE")]
    pub oversample: f64,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "WSI_TILE_SIZE")]
    pub tile_size: u32,

    /// Cap on decoder allocations in MiB. The decoded slide is held in memory
    /// as RGB, width * height * 3 bytes. Unlimited when unset.
    #[arg(long, value_name = "MIB", env = "WSI_MAX_MEMORY_MB")]
    pub max_memory_mb: Option<u64>,
}

impl SlideArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.oversample.is_finite() || self.oversample < 1.0 {
            return Err("oversample must be a finite number >= 1.0".to_string());
        }
        if self.tile_size == 0 {
            return Err("tile_size must be greater than 0".to_string());
        }
        if self.max_memory_mb == Some(0) {
            return Err("max_memory_mb must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn options(&self, preprocess: Preprocess) -> SlideOptions {
        let options = SlideOptions::new(self.oversample)
            .with_tile_size(self.tile_size)
            .with_preprocess(preprocess);

        match self.max_memory_mb {
            Some(mib) => options.with_memory_limit(mib.saturating_mul(1024 * 1024)),
            None => options,
        }
    }
}

/// Reducer and output settings shared by the processing commands.
#[derive(Args, Debug, Clone)]
pub struct ReduceArgs {
    /// Channel averaged over each tile.
    #[arg(long, default_value_t = BLUE_CONTENT_CHANNEL, env = "WSI_CHANNEL")]
    pub channel: usize,

    /// Write the output buffer as JSON to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ReduceArgs {
    pub fn validate(&self) -> Result<(), String> {
        // Tiles are RGB
        if self.channel > 2 {
            return Err("channel must be 0, 1 or 2".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Generate Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct GenerateConfig {
    #[command(flatten)]
    pub slide: SlideArgs,

    #[command(flatten)]
    pub reduce: ReduceArgs,
}

impl GenerateConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.slide.validate()?;
        self.reduce.validate()
    }
}

// =============================================================================
// Pipeline Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct PipelineRunConfig {
    #[command(flatten)]
    pub slide: SlideArgs,

    #[command(flatten)]
    pub reduce: ReduceArgs,

    /// Maximum concurrent tile reads.
    #[arg(long, default_value_t = DEFAULT_NUM_PARALLEL_CALLS, env = "WSI_PARALLEL")]
    pub parallel: usize,

    /// Tiles per batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, env = "WSI_BATCH_SIZE")]
    pub batch_size: usize,

    /// Batches buffered ahead of the reducer.
    #[arg(long, default_value_t = DEFAULT_PREFETCH, env = "WSI_PREFETCH")]
    pub prefetch: usize,

    /// Rescale pixel values to 0..1 before reducing.
    #[arg(long, default_value_t = false)]
    pub unit_scale: bool,
}

impl PipelineRunConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.slide.validate()?;
        self.reduce.validate()?;
        self.pipeline_config()
            .validate()
            .map_err(|e| e.to_string())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            num_parallel_calls: self.parallel,
            batch_size: self.batch_size,
            prefetch: self.prefetch,
        }
    }

    pub fn preprocess(&self) -> Preprocess {
        if self.unit_scale {
            Preprocess::unit_scale()
        } else {
            Preprocess::identity()
        }
    }
}

// =============================================================================
// Info Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    #[command(flatten)]
    pub slide: SlideArgs,

    /// Also list every tile coordinate.
    #[arg(long, default_value_t = false)]
    pub list_tiles: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.slide.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
