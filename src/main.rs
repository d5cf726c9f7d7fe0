//! WSI Tiler - reduce every tile of a Whole Slide Image into an output map.
//!
//! This binary parses the command line, opens the slide and runs one of the
//! tiling drivers.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsi_tiler::{
    config::{Cli, Command, GenerateConfig, InfoConfig, PipelineRunConfig, ReduceArgs},
    output::{OutputMode, OutputSet},
    reduce::ChannelMean,
    runner::{run_generator, run_pipeline, write_output, RunSummary, BLUE_OUTPUT},
    slide::{Slide, TileSource},
    tile::Preprocess,
    RunError,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Generate(config) => run_generate_command(config).await,
        Command::Pipeline(config) => run_pipeline_command(config).await,
        Command::Info(config) => run_info(config),
    }
}

// =============================================================================
// Generate Command
// =============================================================================

async fn run_generate_command(config: GenerateConfig) -> ExitCode {
    init_logging(config.reduce.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    // Decoding and reducing are CPU-bound; keep them off the async workers
    let result = tokio::task::spawn_blocking(move || -> Result<(), RunError> {
        let slide = Slide::open(&config.slide.path, config.slide.options(Preprocess::identity()))?;
        let mut outputs = new_outputs(&slide)?;

        let reducer = ChannelMean::new(config.reduce.channel);
        let summary = run_generator(&slide, &reducer, &mut outputs, BLUE_OUTPUT)?;

        finish(&outputs, &config.reduce, &summary)
    })
    .await
    .unwrap_or_else(|e| Err(RunError::Task(e.to_string())));

    exit_code(result)
}

// =============================================================================
// Pipeline Command
// =============================================================================

async fn run_pipeline_command(config: PipelineRunConfig) -> ExitCode {
    init_logging(config.reduce.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let result: Result<(), RunError> = async {
        let options = config.slide.options(config.preprocess());
        let path = config.slide.path.clone();
        let slide = tokio::task::spawn_blocking(move || Slide::open(path, options))
            .await
            .map_err(|e| RunError::Task(e.to_string()))??;
        let slide = Arc::new(slide);
        let mut outputs = new_outputs(&slide)?;

        let reducer = ChannelMean::new(config.reduce.channel);
        let summary = run_pipeline(
            slide,
            &reducer,
            &mut outputs,
            BLUE_OUTPUT,
            config.pipeline_config(),
        )
        .await?;

        finish(&outputs, &config.reduce, &summary)
    }
    .await;

    exit_code(result)
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: InfoConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    exit_code(print_info(&config))
}

fn print_info(config: &InfoConfig) -> Result<(), RunError> {
    let slide = Slide::open(&config.slide.path, config.slide.options(Preprocess::identity()))?;

    let (width, height) = slide.dimensions();
    let grid = slide.grid();
    let (rows, cols) = grid.shape();

    println!("Slide:       {}", slide.identifier());
    println!("Dimensions:  {} x {}", width, height);
    println!("Tile size:   {}", grid.tile_size());
    println!("Oversample:  {}", slide.oversample_factor());
    println!("Stride:      {}", grid.stride());
    println!("Grid:        {} rows x {} cols", rows, cols);
    println!("Tiles:       {}", slide.tile_list().len());

    if config.list_tiles {
        println!();
        for tile in slide.tile_list() {
            println!(
                "  {:>6}  row {:>4}  col {:>4}  at ({}, {})",
                tile.index, tile.row, tile.col, tile.x, tile.y
            );
        }
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn new_outputs(slide: &Slide) -> Result<OutputSet, RunError> {
    let mut outputs = OutputSet::new(Arc::clone(slide.grid()));
    let buffer = outputs.initialize(BLUE_OUTPUT, 1, OutputMode::Tile)?;
    println!("{:?}", buffer.shape());
    Ok(outputs)
}

/// Print the run report and optionally write the output buffer.
fn finish(outputs: &OutputSet, args: &ReduceArgs, summary: &RunSummary) -> Result<(), RunError> {
    println!("processed {} tiles", summary.tile_count);
    println!("tdelta = {:3.5}", summary.elapsed.as_secs_f64());

    if let Some(ref path) = args.output {
        if let Some(buffer) = outputs.get(BLUE_OUTPUT) {
            write_output(buffer, path)?;
        }
    }

    info!(
        processed = summary.processed,
        batches = summary.batches,
        "Done"
    );
    Ok(())
}

fn exit_code(result: Result<(), RunError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "wsi_tiler=debug"
    } else {
        "wsi_tiler=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
