//! Synchronous generator driver integration tests.
//!
//! Tests verify:
//! - Every tile is reduced once and placed at its grid cell
//! - Preprocessing is applied before reduction
//! - The generator restarts on a new call
//! - Errors from reads and placement propagate to the caller

use std::sync::Arc;

use wsi_tiler::{
    run_generator, write_output, ChannelMean, OutputError, OutputMode, OutputSet, Preprocess,
    RunError, SlideError, SlideOptions, TileSource, BLUE_OUTPUT,
};

use super::test_utils::{green_for, indexed_slide, FixtureSource};

fn blue_outputs<S: TileSource>(source: &S) -> OutputSet {
    let mut outputs = OutputSet::new(Arc::clone(source.grid()));
    outputs.initialize(BLUE_OUTPUT, 1, OutputMode::Tile).unwrap();
    outputs
}

#[test]
fn test_generator_fills_output_map() {
    let slide = indexed_slide(4, 3, 8, SlideOptions::new(1.0).with_tile_size(8));
    let mut outputs = blue_outputs(&slide);

    let summary = run_generator(&slide, &ChannelMean::blue(), &mut outputs, BLUE_OUTPUT).unwrap();
    assert_eq!(summary.tile_count, 12);
    assert_eq!(summary.processed, 12);

    let buffer = outputs.get(BLUE_OUTPUT).unwrap();
    assert_eq!(buffer.shape(), (3, 4, 1));
    assert_eq!(buffer.placed_cells(), 12);

    for coord in slide.tile_list() {
        let value = buffer.get(coord.row, coord.col).unwrap()[0];
        assert_eq!(value, green_for(coord.index));
    }
}

#[test]
fn test_generator_with_unit_scale() {
    let options = SlideOptions::new(1.0)
        .with_tile_size(8)
        .with_preprocess(Preprocess::unit_scale());
    let slide = indexed_slide(2, 2, 8, options);
    let mut outputs = blue_outputs(&slide);

    run_generator(&slide, &ChannelMean::blue(), &mut outputs, BLUE_OUTPUT).unwrap();

    let buffer = outputs.get(BLUE_OUTPUT).unwrap();
    let last = buffer.get(1, 1).unwrap()[0];
    assert!((last - green_for(3) / 255.0).abs() < 1e-6);

    // Red channel of the same slide is 255 -> 1.0 after scaling
    let mut red = OutputSet::new(Arc::clone(slide.grid()));
    red.initialize("red", 1, OutputMode::Tile).unwrap();
    run_generator(&slide, &ChannelMean::new(0), &mut red, "red").unwrap();
    assert!(red
        .get("red")
        .unwrap()
        .values()
        .iter()
        .all(|&v| (v - 1.0).abs() < 1e-6));
}

#[test]
fn test_generator_is_restartable() {
    let source = FixtureSource::new(3, 2, 4);

    assert_eq!(source.generator().count(), 6);
    assert_eq!(source.generator().count(), 6);
    assert_eq!(source.read_count(), 12);
}

#[test]
fn test_running_twice_accumulates() {
    let source = FixtureSource::new(2, 1, 4);
    let mut outputs = blue_outputs(&source);

    run_generator(&source, &ChannelMean::blue(), &mut outputs, BLUE_OUTPUT).unwrap();
    run_generator(&source, &ChannelMean::blue(), &mut outputs, BLUE_OUTPUT).unwrap();

    let buffer = outputs.get(BLUE_OUTPUT).unwrap();
    assert_eq!(buffer.values(), &[0.0, 2.0]);
    assert_eq!(buffer.counts(), &[2, 2]);
    assert_eq!(buffer.averaged(), vec![0.0, 1.0]);
}

#[test]
fn test_generator_stops_on_read_error() {
    let source = FixtureSource::new(4, 1, 4).failing_at(2);
    let mut outputs = blue_outputs(&source);

    let err = run_generator(&source, &ChannelMean::blue(), &mut outputs, BLUE_OUTPUT).unwrap_err();
    assert!(matches!(err, RunError::Slide(SlideError::Decode(_))));

    // Tiles before the failure were placed, later ones were not read
    assert_eq!(outputs.get(BLUE_OUTPUT).unwrap().placed_cells(), 2);
    assert_eq!(source.read_count(), 3);
}

#[test]
fn test_generator_unknown_output() {
    let source = FixtureSource::new(1, 1, 4);
    let mut outputs = OutputSet::new(Arc::clone(source.grid()));

    let err = run_generator(&source, &ChannelMean::blue(), &mut outputs, "green").unwrap_err();
    assert!(matches!(
        err,
        RunError::Output(OutputError::UnknownOutput(ref name)) if name == "green"
    ));
}

#[test]
fn test_generator_output_written_as_json() {
    let slide = indexed_slide(2, 1, 8, SlideOptions::new(1.0).with_tile_size(8));
    let mut outputs = blue_outputs(&slide);
    run_generator(&slide, &ChannelMean::blue(), &mut outputs, BLUE_OUTPUT).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blue.json");
    write_output(outputs.get(BLUE_OUTPUT).unwrap(), &path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["mode"], "tile");
    assert_eq!(json["rows"], 1);
    assert_eq!(json["cols"], 2);
    assert_eq!(json["dim"], 1);
    assert_eq!(json["values"], serde_json::json!([0.0, 10.0]));
}
