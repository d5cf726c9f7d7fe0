//! Command-line integration tests.
//!
//! Tests run the `wsi-tiler` binary and verify:
//! - Both processing commands print their report and write JSON output
//! - End of the pipeline is reported once
//! - Every command reports failures through the log with a failure exit code

use std::path::Path;
use std::process::{Command, Output};

use super::test_utils::{indexed_tiles_image, write_slide};

fn wsi_tiler(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wsi-tiler"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("WSI_OVERSAMPLE")
        .env_remove("WSI_TILE_SIZE")
        .env_remove("WSI_MAX_MEMORY_MB")
        .output()
        .expect("failed to run wsi-tiler")
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn slide_path(dir: &Path) -> String {
    let path = write_slide(dir, "slide.png", &indexed_tiles_image(3, 2, 16));
    path.display().to_string()
}

// =============================================================================
// Processing Commands
// =============================================================================

#[test]
fn test_generate_command() {
    let dir = tempfile::tempdir().unwrap();
    let slide = slide_path(dir.path());
    let json = dir.path().join("blue.json");

    let output = wsi_tiler(&[
        "generate",
        &slide,
        "--tile-size",
        "16",
        "--oversample",
        "1.0",
        "--output",
        json.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", combined(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(2, 3, 1)"));
    assert!(stdout.contains("processed 6 tiles"));
    assert!(stdout.contains("tdelta = "));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(
        value["values"],
        serde_json::json!([0.0, 10.0, 20.0, 30.0, 40.0, 50.0])
    );
}

#[test]
fn test_pipeline_command_reports_exhaustion_once() {
    let dir = tempfile::tempdir().unwrap();
    let slide = slide_path(dir.path());

    let output = wsi_tiler(&[
        "pipeline",
        &slide,
        "--tile-size",
        "16",
        "--batch-size",
        "4",
        "--unit-scale",
    ]);
    assert!(output.status.success(), "{}", combined(&output));

    let all = combined(&output);
    assert!(all.contains("processed"));
    assert_eq!(all.matches("Iterator exhausted").count(), 1, "{}", all);
}

// =============================================================================
// Error Reporting
// =============================================================================

#[test]
fn test_commands_report_missing_slide_alike() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png").display().to_string();

    for command in ["generate", "pipeline", "info"] {
        let output = wsi_tiler(&[command, &missing]);
        assert!(!output.status.success(), "{} succeeded", command);

        let all = combined(&output);
        assert!(all.contains("ERROR"), "{}: {}", command, all);
        assert!(all.contains("Failed to open slide"), "{}: {}", command, all);
    }
}

#[test]
fn test_commands_report_invalid_config_alike() {
    let dir = tempfile::tempdir().unwrap();
    let slide = slide_path(dir.path());

    for command in ["generate", "pipeline", "info"] {
        let output = wsi_tiler(&[command, &slide, "--oversample", "0.5"]);
        assert!(!output.status.success(), "{} succeeded", command);

        let all = combined(&output);
        assert!(all.contains("Configuration error"), "{}: {}", command, all);
    }
}

#[test]
fn test_info_command() {
    let dir = tempfile::tempdir().unwrap();
    let slide = slide_path(dir.path());

    let output = wsi_tiler(&["info", &slide, "--tile-size", "16", "--list-tiles"]);
    assert!(output.status.success(), "{}", combined(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dimensions:  48 x 32"));
    // Default oversample 2.0 gives stride 8: 5 cols x 3 rows
    assert!(stdout.contains("Stride:      8"));
    assert!(stdout.contains("Tiles:       15"));
}
