#![cfg(unix)]

use std::fs;

use pcd_core::pointcloud::normalization::OverflowPolicy;
use pcd_parser::{parsers::text::parse_str, ParseError};
use pcd_volume::{compute_volume, Error, RunnerConfig};

#[test]
fn unweighted_cloud_round_trips_through_echo_process() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("test.cloud");
    let output = dir.path().join("test.p");
    fs::write(&input, "1 2 3\n4 5 6\n").unwrap();

    let config = RunnerConfig::builder()
        .input(&input)
        .output(&output)
        .executable("cat")
        .build();
    let report = compute_volume(&config).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "1.000000000000000000e+00 2.000000000000000000e+00 3.000000000000000000e+00 0.000000000000000000e+00\n\
         4.000000000000000000e+00 5.000000000000000000e+00 6.000000000000000000e+00 0.000000000000000000e+00\n"
    );

    let table = parse_str(&written).unwrap();
    let rows: Vec<Vec<f64>> = table.rows().map(|row| row.to_vec()).collect();
    assert_eq!(rows, vec![vec![1.0, 2.0, 3.0, 0.0], vec![4.0, 5.0, 6.0, 0.0]]);

    assert_eq!(report.point_count, 2);
    assert_eq!(report.source_columns, 3);
    assert_eq!(report.total_weight, 0.0);
    assert_eq!(report.result_bytes, written.len());
    assert_eq!(report.input_bytes, written.len());
}

#[test]
fn wide_cloud_reaches_process_with_four_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("test.cloud");
    let output = dir.path().join("test.p");
    fs::write(&input, "# x y z w r g b\n1 2 3 0.5 255 0 0\n4 5 6 0.25 0 255 0\n").unwrap();

    let config = RunnerConfig::builder()
        .input(&input)
        .output(&output)
        .executable("cat")
        .build();
    compute_volume(&config).unwrap();

    let table = parse_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(table.columns(), 4);
    assert_eq!(table.row(1), Some(&[4.0, 5.0, 6.0, 0.25][..]));
}

#[test]
fn rejected_columns_stop_before_launch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("test.cloud");
    let output = dir.path().join("test.p");
    fs::write(&input, "1 2 3 4 5\n").unwrap();

    let config = RunnerConfig::builder()
        .input(&input)
        .output(&output)
        .executable(dir.path().join("does-not-exist"))
        .overflow(OverflowPolicy::Reject)
        .build();

    let err = compute_volume(&config).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::Shape(_))));
    assert!(!output.exists());
}

#[test]
fn ragged_input_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("test.cloud");
    let output = dir.path().join("test.p");
    fs::write(&input, "1 2 3\n4 5 6\n7 8\n").unwrap();

    let config = RunnerConfig::builder()
        .input(&input)
        .output(&output)
        .executable("cat")
        .build();

    let err = compute_volume(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(ParseError::Ragged {
            line: 3,
            expected: 3,
            found: 2
        })
    ));
    assert!(!output.exists());
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunnerConfig::builder()
        .input(dir.path().join("test.cloud"))
        .output(dir.path().join("test.p"))
        .executable("cat")
        .build();

    assert!(matches!(compute_volume(&config), Err(Error::Io { .. })));
}

#[test]
fn report_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("test.cloud");
    fs::write(&input, "0 0 0 1\n2 4 8 0.5\n").unwrap();

    let config = RunnerConfig::builder()
        .input(&input)
        .output(dir.path().join("test.p"))
        .executable("cat")
        .build();
    let report = compute_volume(&config).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["point_count"], 2);
    assert_eq!(json["source_columns"], 4);
    assert_eq!(json["bounding_volume"]["max"], serde_json::json!([2.0, 4.0, 8.0]));
    assert_eq!(json["total_weight"], 1.5);
}
