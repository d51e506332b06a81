//! Integration tests for a full run
//!
//! Covers the run controller end to end:
//! - Per-file failure isolation for GPX and FIT inputs
//! - Fatal empty input without writing output
//! - FIT start time matching against the activity export
//! - Scratch file cleanup for compressed FIT inputs
//! - External id derivation from GPX file names

mod common;

use activity_heatmap::{run, DuplicatePolicy, RunOptions, TrackError};
use common::{fit_bytes, gpx_document, ride, write_gz, FitSample};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// 2023-06-15T14:30:05Z
const MATCHED_START: i64 = 1_686_839_405;
/// 2023-06-16T09:00:00Z
const UNMATCHED_START: i64 = 1_686_906_000;

const EXPORT: &str = "Activity ID,Activity Date,Activity Name,Activity Type\n\
5550001,\"Jun 15, 2023, 2:30:00 PM\",Lunch Ride,Ride\n\
5550002,\"Jun 1, 2023, 6:00:00 AM\",Dawn Patrol,Ride\n";

fn options_in(root: &Path) -> RunOptions {
    let scratch = root.join("scratch");
    fs::create_dir_all(&scratch).expect("Failed to create scratch dir");
    fs::create_dir_all(root.join("gpx")).expect("Failed to create gpx dir");
    fs::create_dir_all(root.join("fit")).expect("Failed to create fit dir");
    RunOptions {
        gpx_dir: root.join("gpx"),
        fit_dir: root.join("fit"),
        activities_path: root.join("activities.csv"),
        output: root.join("index.html"),
        scratch_dir: Some(scratch),
        ..RunOptions::default()
    }
}

fn tooltip_count(html: &str) -> usize {
    html.matches("\"tooltip\":").count()
}

#[test]
fn test_gpx_batch_skips_malformed_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let options = options_in(temp_dir.path());

    for id in ["1001", "1002", "1003"] {
        fs::write(
            options.gpx_dir.join(format!("{id}.gpx")),
            gpx_document(&format!("Ride {id}"), "2023-06-15T14:30:00Z", 30),
        )
        .unwrap();
    }
    let broken = gpx_document("Broken", "2023-06-15T14:30:00Z", 30)
        .replacen("lon=\"-71.5000000\"", "", 1);
    fs::write(options.gpx_dir.join("1004.gpx"), broken).unwrap();

    let report = run(&options).expect("run should succeed");
    assert_eq!(report.rendered.len(), 3);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(report.skipped[0].1, TrackError::EmptyPointSet));

    let html = fs::read_to_string(&options.output).expect("map written");
    assert_eq!(tooltip_count(&html), 3);
    assert!(!html.contains("activities/1004"));
}

#[test]
fn test_gpx_missing_metadata_is_skipped() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let options = options_in(temp_dir.path());

    fs::write(
        options.gpx_dir.join("1.gpx"),
        gpx_document("Kept", "2023-06-15T14:30:00Z", 5),
    )
    .unwrap();
    let no_time = gpx_document("No Time", "2023-06-15T14:30:00Z", 5)
        .replace("<time>2023-06-15T14:30:00Z</time>", "");
    fs::write(options.gpx_dir.join("2.gpx"), no_time).unwrap();

    let report = run(&options).unwrap();
    assert_eq!(report.rendered.len(), 1);
    assert!(matches!(
        report.skipped[0].1,
        TrackError::MetadataMissing(_)
    ));
}

#[test]
fn test_external_id_from_gpx_filename() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let options = options_in(temp_dir.path());
    fs::write(
        options.gpx_dir.join("9876543210.gpx"),
        gpx_document("Morning Run", "2023-06-15T14:30:00Z", 13),
    )
    .unwrap();

    run(&options).unwrap();
    let html = fs::read_to_string(&options.output).unwrap();
    assert!(html.contains("https://www.strava.com/activities/9876543210"));
    assert!(html.contains("June 15, 2023 02:30 PM"));
    assert!(html.contains("<strong>Morning Run<\\/strong>"));
}

#[test]
fn test_no_inputs_is_fatal_and_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let options = RunOptions {
        gpx_dir: temp_dir.path().join("missing-gpx"),
        fit_dir: temp_dir.path().join("missing-fit"),
        output: temp_dir.path().join("index.html"),
        ..RunOptions::default()
    };

    assert!(matches!(run(&options), Err(TrackError::NoInputFiles)));
    assert!(!options.output.exists());

    // Files not matching the filters do not count as input
    fs::create_dir_all(&options.gpx_dir).unwrap();
    fs::write(options.gpx_dir.join("notes.txt"), "hello").unwrap();
    assert!(matches!(run(&options), Err(TrackError::NoInputFiles)));
    assert!(!options.output.exists());
}

#[test]
fn test_fit_matched_and_unmatched() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let options = options_in(temp_dir.path());
    fs::write(&options.activities_path, EXPORT).unwrap();

    write_gz(
        &options.fit_dir.join("a.fit.gz"),
        &fit_bytes(&ride(MATCHED_START, 20)),
    );
    write_gz(
        &options.fit_dir.join("b.fit.gz"),
        &fit_bytes(&ride(UNMATCHED_START, 20)),
    );

    let report = run(&options).unwrap();
    assert_eq!(report.rendered.len(), 1);
    assert!(report.rendered[0].ends_with("a.fit.gz"));
    match &report.skipped[..] {
        [(path, TrackError::UnmatchedActivity(key))] => {
            assert!(path.ends_with("b.fit.gz"));
            assert_eq!(key, "June 16, 2023 09:00 AM");
        }
        other => panic!("unexpected skips: {other:?}"),
    }

    let html = fs::read_to_string(&options.output).unwrap();
    assert_eq!(tooltip_count(&html), 1);
    assert!(html.contains("Lunch Ride"));
    assert!(html.contains("https://www.strava.com/activities/5550001"));
    assert!(!html.contains("5550002"));

    let scratch = options.scratch_dir.as_ref().unwrap();
    assert_eq!(fs::read_dir(scratch).unwrap().count(), 0);
}

#[test]
fn test_fit_start_uses_earliest_positioned_sample() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let options = options_in(temp_dir.path());
    fs::write(&options.activities_path, EXPORT).unwrap();

    // A timestamp-only sample hours earlier must not move the start time,
    // and an out-of-order later sample must not either.
    let mut samples = vec![FitSample {
        unix_seconds: MATCHED_START - 3 * 3600,
        position: None,
    }];
    samples.extend(ride(MATCHED_START + 60, 5));
    samples.extend(ride(MATCHED_START, 5));
    write_gz(&options.fit_dir.join("c.fit.gz"), &fit_bytes(&samples));

    let report = run(&options).unwrap();
    assert_eq!(report.rendered.len(), 1, "skipped: {:?}", report.skipped);
}

#[test]
fn test_fit_without_positions_is_no_track_data() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let options = options_in(temp_dir.path());
    fs::write(&options.activities_path, EXPORT).unwrap();

    let samples: Vec<FitSample> = (0..5)
        .map(|i| FitSample {
            unix_seconds: MATCHED_START + i,
            position: None,
        })
        .collect();
    write_gz(&options.fit_dir.join("indoor.fit.gz"), &fit_bytes(&samples));

    let report = run(&options).unwrap();
    assert!(report.rendered.is_empty());
    assert!(matches!(report.skipped[0].1, TrackError::NoTrackData));
    assert!(options.output.exists());
}

#[test]
fn test_corrupt_fit_does_not_abort_run() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let options = options_in(temp_dir.path());
    fs::write(&options.activities_path, EXPORT).unwrap();

    write_gz(&options.fit_dir.join("junk.fit.gz"), b"not a fit file");
    fs::write(options.fit_dir.join("truncated.fit.gz"), b"\x1f\x8b\x08").unwrap();
    fs::write(
        options.gpx_dir.join("42.gpx"),
        gpx_document("Survivor", "2023-06-15T14:30:00Z", 3),
    )
    .unwrap();

    let report = run(&options).unwrap();
    assert_eq!(report.rendered.len(), 1);
    assert_eq!(report.skipped.len(), 2);

    let scratch = options.scratch_dir.as_ref().unwrap();
    assert_eq!(fs::read_dir(scratch).unwrap().count(), 0);
}

#[test]
fn test_missing_export_skips_fit_only() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let options = options_in(temp_dir.path());

    write_gz(
        &options.fit_dir.join("a.fit.gz"),
        &fit_bytes(&ride(MATCHED_START, 10)),
    );
    fs::write(
        options.gpx_dir.join("7.gpx"),
        gpx_document("Still Here", "2023-06-15T14:30:00Z", 3),
    )
    .unwrap();

    let report = run(&options).unwrap();
    assert_eq!(report.rendered.len(), 1);
    assert!(matches!(
        report.skipped[0].1,
        TrackError::UnmatchedActivity(_)
    ));
}

#[test]
fn test_reject_ambiguous_policy() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut options = options_in(temp_dir.path());
    fs::write(
        &options.activities_path,
        "Activity ID,Activity Date,Activity Name\n\
1,\"Jun 15, 2023, 2:30:00 PM\",First\n\
2,\"Jun 15, 2023, 2:30:40 PM\",Second\n",
    )
    .unwrap();
    write_gz(
        &options.fit_dir.join("a.fit.gz"),
        &fit_bytes(&ride(MATCHED_START, 10)),
    );

    let report = run(&options).unwrap();
    assert_eq!(report.rendered.len(), 1);
    let html = fs::read_to_string(&options.output).unwrap();
    assert!(html.contains("First"));
    assert!(!html.contains("Second"));

    options.duplicate_policy = DuplicatePolicy::Reject;
    let report = run(&options).unwrap();
    assert!(report.rendered.is_empty());
    let html = fs::read_to_string(&options.output).unwrap();
    assert_eq!(tooltip_count(&html), 0);
}

#[test]
fn test_plain_fit_and_auto_center() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut options = options_in(temp_dir.path());
    options.fit_filter = "*.fit".to_string();
    options.fit_stride = 1;
    options.auto_center = true;
    fs::write(&options.activities_path, EXPORT).unwrap();

    let samples = vec![
        FitSample {
            unix_seconds: MATCHED_START,
            position: Some((45.0, 22.5)),
        },
        FitSample {
            unix_seconds: MATCHED_START + 1,
            position: Some((22.5, 45.0)),
        },
    ];
    fs::write(options.fit_dir.join("plain.fit"), fit_bytes(&samples)).unwrap();

    let report = run(&options).unwrap();
    assert_eq!(report.rendered.len(), 1, "skipped: {:?}", report.skipped);
    let html = fs::read_to_string(&options.output).unwrap();
    assert!(html.contains("center: [33.75,33.75]"));
}
