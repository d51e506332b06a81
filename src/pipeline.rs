//! Batch conversion of activity directories into one map
//!
//! Files are processed one at a time: GPX first, then FIT, each directory in
//! sorted path order. A failure in one file is logged and that file skipped;
//! only an empty input set or a failure to write the output ends the run.

use crate::activities::{ActivityIndex, DuplicatePolicy};
use crate::error::{Result, TrackError};
use crate::filters::{default_stride, downsample};
use crate::matcher::match_activity;
use crate::parser::{decode_fit_file, decode_gpx_file};
use crate::render::{MapDocument, MapOptions};
use crate::types::{TrackRecord, TrackSource};
use glob::{glob, Pattern};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Run configuration
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub gpx_dir: PathBuf,
    pub fit_dir: PathBuf,
    /// Glob applied inside `gpx_dir`
    pub gpx_filter: String,
    /// Glob applied inside `fit_dir`
    pub fit_filter: String,
    pub activities_path: PathBuf,
    pub output: PathBuf,
    pub gpx_stride: usize,
    pub fit_stride: usize,
    pub duplicate_policy: DuplicatePolicy,
    /// Center the map on the mean of all rendered points
    pub auto_center: bool,
    /// Where compressed FIT files are inflated; system temp dir if `None`
    pub scratch_dir: Option<PathBuf>,
    pub map: MapOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            gpx_dir: PathBuf::from("gpx"),
            fit_dir: PathBuf::from("fit"),
            gpx_filter: "*.gpx".to_string(),
            fit_filter: "*.fit.gz".to_string(),
            activities_path: PathBuf::from("activities.csv"),
            output: PathBuf::from("index.html"),
            gpx_stride: default_stride(TrackSource::Gpx),
            fit_stride: default_stride(TrackSource::Fit),
            duplicate_policy: DuplicatePolicy::default(),
            auto_center: false,
            scratch_dir: None,
            map: MapOptions::default(),
        }
    }
}

/// Files found in the two input directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFiles {
    pub gpx: Vec<PathBuf>,
    pub fit: Vec<PathBuf>,
}

impl InputFiles {
    pub fn is_empty(&self) -> bool {
        self.gpx.is_empty() && self.fit.is_empty()
    }

    pub fn len(&self) -> usize {
        self.gpx.len() + self.fit.len()
    }
}

/// Outcome of a completed run
#[derive(Debug, Default)]
pub struct RunReport {
    pub rendered: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, TrackError)>,
    pub output: PathBuf,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.rendered.len() + self.skipped.len()
    }
}

/// Sorted regular files in `dir` matching `filter`. A missing directory or
/// a bad pattern yields no files.
pub fn find_files(dir: &Path, filter: &str) -> Vec<PathBuf> {
    let pattern = PathBuf::from(Pattern::escape(&dir.to_string_lossy()))
        .join(filter)
        .to_string_lossy()
        .into_owned();

    let mut files = match glob(&pattern) {
        Ok(paths) => paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Cannot read entry while expanding '{}': {}", pattern, e);
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect::<Vec<_>>(),
        Err(e) => {
            warn!("Invalid glob pattern '{}': {}", pattern, e);
            Vec::new()
        }
    };

    files.sort();
    files
}

pub fn discover_inputs(options: &RunOptions) -> InputFiles {
    let inputs = InputFiles {
        gpx: find_files(&options.gpx_dir, &options.gpx_filter),
        fit: find_files(&options.fit_dir, &options.fit_filter),
    };
    debug!(
        "Found {} GPX and {} FIT files",
        inputs.gpx.len(),
        inputs.fit.len()
    );
    inputs
}

/// Load the activity export, falling back to an empty index when it cannot be
/// read. FIT files then fail to match and are skipped individually.
pub fn load_activity_index(path: &Path) -> ActivityIndex {
    match ActivityIndex::from_path(path) {
        Ok(index) => index,
        Err(e) => {
            warn!(
                "Cannot load activity export {}: {}; FIT files will not match",
                path.display(),
                e
            );
            ActivityIndex::new()
        }
    }
}

fn thin(mut track: TrackRecord, stride: usize) -> Result<TrackRecord> {
    if track.is_empty() {
        return Err(TrackError::EmptyPointSet);
    }
    let before = track.points.len();
    track.points = downsample(&track.points, stride);
    debug!(
        "{} track {}: {} -> {} points (stride {}), centered near {:?}",
        track.source,
        track.external_id,
        before,
        track.points.len(),
        stride,
        track.centroid()
    );
    Ok(track)
}

/// Decode and thin one GPX file
pub fn process_gpx_file(path: &Path, options: &RunOptions) -> Result<TrackRecord> {
    let track = decode_gpx_file(path)?;
    thin(track, options.gpx_stride)
}

/// Decode, match and thin one FIT file
pub fn process_fit_file(
    path: &Path,
    index: &ActivityIndex,
    options: &RunOptions,
) -> Result<TrackRecord> {
    let decoded = decode_fit_file(path, options.scratch_dir.as_deref())?;
    let matched = match_activity(&decoded.start_time, index, options.duplicate_policy)?;

    let track = TrackRecord {
        source: TrackSource::Fit,
        points: decoded.points,
        display_name: matched.activity_name,
        display_date: matched.display_date,
        external_id: matched.activity_id,
    };
    thin(track, options.fit_stride)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn record_outcome(
    document: &mut MapDocument,
    report: &mut RunReport,
    path: &Path,
    source: TrackSource,
    outcome: Result<TrackRecord>,
) {
    match outcome {
        Ok(track) => {
            document.add_track(&track);
            report.rendered.push(path.to_path_buf());
        }
        Err(e) => {
            warn!("Skipping {} {}: {}", source, file_label(path), e);
            report.skipped.push((path.to_path_buf(), e));
        }
    }
}

/// Add every discovered file to `document`, isolating per-file failures
pub fn render_inputs(
    inputs: &InputFiles,
    index: &ActivityIndex,
    options: &RunOptions,
    document: &mut MapDocument,
) -> RunReport {
    let mut report = RunReport {
        output: options.output.clone(),
        ..RunReport::default()
    };

    for path in &inputs.gpx {
        info!("Reading GPX {}", file_label(path));
        let outcome = process_gpx_file(path, options);
        record_outcome(document, &mut report, path, TrackSource::Gpx, outcome);
    }

    for path in &inputs.fit {
        info!("Reading FIT {}", file_label(path));
        let outcome = process_fit_file(path, index, options);
        record_outcome(document, &mut report, path, TrackSource::Fit, outcome);
    }

    report
}

/// Discover inputs, render them and write the map
///
/// Returns [`TrackError::NoInputFiles`] without touching the output path when
/// neither directory has a matching file.
pub fn run(options: &RunOptions) -> Result<RunReport> {
    let inputs = discover_inputs(options);
    if inputs.is_empty() {
        return Err(TrackError::NoInputFiles);
    }

    let index = if inputs.fit.is_empty() {
        ActivityIndex::new()
    } else {
        load_activity_index(&options.activities_path)
    };

    let mut document = MapDocument::new(options.map.clone());
    let report = render_inputs(&inputs, &index, options, &mut document);

    if options.auto_center {
        if let Some(center) = document.centroid() {
            debug!("Centering map on {:?}", center);
            document.set_center(center);
        }
    }

    document.save(&options.output)?;
    debug!(
        "Saved interactive map to {} ({} of {} tracks)",
        options.output.display(),
        report.rendered.len(),
        report.total()
    );
    Ok(report)
}
