//! Activity Heatmap Library
//!
//! Turns a Strava-style bulk export (GPX tracks, gzip-compressed FIT tracks and
//! the `activities.csv` spreadsheet) into one interactive Leaflet map with a
//! clickable line per activity.
//!
//! # Features
//!
//! - **`cli`** (default): Build the command-line interface binary
//!
//! # Quick Start
//!
//! Render the default `gpx/` and `fit/` directories to `index.html`:
//! ```rust,no_run
//! use activity_heatmap::{run, RunOptions};
//!
//! let report = run(&RunOptions::default()).unwrap();
//! println!("Rendered {} of {} tracks", report.rendered.len(), report.total());
//! ```
//!
//! Build a map by hand:
//! ```rust,no_run
//! use activity_heatmap::{decode_gpx_file, downsample, MapDocument, MapOptions, GPX_STRIDE};
//! use std::path::Path;
//!
//! let mut track = decode_gpx_file(Path::new("gpx/9876543210.gpx")).unwrap();
//! track.points = downsample(&track.points, GPX_STRIDE);
//!
//! let mut map = MapDocument::new(MapOptions::default());
//! map.add_track(&track);
//! map.save(Path::new("index.html")).unwrap();
//! ```
//!
//! # Public API
//!
//! ## Decoding
//! - [`decode_gpx_file`] - GPX metadata plus lenient track point scan
//! - [`decode_fit_file`] - FIT records, inflating `.gz` inputs via a scratch file
//! - [`semicircles_to_degrees`] - FIT position conversion
//!
//! ## Matching
//! - [`NormalizedTimeKey`] - Canonical start-time join key
//! - [`ActivityIndex`] - Activity export keyed by start time
//! - [`match_activity`] - Resolve a FIT start time to an export row
//!
//! ## Rendering
//! - [`downsample`] - Fixed-stride point thinning
//! - [`MapDocument`] - Map builder and HTML writer
//!
//! ## Running
//! - [`run`] - Discover, decode, match, render and save
//! - [`RunOptions`] - Configuration for a run

pub mod activities;
pub mod conversion;
pub mod error;
pub mod filters;
pub mod matcher;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod time_key;
pub mod types;

pub use activities::*;
pub use conversion::*;
pub use error::*;
pub use filters::*;
pub use matcher::*;
pub use parser::*;
pub use pipeline::*;
pub use render::*;
pub use time_key::*;
pub use types::*;
