use activity_heatmap::{run, DuplicatePolicy, GeoPoint, RunOptions, TrackError};
use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use log::{debug, LevelFilter};
use std::path::PathBuf;

const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

fn parse_center(value: &str) -> std::result::Result<GeoPoint, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{value}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{lat}': {e}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{lon}': {e}"))?;
    GeoPoint::new(lat, lon).ok_or_else(|| format!("coordinates out of range: {lat},{lon}"))
}

fn build_command() -> Command {
    Command::new("Activity Heatmap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render GPX and FIT activity files as one interactive map, matching FIT files to activities.csv for names and links.")
        .arg(
            Arg::new("gpx-dir")
                .long("gpx-dir")
                .help("Directory containing GPX files")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value("gpx"),
        )
        .arg(
            Arg::new("fit-dir")
                .long("fit-dir")
                .help("Directory containing FIT files (.fit.gz by default)")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value("fit"),
        )
        .arg(
            Arg::new("gpx-filter")
                .long("gpx-filter")
                .help("Glob for GPX files inside --gpx-dir")
                .value_name("GLOB")
                .default_value("*.gpx"),
        )
        .arg(
            Arg::new("fit-filter")
                .long("fit-filter")
                .help("Glob for FIT files inside --fit-dir; plain .fit files are read without decompression")
                .value_name("GLOB")
                .default_value("*.fit.gz"),
        )
        .arg(
            Arg::new("activities")
                .long("activities")
                .help("Activity export CSV used to name FIT tracks")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .default_value("activities.csv"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output HTML map file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .default_value("index.html"),
        )
        .arg(
            Arg::new("gpx-stride")
                .long("gpx-stride")
                .help("Keep every Nth GPX point")
                .value_name("N")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("12"),
        )
        .arg(
            Arg::new("fit-stride")
                .long("fit-stride")
                .help("Keep every Nth FIT point")
                .value_name("N")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("8"),
        )
        .arg(
            Arg::new("center")
                .long("center")
                .help("Initial map center")
                .value_name("LAT,LON")
                .value_parser(parse_center)
                .allow_hyphen_values(true)
                .default_value("44,-71.5"),
        )
        .arg(
            Arg::new("zoom")
                .long("zoom")
                .help("Initial zoom level")
                .value_name("N")
                .value_parser(value_parser!(u8).range(0..=19))
                .default_value("6"),
        )
        .arg(
            Arg::new("auto-center")
                .long("auto-center")
                .help("Center the map on the mean of all rendered points")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("reject-ambiguous")
                .long("reject-ambiguous")
                .help("Skip FIT files whose start time matches more than one activity (default: first row wins)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output and detailed decoding information")
                .action(ArgAction::SetTrue),
        )
}

fn options_from_matches(matches: &clap::ArgMatches) -> Result<RunOptions> {
    let path = |id: &str| -> Result<PathBuf> {
        matches
            .get_one::<PathBuf>(id)
            .cloned()
            .ok_or_else(|| anyhow!("missing --{id}"))
    };
    let text = |id: &str| -> Result<String> {
        matches
            .get_one::<String>(id)
            .cloned()
            .ok_or_else(|| anyhow!("missing --{id}"))
    };
    let stride = |id: &str| -> Result<usize> {
        let value = matches
            .get_one::<u64>(id)
            .copied()
            .ok_or_else(|| anyhow!("missing --{id}"))?;
        usize::try_from(value).with_context(|| format!("--{id} too large"))
    };

    let mut options = RunOptions {
        gpx_dir: path("gpx-dir")?,
        fit_dir: path("fit-dir")?,
        gpx_filter: text("gpx-filter")?,
        fit_filter: text("fit-filter")?,
        activities_path: path("activities")?,
        output: path("output")?,
        gpx_stride: stride("gpx-stride")?,
        fit_stride: stride("fit-stride")?,
        duplicate_policy: if matches.get_flag("reject-ambiguous") {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::FirstWins
        },
        auto_center: matches.get_flag("auto-center"),
        ..RunOptions::default()
    };
    if let Some(center) = matches.get_one::<GeoPoint>("center") {
        options.map.center = *center;
    }
    if let Some(zoom) = matches.get_one::<u8>("zoom") {
        options.map.zoom = *zoom;
    }
    Ok(options)
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();
    let debug = matches.get_flag("debug");

    env_logger::Builder::new()
        .filter_level(if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
    debug!("activity_heatmap {} ({})", env!("CARGO_PKG_VERSION"), GIT_SHA);

    let options = options_from_matches(&matches)?;
    debug!("Run options: {options:?}");

    let report = match run(&options) {
        Ok(report) => report,
        Err(TrackError::NoInputFiles) => {
            eprintln!("Error: No GPX or FIT files found!");
            eprintln!(
                "Looked for '{}' in {} and '{}' in {}",
                options.gpx_filter,
                options.gpx_dir.display(),
                options.fit_filter,
                options.fit_dir.display()
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to write map to {}", options.output.display())
            })
        }
    };

    if !report.skipped.is_empty() {
        println!(
            "Skipped {} file(s); use --debug for details",
            report.skipped.len()
        );
    }
    println!(
        "Rendered {} of {} tracks",
        report.rendered.len(),
        report.total()
    );
    println!("Saved interactive map to {}", report.output.display());

    Ok(())
}
