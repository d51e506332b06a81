//! Interactive map output
//!
//! [`MapDocument`] accumulates one polyline layer per track and serializes
//! the whole map to a single Leaflet HTML page. Layer data is embedded as
//! JSON; names and dates are HTML-escaped before they reach tooltip or popup
//! markup.

use crate::error::Result;
use crate::types::{GeoPoint, TrackRecord};
use log::debug;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

pub const LEAFLET_VERSION: &str = "1.9.4";

/// Default map center, roughly New England
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::from_valid(44.0, -71.5);
pub const DEFAULT_ZOOM: u8 = 6;

pub const DEFAULT_LINK_BASE: &str = "https://www.strava.com/activities/";

pub const TOOLTIP_CSS: &str = r#"<style>
    .leaflet-tooltip.custom-tooltip-style {
        background-color: #007bff;
        color: yellow;
        border: 2px solid green;
        font-size: 16px;
        padding: 8px;
        border-radius: 3px;
    }
    .leaflet-interactive:focus {
        outline: none !important;
    }
</style>"#;

/// Polyline appearance shared by every track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
            weight: 1.0,
            opacity: 0.8,
        }
    }
}

/// Base map settings
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub center: GeoPoint,
    pub zoom: u8,
    pub style: LineStyle,
    /// Outbound link prefix; the track's external id is appended
    pub link_base: String,
    pub tile_url: String,
    pub attribution: String,
    /// Popup max width in pixels
    pub popup_max_width: u32,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            style: LineStyle::default(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
            popup_max_width: 300,
        }
    }
}

/// One rendered track
#[derive(Debug, Clone, Serialize)]
pub struct TrackLayer {
    pub points: Vec<[f64; 2]>,
    pub tooltip: String,
    pub popup: String,
}

/// Map under construction
#[derive(Debug, Clone)]
pub struct MapDocument {
    options: MapOptions,
    layers: Vec<TrackLayer>,
    point_sum: (f64, f64, usize),
}

impl MapDocument {
    pub fn new(options: MapOptions) -> Self {
        Self {
            options,
            layers: Vec::new(),
            point_sum: (0.0, 0.0, 0),
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Add a track as one polyline. Tracks without points are ignored and
    /// `false` is returned.
    pub fn add_track(&mut self, track: &TrackRecord) -> bool {
        if track.is_empty() {
            return false;
        }

        let link = format!("{}{}", self.options.link_base, track.external_id);
        let name = escape_html(&track.display_name);
        let date = escape_html(&track.display_date);

        for point in &track.points {
            self.point_sum.0 += point.latitude();
            self.point_sum.1 += point.longitude();
            self.point_sum.2 += 1;
        }

        self.layers.push(TrackLayer {
            points: track.points.iter().map(GeoPoint::as_pair).collect(),
            tooltip: format!("<strong>{name}</strong><br>{date}<br>Click for more info"),
            popup: format!(
                "<strong>Activity:</strong> {name}<br>\n<strong>Date:</strong> {date}<br>\n<a href=\"{}\" target=\"_blank\">View on Strava</a>",
                escape_html(&link)
            ),
        });
        true
    }

    pub fn layers(&self) -> &[TrackLayer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Mean of every point added so far
    pub fn centroid(&self) -> Option<GeoPoint> {
        let (lat, lon, count) = self.point_sum;
        if count == 0 {
            return None;
        }
        GeoPoint::new(lat / count as f64, lon / count as f64)
    }

    pub fn set_center(&mut self, center: GeoPoint) {
        self.options.center = center;
    }

    /// Serialize the map to a standalone HTML page
    pub fn to_html(&self) -> Result<String> {
        let options = &self.options;
        let center = script_json(&options.center.as_pair())?;
        let style = script_json(&options.style)?;
        let layers = script_json(&self.layers)?;
        let tile_url = script_json(&options.tile_url)?;
        let attribution = script_json(&options.attribution)?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
<style>
    html, body {{ width: 100%; height: 100%; margin: 0; padding: 0; }}
    #map {{ position: absolute; top: 0; bottom: 0; right: 0; left: 0; }}
</style>
{css}
</head>
<body>
<div id="map"></div>
<script>
    var map = L.map("map", {{ center: {center}, zoom: {zoom} }});
    L.tileLayer({tile_url}, {{ attribution: {attribution}, maxZoom: 19 }}).addTo(map);
    var style = {style};
    var tracks = {layers};
    tracks.forEach(function (track) {{
        L.polyline(track.points, style)
            .bindTooltip(track.tooltip, {{ className: "custom-tooltip-style", sticky: true }})
            .bindPopup(track.popup, {{ maxWidth: {max_width} }})
            .addTo(map);
    }});
</script>
</body>
</html>
"#,
            version = LEAFLET_VERSION,
            css = TOOLTIP_CSS,
            zoom = options.zoom,
            max_width = options.popup_max_width,
        ))
    }

    /// Write the page to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let html = self.to_html()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, html)?;
        debug!(
            "Wrote {} layers to {}",
            self.layers.len(),
            path.display()
        );
        Ok(())
    }
}

/// JSON safe to inline inside a `<script>` element
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).map_err(io::Error::from)?;
    Ok(json.replace("</", "<\\/"))
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
