//! # Track Visualizer
//!
//! Renders one or more exported track CSVs as a single self-contained
//! Leaflet HTML document. Each file contributes up to three polylines, one
//! per coordinate source: raw GPS (black), fused estimate (red), and the
//! derived dead-reckoned track (blue).
//!
//! The CSVs are read back by header name, so column order and extra columns
//! do not matter. Rows with missing, non-finite, or (0, 0) coordinates are
//! dropped from the polyline rather than plotted at null island.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use tracing::{info, warn};

use crate::config::MapConfig;
use crate::error::{Result, TransectError};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Coordinate sources plotted per file, with their plot colors
const SOURCES: [(&str, &str, &str, &str); 3] = [
    ("gps", "latitude", "longitude", "black"),
    ("fused", "fused_lat", "fused_lon", "red"),
    ("derived", "derived_lat", "derived_lon", "blue"),
];

/// One polyline: a labelled coordinate sequence
#[derive(Debug)]
struct TrackLine {
    label: String,
    color: &'static str,
    points: Vec<(f64, f64)>,
}

/// Render the exported CSVs at `inputs` into a Leaflet map at `output`
///
/// # Errors
///
/// Returns `TransectError::Io`/`Csv` if an input cannot be read, and
/// `TransectError::EmptyTrack` when no input yields a single plottable
/// coordinate. The output is written atomically.
pub fn render<P: AsRef<Path>, Q: AsRef<Path>>(
    inputs: &[P],
    output: Q,
    map: &MapConfig,
) -> Result<()> {
    let mut lines: Vec<TrackLine> = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());

        let file_lines = read_track_lines(input, &stem)?;
        if file_lines.is_empty() {
            warn!("{}: no plottable coordinates", input.display());
        }
        lines.extend(file_lines);
    }

    if lines.is_empty() {
        return Err(TransectError::EmptyTrack);
    }

    let center = match (map.center_lat, map.center_lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => mean_center(&lines[0].points),
    };

    let html = render_html(&lines, center, map.zoom);
    write_atomic(output.as_ref(), html.as_bytes())?;

    info!(
        "wrote map with {} track lines to {}",
        lines.len(),
        output.as_ref().display()
    );
    Ok(())
}

/// Collect the nonempty coordinate sets of one CSV
fn read_track_lines(path: &Path, stem: &str) -> Result<Vec<TrackLine>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let sources: Vec<(usize, Option<usize>, Option<usize>)> = SOURCES
        .iter()
        .enumerate()
        .map(|(i, (_, lat, lon, _))| (i, column(lat), column(lon)))
        .collect();

    let mut points: Vec<Vec<(f64, f64)>> = vec![Vec::new(); SOURCES.len()];
    for record in reader.records() {
        let record = record?;
        for &(i, lat_col, lon_col) in &sources {
            let (Some(lat_col), Some(lon_col)) = (lat_col, lon_col) else {
                continue;
            };
            if let Some(point) = parse_point(record.get(lat_col), record.get(lon_col)) {
                points[i].push(point);
            }
        }
    }

    Ok(points
        .into_iter()
        .zip(SOURCES.iter())
        .filter(|(pts, _)| !pts.is_empty())
        .map(|(pts, &(source, _, _, color))| TrackLine {
            label: format!("{} {}", stem, source),
            color,
            points: pts,
        })
        .collect())
}

/// Parse one coordinate pair, rejecting blanks, non-finite values, and the
/// (0, 0) no-fix placeholder. Shared with the waypoint exporter so both
/// consumers of exported CSVs clean coordinates the same way.
pub(crate) fn parse_point(lat: Option<&str>, lon: Option<&str>) -> Option<(f64, f64)> {
    let lat: f64 = lat?.trim().parse().ok()?;
    let lon: f64 = lon?.trim().parse().ok()?;
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    if lat == 0.0 && lon == 0.0 {
        return None;
    }
    Some((lat, lon))
}

fn mean_center(points: &[(f64, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let (lat_sum, lon_sum) = points
        .iter()
        .fold((0.0, 0.0), |(la, lo), &(lat, lon)| (la + lat, lo + lon));
    (lat_sum / n, lon_sum / n)
}

fn render_html(lines: &[TrackLine], center: (f64, f64), zoom: u8) -> String {
    let mut polylines = String::new();
    for line in lines {
        let mut coords = String::new();
        for &(lat, lon) in &line.points {
            let _ = write!(coords, "[{:.7},{:.7}],", lat, lon);
        }
        let _ = write!(
            polylines,
            "L.polyline([{}], {{color: '{}', weight: 2}})\
             .bindTooltip('{}').addTo(map);\n",
            coords.trim_end_matches(','),
            line.color,
            line.label.replace('\'', "\\'"),
        );
    }

    let mut legend_rows = String::new();
    for (source, _, _, color) in SOURCES {
        let _ = write!(
            legend_rows,
            "<div><span style=\"background:{};\"></span>{}</div>",
            color, source
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Survey Tracks</title>
<link rel="stylesheet" href="{css}">
<script src="{js}"></script>
<style>
  html, body, #map {{ height: 100%; margin: 0; }}
  .legend {{
    position: absolute; bottom: 20px; left: 20px; z-index: 1000;
    background: white; padding: 8px 12px; border-radius: 4px;
    font: 13px sans-serif; box-shadow: 0 1px 4px rgba(0,0,0,0.3);
  }}
  .legend span {{
    display: inline-block; width: 18px; height: 4px;
    margin-right: 6px; vertical-align: middle;
  }}
</style>
</head>
<body>
<div id="map"></div>
<div class="legend">{legend}</div>
<script>
var map = L.map('map').setView([{lat:.7}, {lon:.7}], {zoom});
L.control.scale().addTo(map);
L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
  attribution: '&copy; OpenStreetMap contributors'
}}).addTo(map);
{polylines}</script>
</body>
</html>
"#,
        css = LEAFLET_CSS,
        js = LEAFLET_JS,
        legend = legend_rows,
        lat = center.0,
        lon = center.1,
        zoom = zoom,
        polylines = polylines,
    )
}

/// Same temp-file-then-rename discipline as the CSV exporter
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
