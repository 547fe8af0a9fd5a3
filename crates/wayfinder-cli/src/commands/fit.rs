//! Fit command handler: compute the map region enclosing a set of points.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use wayfinder_lib::{find_landmark, fit_region, GeoPoint, DEFAULT_REGION_PADDING};

use crate::args::{parse_padding, parse_point};
use crate::output::{render_region, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct FitArgs {
    /// A point to include, as LAT,LON. Repeatable.
    #[arg(long = "point", value_parser = parse_point, allow_hyphen_values = true)]
    pub points: Vec<GeoPoint>,

    /// A built-in landmark to include by name. Repeatable.
    #[arg(long = "landmark")]
    pub landmarks: Vec<String>,

    /// JSON file holding an array of {"latitude": .., "longitude": ..} objects.
    #[arg(long = "points-file")]
    pub points_file: Option<PathBuf>,

    /// Margin in degrees added around the points.
    #[arg(long, value_parser = parse_padding, default_value_t = DEFAULT_REGION_PADDING)]
    pub padding: f64,
}

pub fn handle_fit(args: &FitArgs, format: OutputFormat) -> Result<()> {
    let points = collect_points(args)?;
    if points.is_empty() {
        bail!("no points given; use --point, --landmark or --points-file");
    }

    let region = fit_region(&points, args.padding).context("failed to fit region")?;
    tracing::debug!(points = points.len(), padding = args.padding, "fitted region");
    render_region(&region, format)
}

fn collect_points(args: &FitArgs) -> Result<Vec<GeoPoint>> {
    let mut points = args.points.clone();
    for name in &args.landmarks {
        points.push(find_landmark(name)?.coordinate);
    }
    if let Some(path) = &args.points_file {
        points.extend(load_points_file(path)?);
    }
    Ok(points)
}

fn load_points_file(path: &Path) -> Result<Vec<GeoPoint>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read points from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse points from {}", path.display()))
}
