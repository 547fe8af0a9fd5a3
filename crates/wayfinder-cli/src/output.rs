//! Output formatting for command results.

use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use wayfinder_lib::{DirectionsOutcome, Landmark, NavigationSnapshot, Region, Route};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Result of one `directions` command, as printed.
#[derive(Debug, Serialize)]
pub struct DirectionsReport<'a> {
    pub destination: &'a str,
    pub committed: bool,
    pub token: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted_during: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub state: &'a NavigationSnapshot,
}

impl<'a> DirectionsReport<'a> {
    pub fn new(
        destination: &'a Landmark,
        outcome: &DirectionsOutcome,
        state: &'a NavigationSnapshot,
    ) -> Self {
        let (aborted_during, reason) = match outcome {
            DirectionsOutcome::Committed { .. } => (None, None),
            DirectionsOutcome::Aborted { phase, reason, .. } => (
                Some(phase.to_string()),
                Some(reason.to_string()),
            ),
        };
        Self {
            destination: destination.name,
            committed: outcome.is_committed(),
            token: outcome.token().value(),
            aborted_during,
            reason,
            state,
        }
    }
}

pub fn render_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn render_landmarks(landmarks: &[Landmark], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => render_json(&landmarks),
        OutputFormat::Text => {
            println!("Landmarks ({}):", landmarks.len());
            println!("{:<30} {:>12} {:>12}", "Name", "Latitude", "Longitude");
            for landmark in landmarks {
                println!(
                    "{:<30} {:>12.6} {:>12.6}",
                    landmark.name, landmark.coordinate.latitude, landmark.coordinate.longitude
                );
            }
            Ok(())
        }
    }
}

pub fn render_region(region: &Region, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => render_json(region),
        OutputFormat::Text => {
            print_region("Region", region);
            Ok(())
        }
    }
}

pub fn render_directions(report: &DirectionsReport<'_>, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return render_json(report);
    }

    if report.committed {
        println!(
            "Walking route to {} (request #{}):",
            report.destination, report.token
        );
        if let Some(route) = &report.state.route {
            print_route(route);
        }
        print_region("Map region", &report.state.region);
    } else {
        println!(
            "Directions to {} aborted during {}: {}",
            report.destination,
            report.aborted_during.as_deref().unwrap_or("unknown phase"),
            report.reason.as_deref().unwrap_or("unknown reason")
        );
        print_region("Map region unchanged", &report.state.region);
    }
    Ok(())
}

fn print_route(route: &Route) {
    println!("  Distance: {}", format_distance(route.distance_m));
    println!(
        "  Expected travel time: {}",
        format_travel_time(route.expected_travel_time)
    );
    println!("  Path vertices: {}", route.path.len());
}

fn print_region(label: &str, region: &Region) {
    println!("{}:", label);
    println!("  Center: {}", region.center);
    println!(
        "  Span: {:.6} deg lat x {:.6} deg lon",
        region.span.latitude_delta, region.span.longitude_delta
    );
}

/// Format metres as `850 m` or `4.21 km`.
pub fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.2} km", meters / 1_000.0)
    }
}

/// Format a duration as `45 min` or `1 h 05 min`.
pub fn format_travel_time(duration: Duration) -> String {
    let minutes = (duration.as_secs_f64() / 60.0).round() as u64;
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        format!("{} h {:02} min", minutes / 60, minutes % 60)
    }
}
