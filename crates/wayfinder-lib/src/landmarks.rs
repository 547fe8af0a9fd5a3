//! Static points of interest shown on the map.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::geo::GeoPoint;

/// A named point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Landmark {
    pub name: &'static str,
    /// Icon hint for the presentation layer.
    pub symbol: &'static str,
    pub coordinate: GeoPoint,
}

const fn landmark(
    name: &'static str,
    symbol: &'static str,
    latitude: f64,
    longitude: f64,
) -> Landmark {
    Landmark {
        name,
        symbol,
        coordinate: GeoPoint {
            latitude,
            longitude,
        },
    }
}

pub const HOME: Landmark = landmark("Home", "house.fill", -31.970838701817076, 115.81733669987415);
pub const FERRY_ELIZABETH_QUAY: Landmark = landmark(
    "Ferry Elizabeth Quay",
    "ferry.fill",
    -31.956956148146187,
    115.85598567416766,
);
pub const KINGS_PARK: Landmark = landmark(
    "King Park & Botanical Garden",
    "tree.fill",
    -31.960772289516896,
    115.8327472610476,
);
pub const WORK: Landmark = landmark(
    "My job",
    "building.2.fill",
    -31.872630919113636,
    115.92597050781775,
);
pub const OPTUS_STADIUM: Landmark = landmark(
    "Optus Stadium",
    "sportscourt.fill",
    -31.950895396290967,
    115.88824353965249,
);
pub const PERTH: Landmark = landmark("Perth", "building.columns.fill", -31.950934450673, 115.85996564582562);

/// Every landmark, in display order.
pub const LANDMARKS: [Landmark; 6] = [
    HOME,
    FERRY_ELIZABETH_QUAY,
    KINGS_PARK,
    WORK,
    OPTUS_STADIUM,
    PERTH,
];

/// Minimum Jaro-Winkler similarity for a name to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Look up a landmark by case-insensitive name.
///
/// Unknown names fail with up to three close suggestions.
pub fn find_landmark(name: &str) -> Result<Landmark> {
    let needle = name.trim().to_lowercase();
    if let Some(found) = LANDMARKS
        .iter()
        .find(|landmark| landmark.name.to_lowercase() == needle)
    {
        return Ok(*found);
    }

    Err(Error::UnknownLandmark {
        name: name.to_string(),
        suggestions: fuzzy_landmark_matches(&needle, 3),
    })
}

fn fuzzy_landmark_matches(needle: &str, limit: usize) -> Vec<String> {
    let mut scored: Vec<(f64, &'static str)> = LANDMARKS
        .iter()
        .map(|landmark| {
            let score = strsim::jaro_winkler(needle, &landmark.name.to_lowercase());
            (score, landmark.name)
        })
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}
