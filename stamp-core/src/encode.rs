//! Marker content - which coordinate wins, and how it becomes a map link.

use serde::{Deserialize, Serialize};

/// Base URL of the map query the marker encodes.
pub const MAP_BASE_URL: &str = "https://www.google.com/maps/search/";

/// Minimum number of fractional digits rendered per coordinate.
const MIN_FRACTION_DIGITS: usize = 6;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A user-picked place overriding the captured location.
///
/// The override is only valid while `label` is still shown verbatim in the
/// search field; editing the text away from it clears the override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Display label of the accepted suggestion.
    pub label: String,
}

impl SelectedLocation {
    /// The coordinate pair of this selection.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Resolve the coordinate the marker should encode.
///
/// A user-picked place wins over the captured location; recomputed on every
/// read so it can never go stale.
#[must_use]
pub fn active_coordinate(
    captured: Option<Coordinate>,
    selected: Option<&SelectedLocation>,
) -> Option<Coordinate> {
    selected.map(SelectedLocation::coordinate).or(captured)
}

/// Render one coordinate component.
///
/// Uses the shortest round-trip representation padded to at least
/// [`MIN_FRACTION_DIGITS`] fractional digits: distinct values always render
/// distinctly, equal values always render identically, and precision stays
/// sufficient for sub-meter distinction.
fn format_component(value: f64) -> String {
    let mut rendered = format!("{value}");
    match rendered.find('.') {
        Some(dot) => {
            let fraction = rendered.len() - dot - 1;
            for _ in fraction..MIN_FRACTION_DIGITS {
                rendered.push('0');
            }
        }
        None => {
            rendered.push('.');
            for _ in 0..MIN_FRACTION_DIGITS {
                rendered.push('0');
            }
        }
    }
    rendered
}

/// Build the map link for a coordinate pair.
#[must_use]
pub fn map_url(coordinate: Coordinate) -> String {
    format!(
        "{MAP_BASE_URL}?api=1&query={},{}",
        format_component(coordinate.latitude),
        format_component(coordinate.longitude),
    )
}

/// Encode the marker payload from the two possible coordinate sources.
///
/// Returns an empty string when neither source is present; callers treat
/// that as "no geodata", not as an error.
#[must_use]
pub fn encode_payload(
    captured: Option<Coordinate>,
    selected: Option<&SelectedLocation>,
) -> String {
    active_coordinate(captured, selected).map_or_else(String::new, map_url)
}
