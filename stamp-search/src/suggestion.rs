//! Place suggestions as presented to the user.

use serde::{Deserialize, Serialize};
use stamp_core::SelectedLocation;

/// One search hit.
///
/// Coordinates stay in the provider's string form until the suggestion is
/// accepted; parsing happens at selection time so malformed provider data
/// can be dropped without surfacing an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    /// Identifier unique within one result set. Built from the provider's
    /// identifier with an index/coordinate fallback, so uniqueness survives
    /// provider duplication.
    pub id: String,
    /// Primary display line.
    pub title: String,
    /// Secondary display line (city/region/country), possibly empty.
    pub subtitle: String,
    /// Latitude as supplied by the provider.
    pub lat: String,
    /// Longitude as supplied by the provider.
    pub lon: String,
}

impl PlaceSuggestion {
    /// Display label: title plus subtitle when present.
    #[must_use]
    pub fn label(&self) -> String {
        if self.subtitle.is_empty() {
            self.title.clone()
        } else {
            format!("{}, {}", self.title, self.subtitle)
        }
    }

    /// Parse this suggestion into a location override.
    ///
    /// Returns `None` when either coordinate fails to parse as a finite
    /// float; such suggestions are ignored rather than surfaced as errors.
    #[must_use]
    pub fn to_selected(&self) -> Option<SelectedLocation> {
        let latitude: f64 = self.lat.parse().ok().filter(|v: &f64| v.is_finite())?;
        let longitude: f64 = self.lon.parse().ok().filter(|v: &f64| v.is_finite())?;
        Some(SelectedLocation {
            latitude,
            longitude,
            label: self.label(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(lat: &str, lon: &str) -> PlaceSuggestion {
        PlaceSuggestion {
            id: "w_123".to_string(),
            title: "Paris".to_string(),
            subtitle: "Île-de-France, France".to_string(),
            lat: lat.to_string(),
            lon: lon.to_string(),
        }
    }

    #[test]
    fn label_joins_title_and_subtitle() {
        assert_eq!(
            suggestion("48.8566", "2.3522").label(),
            "Paris, Île-de-France, France"
        );

        let bare = PlaceSuggestion {
            subtitle: String::new(),
            ..suggestion("1", "2")
        };
        assert_eq!(bare.label(), "Paris");
    }

    #[test]
    fn selection_parses_coordinates() {
        let selected = suggestion("48.8566", "2.3522").to_selected().expect("parse");
        assert!((selected.latitude - 48.8566).abs() < f64::EPSILON);
        assert!((selected.longitude - 2.3522).abs() < f64::EPSILON);
        assert_eq!(selected.label, "Paris, Île-de-France, France");
    }

    #[test]
    fn malformed_coordinates_yield_none() {
        assert!(suggestion("not-a-number", "2.3522").to_selected().is_none());
        assert!(suggestion("48.8566", "").to_selected().is_none());
        assert!(suggestion("NaN", "2.0").to_selected().is_none());
    }
}
