//! Nominatim (OpenStreetMap) fallback provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{SearchError, SearchResult};
use crate::provider::PlaceProvider;
use crate::suggestion::PlaceSuggestion;
use crate::{RESULT_LIMIT, USER_AGENT};

/// Public Nominatim search endpoint.
pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Identifier prefix for Nominatim-sourced suggestions.
const ID_PREFIX: &str = "nm";

/// Place search backed by the Nominatim API.
pub struct NominatimProvider {
    http: Client,
    endpoint: Url,
}

impl NominatimProvider {
    /// Create a provider against the public Nominatim endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new() -> SearchResult<Self> {
        Self::with_endpoint(NOMINATIM_ENDPOINT)
    }

    /// Create a provider against a custom endpoint (tests, self-hosted
    /// instances).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidEndpoint`] for a malformed URL and
    /// [`SearchError::Http`] if the HTTP client fails to build.
    pub fn with_endpoint(endpoint: impl AsRef<str>) -> SearchResult<Self> {
        let endpoint = Url::parse(endpoint.as_ref())?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl PlaceProvider for NominatimProvider {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn search(&self, query: &str) -> SearchResult<Vec<PlaceSuggestion>> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("q", query)
            .append_pair("limit", RESULT_LIMIT);

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::Status {
                provider: self.name(),
                status: response.status().as_u16(),
            });
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        Ok(places
            .iter()
            .enumerate()
            .map(|(index, place)| map_place(index, place))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: Option<i64>,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    lat: String,
    #[serde(default)]
    lon: String,
}

fn map_place(index: usize, place: &NominatimPlace) -> PlaceSuggestion {
    // display_name is a comma-joined chain from most to least specific;
    // the head becomes the title, the tail the subtitle.
    let (head, tail) = match place.display_name.split_once(',') {
        Some((head, tail)) => (head.trim(), tail.trim()),
        None => (place.display_name.trim(), ""),
    };

    let title = place
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(if head.is_empty() { "Unknown" } else { head })
        .to_string();

    let base = match place.place_id {
        Some(place_id) => format!("{ID_PREFIX}_{place_id}"),
        None => format!("{ID_PREFIX}_{}_{}", place.lat, place.lon),
    };
    // The index suffix keeps ids unique even on provider duplication.
    let id = format!("{base}-{index}");

    PlaceSuggestion {
        id,
        title,
        subtitle: tail.to_string(),
        lat: place.lat.clone(),
        lon: place.lon.clone(),
    }
}
