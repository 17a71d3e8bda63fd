//! Photon (komoot) geocoding provider.
//!
//! Speaks the Photon GeoJSON API and flattens features into
//! [`PlaceSuggestion`]s with stable, duplication-proof identifiers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{SearchError, SearchResult};
use crate::provider::PlaceProvider;
use crate::suggestion::PlaceSuggestion;
use crate::{RESULT_LIMIT, USER_AGENT};

/// Public Photon endpoint.
pub const PHOTON_ENDPOINT: &str = "https://photon.komoot.io/api/";

/// Identifier prefix used when a feature carries no OSM type.
const FALLBACK_OSM_TYPE: &str = "ph";

/// Place search backed by the Photon API.
pub struct PhotonProvider {
    http: Client,
    endpoint: Url,
}

impl PhotonProvider {
    /// Create a provider against the public Photon endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new() -> SearchResult<Self> {
        Self::with_endpoint(PHOTON_ENDPOINT)
    }

    /// Create a provider against a custom endpoint (tests, self-hosted
    /// Photon).
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
impl PlaceProvider for PhotonProvider {
    fn name(&self) -> &'static str {
        "photon"
    }

    async fn search(&self, query: &str) -> SearchResult<Vec<PlaceSuggestion>> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", RESULT_LIMIT);

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::Status {
                provider: self.name(),
                status: response.status().as_u16(),
            });
        }

        let payload: PhotonResponse = response.json().await?;
        Ok(payload
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| map_feature(index, feature))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct PhotonResponse {
    #[serde(default)]
    features: Vec<PhotonFeature>,
}

#[derive(Debug, Deserialize)]
struct PhotonFeature {
    #[serde(default)]
    properties: PhotonProperties,
    #[serde(default)]
    geometry: Option<PhotonGeometry>,
}

#[derive(Debug, Default, Deserialize)]
struct PhotonProperties {
    name: Option<String>,
    street: Option<String>,
    osm_key: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    osm_id: Option<i64>,
    osm_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotonGeometry {
    /// GeoJSON order: `[longitude, latitude]`.
    #[serde(default)]
    coordinates: Vec<f64>,
}

fn map_feature(index: usize, feature: &PhotonFeature) -> PlaceSuggestion {
    let props = &feature.properties;

    let title = [
        &props.name,
        &props.street,
        &props.osm_key,
        &props.city,
        &props.country,
        &props.state,
        &props.kind,
    ]
    .iter()
    .find_map(|field| field.as_deref())
    .unwrap_or("Unknown")
    .to_string();

    let mut parts: Vec<String> = Vec::new();
    if let Some(city) = &props.city {
        if *city != title {
            parts.push(city.clone());
        }
    }
    if let Some(state) = &props.state {
        parts.push(state.clone());
    }
    if let Some(country) = &props.country {
        parts.push(country.clone());
    }
    let subtitle = parts.join(", ");

    let (lat, lon) = feature
        .geometry
        .as_ref()
        .filter(|geometry| geometry.coordinates.len() >= 2)
        .map(|geometry| {
            (
                geometry.coordinates[1].to_string(),
                geometry.coordinates[0].to_string(),
            )
        })
        .unwrap_or_default();

    let osm_type = props.osm_type.as_deref().unwrap_or(FALLBACK_OSM_TYPE);
    let base = match props.osm_id {
        Some(osm_id) => format!("{osm_type}_{osm_id}"),
        None => format!("{osm_type}_{lat}_{lon}"),
    };
    // The index suffix keeps ids unique even when the provider returns the
    // same place twice.
    let id = format!("{base}-{index}");

    PlaceSuggestion {
        id,
        title,
        subtitle,
        lat,
        lon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> PhotonProvider {
        PhotonProvider::with_endpoint(format!("{}/api/", server.uri())).expect("provider")
    }

    fn paris_feature() -> serde_json::Value {
        json!({
            "type": "Feature",
            "properties": {
                "name": "Paris",
                "osm_id": 7_444i64,
                "osm_type": "R",
                "city": "Paris",
                "state": "Île-de-France",
                "country": "France",
                "osm_key": "place",
                "type": "city"
            },
            "geometry": { "type": "Point", "coordinates": [2.3522, 48.8566] }
        })
    }

    #[tokio::test]
    async fn maps_features_to_suggestions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .and(query_param("q", "Paris"))
            .and(query_param("limit", "8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": [paris_feature()]
            })))
            .mount(&server)
            .await;

        let found = provider_for(&server).await.search("Paris").await.expect("results");
        assert_eq!(found.len(), 1);
        let hit = &found[0];
        assert_eq!(hit.id, "R_7444-0");
        assert_eq!(hit.title, "Paris");
        // City equal to the title is dropped from the subtitle.
        assert_eq!(hit.subtitle, "Île-de-France, France");
        assert_eq!(hit.lat, "48.8566");
        assert_eq!(hit.lon, "2.3522");
    }

    #[tokio::test]
    async fn title_falls_back_through_the_property_chain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [
                    { "properties": { "street": "Rue de Rivoli", "country": "France" },
                      "geometry": { "coordinates": [2.35, 48.85] } },
                    { "properties": {}, "geometry": null }
                ]
            })))
            .mount(&server)
            .await;

        let found = provider_for(&server).await.search("riv").await.expect("results");
        assert_eq!(found[0].title, "Rue de Rivoli");
        assert_eq!(found[1].title, "Unknown");
        // Missing geometry degrades to empty coordinate strings; selection
        // will drop the suggestion later.
        assert_eq!(found[1].lat, "");
        // No OSM id: the coordinate base plus index suffix still yields an id.
        assert_eq!(found[1].id, "ph__-1");
    }

    #[tokio::test]
    async fn duplicate_osm_ids_stay_distinguishable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [
                    { "properties": { "name": "A", "osm_id": 5i64, "osm_type": "N" },
                      "geometry": { "coordinates": [1.0, 2.0] } },
                    { "properties": { "name": "A", "osm_id": 5i64, "osm_type": "N" },
                      "geometry": { "coordinates": [1.0, 2.0] } }
                ]
            })))
            .mount(&server)
            .await;

        let found = provider_for(&server).await.search("a").await.expect("results");
        assert_eq!(found[0].id, "N_5-0");
        assert_eq!(found[1].id, "N_5-1");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let error = provider_for(&server).await.search("x").await.unwrap_err();
        assert!(matches!(
            error,
            SearchError::Status {
                provider: "photon",
                status: 503
            }
        ));
    }
}
