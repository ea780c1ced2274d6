//! Mapbox Places geocoding client
//!
//! Uses the v5 `mapbox.places` forward geocoding endpoint. Each feature carries
//! its position as `center = [longitude, latitude]`.

use std::time::Instant;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::{GeocodingCandidate, GeocodingProvider};
use crate::config::{ENV_MAPBOX_TOKEN, GeocodingConfig};
use crate::{FoodMapError, Result, http};

/// Geocoding provider backed by the Mapbox API
pub struct MapboxGeocoder {
    client: ClientWithMiddleware,
    access_token: String,
    base_url: String,
    limit: u32,
}

/// Forward geocoding response
#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    place_name: String,
    /// [longitude, latitude]
    center: [f64; 2],
}

impl From<Feature> for GeocodingCandidate {
    fn from(feature: Feature) -> Self {
        GeocodingCandidate {
            name: feature.place_name,
            longitude: feature.center[0],
            latitude: feature.center[1],
        }
    }
}

impl MapboxGeocoder {
    /// Create a geocoder from configuration.
    ///
    /// # Errors
    /// Returns a configuration error if no access token is configured.
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let access_token = config.access_token.clone().ok_or_else(|| {
            FoodMapError::config(format!(
                "Geocoding access token missing. Set {ENV_MAPBOX_TOKEN} or geocoding.access_token"
            ))
        })?;

        let client = http::build_client(config.timeout(), config.max_retries)
            .map_err(|e| FoodMapError::config(e.to_string()))?;

        Ok(Self {
            client,
            access_token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.limit,
        })
    }

    fn url(&self, place: &str) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{}.json?access_token={}&limit={}",
            self.base_url,
            urlencoding::encode(place),
            urlencoding::encode(&self.access_token),
            self.limit
        )
    }
}

#[async_trait]
impl GeocodingProvider for MapboxGeocoder {
    fn name(&self) -> &'static str {
        "mapbox"
    }

    #[instrument(skip(self), fields(location = place))]
    async fn geocode(&self, place: &str) -> Result<Vec<GeocodingCandidate>> {
        info!("Geocoding location: '{}'", place);
        let start_time = Instant::now();

        let response = self.client.get(self.url(place)).send().await.map_err(|e| {
            warn!("Geocoding request failed: {}", e);
            FoodMapError::geocoding(format!("Request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Geocoding API returned {}", status);
            return Err(FoodMapError::geocoding(format!(
                "Geocoding API request failed with status {status}"
            )));
        }

        let places: PlacesResponse = response.json().await.map_err(|e| {
            error!("Failed to parse geocoding response for '{}': {}", place, e);
            FoodMapError::geocoding(format!("Invalid geocoding data received: {e}"))
        })?;

        let candidates: Vec<GeocodingCandidate> =
            places.features.into_iter().map(Into::into).collect();

        if candidates.is_empty() {
            warn!("No results found for location '{}'", place);
        } else {
            info!(
                "Found {} geocoding results for '{}' in {:.3}s",
                candidates.len(),
                place,
                start_time.elapsed().as_secs_f64()
            );
            debug!(
                "Geocoding results: {:?}",
                candidates
                    .iter()
                    .map(|c| format!("{} ({:.4}, {:.4})", c.name, c.longitude, c.latitude))
                    .collect::<Vec<_>>()
            );
        }

        Ok(candidates)
    }
}
