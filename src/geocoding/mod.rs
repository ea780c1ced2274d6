//! Location resolution
//!
//! This module resolves place names extracted from a query into coordinates
//! using an external geocoding provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::models::Coordinates;
use crate::{FoodMapError, Result};

pub mod mapbox;

pub use mapbox::MapboxGeocoder;

/// A ranked match returned by a geocoding provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingCandidate {
    /// Display name of the match
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// External service turning place names into ranked coordinate candidates
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Candidates ordered best first. An empty list means the place is unknown.
    async fn geocode(&self, place: &str) -> Result<Vec<GeocodingCandidate>>;
}

/// Service for resolving location text into coordinates
#[derive(Clone)]
pub struct LocationResolver {
    provider: Arc<dyn GeocodingProvider>,
}

impl LocationResolver {
    pub fn new(provider: Arc<dyn GeocodingProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a place name to the coordinates of the best candidate.
    ///
    /// Absent or blank text returns `None` without contacting the provider, and so
    /// does a place the provider has no candidates for.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn resolve(&self, location_text: Option<&str>) -> Result<Option<Coordinates>> {
        let Some(place) = location_text.map(str::trim).filter(|p| !p.is_empty()) else {
            debug!("No location to resolve");
            return Ok(None);
        };

        debug!("Geocoding location name: {}", place);
        let candidates = self.provider.geocode(place).await?;

        let Some(best) = candidates.into_iter().next() else {
            warn!("No geocoding results found for '{}'", place);
            return Ok(None);
        };

        let coordinates = Coordinates::new(best.longitude, best.latitude).map_err(|e| {
            FoodMapError::geocoding(format!(
                "Provider returned invalid coordinates for '{place}': {e}"
            ))
        })?;

        debug!(
            "Resolved '{}' to {} ({})",
            place,
            best.name,
            coordinates.format_coordinates()
        );
        Ok(Some(coordinates))
    }
}
