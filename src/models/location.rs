//! Geographic coordinates produced by location resolution

use serde::{Deserialize, Serialize};

use crate::FoodMapError;

/// A validated longitude/latitude pair
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    /// Longitude in decimal degrees, [-180, 180]
    longitude: f64,
    /// Latitude in decimal degrees, [-90, 90]
    latitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    longitude: f64,
    latitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = FoodMapError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.longitude, raw.latitude)
    }
}

impl Coordinates {
    /// Create coordinates, rejecting values outside the valid ranges
    pub fn new(longitude: f64, latitude: f64) -> crate::Result<Self> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(FoodMapError::validation(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(FoodMapError::validation(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }

        Ok(Self {
            longitude,
            latitude,
        })
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Format as "lon, lat" with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.longitude, self.latitude)
    }
}
