//! Food assistance resource records

use serde::{Deserialize, Serialize};

use super::Coordinates;

/// A food resource owned by the external store; read-only to the search pipeline
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: String,
    /// Kind of food offered, e.g. "produce" or "non-perishable"
    pub category: String,
    pub name: String,
    /// Who the resource serves, e.g. "families" or "seniors"
    pub target_audience: String,
    /// Neighbourhood or place name
    pub location: String,
    pub coordinates: Coordinates,
}
