//! Search query text and the structured filter extracted from it

use serde::{Deserialize, Serialize};

use super::FoodItem;
use crate::FoodMapError;

/// Raw free-text search, guaranteed non-blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Create a query from user input
    pub fn new(text: impl Into<String>) -> crate::Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(FoodMapError::validation("Query cannot be empty"));
        }
        Ok(Self(text))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Query {
    type Error = FoodMapError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Query::new(text)
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attributes extracted from a free-text query.
///
/// Every field is optional because the text may not mention it. An absent field
/// imposes no constraint when the filter is matched against resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredFilter {
    pub category: Option<String>,
    pub location: Option<String>,
    pub target_audience: Option<String>,
}

impl StructuredFilter {
    #[must_use]
    pub fn new(
        category: Option<String>,
        location: Option<String>,
        target_audience: Option<String>,
    ) -> Self {
        Self {
            category: normalize(category),
            location: normalize(location),
            target_audience: normalize(target_audience),
        }
    }

    /// True when no attribute is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.location.is_none() && self.target_audience.is_none()
    }

    /// Conjunction over the present attributes, each compared case-insensitively
    #[must_use]
    pub fn matches(&self, item: &FoodItem) -> bool {
        attribute_matches(self.category.as_deref(), &item.category)
            && attribute_matches(self.location.as_deref(), &item.location)
            && attribute_matches(self.target_audience.as_deref(), &item.target_audience)
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn attribute_matches(wanted: Option<&str>, actual: &str) -> bool {
    match wanted {
        None => true,
        Some(wanted) => wanted.trim().to_lowercase() == actual.trim().to_lowercase(),
    }
}
