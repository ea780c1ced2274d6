//! Resource store backed by a JSON file
//!
//! The file is an array of food items and is read on every query, so edits are
//! picked up without restarting. A missing, unreadable or invalid file means the
//! store is unavailable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error};

use super::{ResourceStore, filter_items};
use crate::models::{FoodItem, StructuredFilter};
use crate::{FoodMapError, Result};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<FoodItem>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            error!("Failed to read store file {}: {}", self.path.display(), e);
            FoodMapError::store_unavailable(format!(
                "Cannot read {}: {e}",
                self.path.display()
            ))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            error!("Store file {} is not valid: {}", self.path.display(), e);
            FoodMapError::store_unavailable(format!(
                "Invalid store file {}: {e}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl ResourceStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json_file"
    }

    async fn query(&self, filter: &StructuredFilter) -> Result<Vec<FoodItem>> {
        let items = self.load().await?;
        debug!("Loaded {} items from {}", items.len(), self.path.display());
        Ok(filter_items(&items, filter))
    }
}
