//! Resource store access
//!
//! The store itself is an external collaborator; [`ResourceIndex`] is the
//! pipeline's view of it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::Result;
use crate::models::{FoodItem, StructuredFilter};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

/// Read access to the food resource records
#[async_trait]
pub trait ResourceStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Records matching `filter`, in store insertion order.
    ///
    /// Fails with [`crate::FoodMapError::StoreUnavailable`] only when the store cannot be
    /// reached; no matches is an empty vector.
    async fn query(&self, filter: &StructuredFilter) -> Result<Vec<FoodItem>>;
}

/// Queries food resources by structured filter
#[derive(Clone)]
pub struct ResourceIndex {
    store: Arc<dyn ResourceStore>,
}

impl ResourceIndex {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn query(&self, filter: &StructuredFilter) -> Result<Vec<FoodItem>> {
        let items = self.store.query(filter).await?;
        debug!("Store returned {} matching items", items.len());
        Ok(items)
    }
}

/// Apply `filter` to `items`, preserving their order
pub(crate) fn filter_items<'a>(
    items: impl IntoIterator<Item = &'a FoodItem>,
    filter: &StructuredFilter,
) -> Vec<FoodItem> {
    items
        .into_iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}
