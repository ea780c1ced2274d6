use async_trait::async_trait;

use super::{ResourceStore, filter_items};
use crate::Result;
use crate::models::{FoodItem, StructuredFilter};

/// Store holding its records in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    items: Vec<FoodItem>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(items: Vec<FoodItem>) -> Self {
        Self { items }
    }

    pub fn insert(&mut self, item: FoodItem) {
        self.items.push(item);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn query(&self, filter: &StructuredFilter) -> Result<Vec<FoodItem>> {
        Ok(filter_items(&self.items, filter))
    }
}
