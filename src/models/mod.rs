//! Data models for the FoodMap search pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Query: raw search text and the structured filter extracted from it
//! - Location: validated geographic coordinates
//! - Resource: food assistance records held by the resource store

pub mod location;
pub mod query;
pub mod resource;

// Re-export all public types for convenient access
pub use location::Coordinates;
pub use query::{Query, StructuredFilter};
pub use resource::FoodItem;
