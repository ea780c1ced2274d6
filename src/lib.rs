//! `FoodMap` - natural-language search over community food resources
//!
//! A free-text request such as "non-perishable food near Rabbittown" is turned
//! into a structured filter by a text-understanding provider, its place name is
//! geocoded, and the filter is applied to the resource store.

pub mod api;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod interpreter;
pub mod models;
pub mod search;
pub mod store;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::FoodMapConfig;
pub use error::{ErrorCode, FoodMapError};
pub use geocoding::{GeocodingCandidate, GeocodingProvider, LocationResolver, MapboxGeocoder};
pub use interpreter::{OpenAiProvider, QueryInterpreter, TextUnderstandingProvider};
pub use models::{Coordinates, FoodItem, Query, StructuredFilter};
pub use search::{SearchOptions, SearchOrchestrator, SearchResult, SearchStage};
pub use store::{InMemoryStore, JsonFileStore, ResourceIndex, ResourceStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, FoodMapError>;
