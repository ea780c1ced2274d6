//! Search orchestration
//!
//! A search runs in two phases. The query is interpreted first, since nothing
//! else can start without a filter. Location resolution and the resource query
//! then run concurrently and are joined before the result is assembled.
//!
//! Failure policy:
//! - interpretation failure aborts the search
//! - store failure aborts the search
//! - geocoding failure drops the coordinates, unless strict geocoding is requested

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::{FoodMapConfig, SearchConfig};
use crate::geocoding::{LocationResolver, MapboxGeocoder};
use crate::interpreter::{OpenAiProvider, QueryInterpreter};
use crate::models::{Coordinates, FoodItem, Query, StructuredFilter};
use crate::store::{JsonFileStore, ResourceIndex};
use crate::{FoodMapError, Result};

/// Per-search settings supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Limit applied to each provider and store call
    pub timeout: Duration,
    /// Fail the search when geocoding fails instead of omitting coordinates
    pub strict_geocoding: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            strict_geocoding: false,
        }
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            timeout: config.timeout(),
            strict_geocoding: config.strict_geocoding,
        }
    }
}

/// Outcome of a successful search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub filter: StructuredFilter,
    /// Absent when the query names no place, the place is unknown, or geocoding failed
    pub coordinates: Option<Coordinates>,
    pub items: Vec<FoodItem>,
}

/// Lifecycle of a single search request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    Received,
    Interpreting,
    InterpretationFailed,
    ResolvingAndSearching,
    Assembled,
    SearchFailed,
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchStage::Received => "received",
            SearchStage::Interpreting => "interpreting",
            SearchStage::InterpretationFailed => "interpretation_failed",
            SearchStage::ResolvingAndSearching => "resolving_and_searching",
            SearchStage::Assembled => "assembled",
            SearchStage::SearchFailed => "search_failed",
        };
        f.write_str(name)
    }
}

fn enter(stage: SearchStage) {
    debug!(%stage, "search stage");
}

/// Composes interpretation, location resolution and resource lookup
#[derive(Clone)]
pub struct SearchOrchestrator {
    interpreter: QueryInterpreter,
    resolver: LocationResolver,
    index: ResourceIndex,
    options: SearchOptions,
}

impl SearchOrchestrator {
    pub fn new(interpreter: QueryInterpreter, resolver: LocationResolver, index: ResourceIndex) -> Self {
        Self {
            interpreter,
            resolver,
            index,
            options: SearchOptions::default(),
        }
    }

    /// Build the production pipeline: OpenAI interpreter, Mapbox geocoder, JSON file store
    pub fn from_config(config: &FoodMapConfig) -> Result<Self> {
        let interpreter = QueryInterpreter::new(Arc::new(OpenAiProvider::new(&config.interpreter)?));
        let resolver = LocationResolver::new(Arc::new(MapboxGeocoder::new(&config.geocoding)?));
        let index = ResourceIndex::new(Arc::new(JsonFileStore::new(config.store.path.clone())));

        Ok(Self::new(interpreter, resolver, index).with_options(SearchOptions::from(&config.search)))
    }

    /// Replace the default options used by [`SearchOrchestrator::search`]
    #[must_use]
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Run a search with the orchestrator's default options
    pub async fn search(&self, text: &str) -> Result<SearchResult> {
        self.search_with_options(text, self.options).await
    }

    /// Run a search with caller-supplied options
    #[instrument(skip(self, options), fields(strict = options.strict_geocoding))]
    pub async fn search_with_options(&self, text: &str, options: SearchOptions) -> Result<SearchResult> {
        enter(SearchStage::Received);
        let query = Query::new(text)?;

        enter(SearchStage::Interpreting);
        let interpretation = with_timeout(options.timeout, self.interpreter.interpret(&query), || {
            FoodMapError::interpretation(format!(
                "Interpreter did not answer within {:.1}s",
                options.timeout.as_secs_f64()
            ))
        })
        .await;
        let filter = match interpretation {
            Ok(filter) => filter,
            Err(e) => {
                enter(SearchStage::InterpretationFailed);
                return Err(e);
            }
        };

        enter(SearchStage::ResolvingAndSearching);
        let (resolved, matched) = tokio::join!(
            with_timeout(
                options.timeout,
                self.resolver.resolve(filter.location.as_deref()),
                || FoodMapError::geocoding(format!(
                    "Geocoder did not answer within {:.1}s",
                    options.timeout.as_secs_f64()
                )),
            ),
            with_timeout(options.timeout, self.index.query(&filter), || {
                FoodMapError::store_unavailable(format!(
                    "Store did not answer within {:.1}s",
                    options.timeout.as_secs_f64()
                ))
            }),
        );

        let items = match matched {
            Ok(items) => items,
            Err(e) => {
                enter(SearchStage::SearchFailed);
                return Err(e);
            }
        };

        let coordinates = match resolved {
            Ok(coordinates) => coordinates,
            Err(e) if options.strict_geocoding => {
                enter(SearchStage::SearchFailed);
                return Err(e);
            }
            Err(e) => {
                warn!("Continuing without coordinates: {}", e);
                None
            }
        };

        enter(SearchStage::Assembled);
        info!(
            "Search matched {} items (coordinates: {})",
            items.len(),
            coordinates
                .as_ref()
                .map_or_else(|| "none".to_string(), Coordinates::format_coordinates)
        );

        Ok(SearchResult {
            filter,
            coordinates,
            items,
        })
    }
}

/// Bound `future` by `limit`, reporting expiry with the caller's error kind
async fn with_timeout<T>(
    limit: Duration,
    future: impl Future<Output = Result<T>>,
    on_timeout: impl FnOnce() -> FoodMapError,
) -> Result<T> {
    tokio::time::timeout(limit, future)
        .await
        .unwrap_or_else(|_| Err(on_timeout()))
}
