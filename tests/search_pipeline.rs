//! End-to-end behaviour of the search pipeline with scripted providers

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rstest::rstest;

use foodmap::{
    Coordinates, FoodItem, FoodMapError, GeocodingCandidate, GeocodingProvider, InMemoryStore,
    LocationResolver, QueryInterpreter, ResourceIndex, ResourceStore, Result, SearchOptions,
    SearchOrchestrator, StructuredFilter, TextUnderstandingProvider,
};

const RABBITTOWN_REPLY: &str =
    r#"{"category": "non-perishable", "location": "Rabbittown", "targetAudience": null}"#;

enum Behaviour<T> {
    Answer(T),
    Fail,
    Hang,
}

struct ScriptedInterpreter {
    behaviour: Behaviour<&'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl TextUnderstandingProvider for ScriptedInterpreter {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _text: &str, _instruction: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Answer(reply) => Ok((*reply).to_string()),
            Behaviour::Fail => Err(FoodMapError::interpretation("connection refused")),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            }
        }
    }
}

struct ScriptedGeocoder {
    behaviour: Behaviour<Vec<GeocodingCandidate>>,
    calls: AtomicUsize,
}

#[async_trait]
impl GeocodingProvider for ScriptedGeocoder {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn geocode(&self, _place: &str) -> Result<Vec<GeocodingCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Answer(candidates) => Ok(candidates.clone()),
            Behaviour::Fail => Err(FoodMapError::geocoding("connection refused")),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
        }
    }
}

struct CountingStore {
    inner: Option<InMemoryStore>,
    calls: AtomicUsize,
}

#[async_trait]
impl ResourceStore for CountingStore {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn query(&self, filter: &StructuredFilter) -> Result<Vec<FoodItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.inner {
            Some(store) => store.query(filter).await,
            None => Err(FoodMapError::store_unavailable("connection refused")),
        }
    }
}

struct Harness {
    interpreter: Arc<ScriptedInterpreter>,
    geocoder: Arc<ScriptedGeocoder>,
    store: Arc<CountingStore>,
    orchestrator: SearchOrchestrator,
}

impl Harness {
    fn new(
        interpreter: Behaviour<&'static str>,
        geocoder: Behaviour<Vec<GeocodingCandidate>>,
        store: Option<InMemoryStore>,
    ) -> Self {
        let interpreter = Arc::new(ScriptedInterpreter {
            behaviour: interpreter,
            calls: AtomicUsize::new(0),
        });
        let geocoder = Arc::new(ScriptedGeocoder {
            behaviour: geocoder,
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(CountingStore {
            inner: store,
            calls: AtomicUsize::new(0),
        });

        let orchestrator = SearchOrchestrator::new(
            QueryInterpreter::new(interpreter.clone()),
            LocationResolver::new(geocoder.clone()),
            ResourceIndex::new(store.clone()),
        )
        .with_options(SearchOptions {
            timeout: Duration::from_millis(200),
            strict_geocoding: false,
        });

        Self {
            interpreter,
            geocoder,
            store,
            orchestrator,
        }
    }

    fn store_calls(&self) -> usize {
        self.store.calls.load(Ordering::SeqCst)
    }

    fn geocoder_calls(&self) -> usize {
        self.geocoder.calls.load(Ordering::SeqCst)
    }
}

fn item(id: &str, category: &str, location: &str, audience: &str) -> FoodItem {
    FoodItem {
        id: id.to_string(),
        category: category.to_string(),
        name: format!("Resource {id}"),
        target_audience: audience.to_string(),
        location: location.to_string(),
        coordinates: Coordinates::new(-52.70, 47.57).unwrap(),
    }
}

fn pantry() -> InMemoryStore {
    InMemoryStore::new(vec![
        item("1", "non-perishable", "Rabbittown", "families"),
        item("2", "produce", "Rabbittown", "seniors"),
        item("3", "Non-Perishable", "rabbittown", "students"),
        item("4", "non-perishable", "Downtown", "families"),
        item("5", "produce", "Downtown", "students"),
    ])
}

fn rabbittown() -> Vec<GeocodingCandidate> {
    vec![GeocodingCandidate {
        name: "Rabbittown, St. John's".to_string(),
        longitude: -52.70,
        latitude: 47.57,
    }]
}

fn ids(items: &[FoodItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

#[tokio::test]
async fn test_rabbittown_scenario() {
    let harness = Harness::new(
        Behaviour::Answer(RABBITTOWN_REPLY),
        Behaviour::Answer(rabbittown()),
        Some(pantry()),
    );

    let result = harness
        .orchestrator
        .search("non-perishable food near Rabbittown")
        .await
        .unwrap();

    assert_eq!(
        result.filter,
        StructuredFilter::new(Some("non-perishable".into()), Some("Rabbittown".into()), None)
    );
    assert_eq!(result.coordinates, Some(Coordinates::new(-52.70, 47.57).unwrap()));
    assert_eq!(ids(&result.items), vec!["1", "3"]);
    assert_eq!(harness.geocoder_calls(), 1);
    assert_eq!(harness.store_calls(), 1);
}

#[rstest]
#[case::timeout(Behaviour::Hang)]
#[case::unreachable(Behaviour::Fail)]
#[tokio::test]
async fn test_geocoder_failure_degrades(#[case] geocoder: Behaviour<Vec<GeocodingCandidate>>) {
    let harness = Harness::new(Behaviour::Answer(RABBITTOWN_REPLY), geocoder, Some(pantry()));

    let result = harness
        .orchestrator
        .search("non-perishable food near Rabbittown")
        .await
        .unwrap();

    assert_eq!(result.coordinates, None);
    assert_eq!(ids(&result.items), vec!["1", "3"]);
}

#[tokio::test]
async fn test_geocoder_failure_propagates_in_strict_mode() {
    let harness = Harness::new(
        Behaviour::Answer(RABBITTOWN_REPLY),
        Behaviour::Hang,
        Some(pantry()),
    );
    let options = SearchOptions {
        timeout: Duration::from_millis(100),
        strict_geocoding: true,
    };

    let err = harness
        .orchestrator
        .search_with_options("non-perishable food near Rabbittown", options)
        .await
        .unwrap_err();

    assert!(matches!(err, FoodMapError::Geocoding { .. }));
}

#[rstest]
#[case::strict(true)]
#[case::lenient(false)]
#[tokio::test]
async fn test_unknown_place_is_never_an_error(#[case] strict: bool) {
    let harness = Harness::new(
        Behaviour::Answer(r#"{"category": "produce", "location": "Atlantis"}"#),
        Behaviour::Answer(Vec::new()),
        Some(pantry()),
    );
    let options = SearchOptions {
        timeout: Duration::from_millis(200),
        strict_geocoding: strict,
    };

    let result = harness
        .orchestrator
        .search_with_options("produce in Atlantis", options)
        .await
        .unwrap();

    assert_eq!(result.coordinates, None);
    assert!(result.items.is_empty());
    assert_eq!(harness.geocoder_calls(), 1);
}

#[rstest]
#[case::prose(Behaviour::Answer("I think you want canned goods near Rabbittown."))]
#[case::wrong_shape(Behaviour::Answer(r#"{"category": ["produce"]}"#))]
#[case::unreachable(Behaviour::Fail)]
#[case::timeout(Behaviour::Hang)]
#[tokio::test]
async fn test_interpretation_failure_stops_pipeline(#[case] interpreter: Behaviour<&'static str>) {
    let harness = Harness::new(interpreter, Behaviour::Answer(rabbittown()), Some(pantry()));

    let err = harness
        .orchestrator
        .search("non-perishable food near Rabbittown")
        .await
        .unwrap_err();

    assert!(matches!(err, FoodMapError::Interpretation { .. }));
    assert_eq!(harness.interpreter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.store_calls(), 0);
    assert_eq!(harness.geocoder_calls(), 0);
}

#[tokio::test]
async fn test_store_failure_aborts_search() {
    let harness = Harness::new(
        Behaviour::Answer(RABBITTOWN_REPLY),
        Behaviour::Answer(rabbittown()),
        None,
    );

    let err = harness
        .orchestrator
        .search("non-perishable food near Rabbittown")
        .await
        .unwrap_err();

    assert!(matches!(err, FoodMapError::StoreUnavailable { .. }));
}

#[tokio::test]
async fn test_store_failure_wins_over_geocoding_failure_in_strict_mode() {
    let harness = Harness::new(Behaviour::Answer(RABBITTOWN_REPLY), Behaviour::Fail, None);
    let options = SearchOptions {
        timeout: Duration::from_millis(200),
        strict_geocoding: true,
    };

    let err = harness
        .orchestrator
        .search_with_options("non-perishable food near Rabbittown", options)
        .await
        .unwrap_err();

    assert!(matches!(err, FoodMapError::StoreUnavailable { .. }));
}

#[tokio::test]
async fn test_category_only_filter_ignores_other_attributes() {
    let harness = Harness::new(
        Behaviour::Answer(r#"{"category": "produce"}"#),
        Behaviour::Answer(rabbittown()),
        Some(pantry()),
    );

    let result = harness.orchestrator.search("any produce").await.unwrap();

    assert_eq!(ids(&result.items), vec!["2", "5"]);
    assert_eq!(result.coordinates, None);
    assert_eq!(harness.geocoder_calls(), 0);
}

#[tokio::test]
async fn test_search_is_idempotent() {
    let harness = Harness::new(
        Behaviour::Answer(RABBITTOWN_REPLY),
        Behaviour::Answer(rabbittown()),
        Some(pantry()),
    );

    let first = harness.orchestrator.search("non-perishable food near Rabbittown").await.unwrap();
    let second = harness.orchestrator.search("non-perishable food near Rabbittown").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_blank_query_rejected_before_any_call() {
    let harness = Harness::new(
        Behaviour::Answer(RABBITTOWN_REPLY),
        Behaviour::Answer(rabbittown()),
        Some(pantry()),
    );

    let err = harness.orchestrator.search("   ").await.unwrap_err();

    assert!(matches!(err, FoodMapError::Validation { .. }));
    assert_eq!(harness.interpreter.calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.store_calls(), 0);
}

#[tokio::test]
async fn test_resolution_and_store_query_run_concurrently() {
    struct SlowStore;

    #[async_trait]
    impl ResourceStore for SlowStore {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn query(&self, _filter: &StructuredFilter) -> Result<Vec<FoodItem>> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(Vec::new())
        }
    }

    struct SlowGeocoder;

    #[async_trait]
    impl GeocodingProvider for SlowGeocoder {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn geocode(&self, _place: &str) -> Result<Vec<GeocodingCandidate>> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(rabbittown())
        }
    }

    let interpreter = Arc::new(ScriptedInterpreter {
        behaviour: Behaviour::Answer(RABBITTOWN_REPLY),
        calls: AtomicUsize::new(0),
    });
    let orchestrator = SearchOrchestrator::new(
        QueryInterpreter::new(interpreter),
        LocationResolver::new(Arc::new(SlowGeocoder)),
        ResourceIndex::new(Arc::new(SlowStore)),
    )
    .with_options(SearchOptions {
        timeout: Duration::from_secs(1),
        strict_geocoding: true,
    });

    // Two 200ms calls: sequential execution would take at least 400ms
    let start = std::time::Instant::now();
    let result = orchestrator.search("food near Rabbittown").await.unwrap();
    let elapsed = start.elapsed();

    assert!(result.coordinates.is_some());
    assert!(elapsed < Duration::from_millis(380), "took {elapsed:?}");
}
