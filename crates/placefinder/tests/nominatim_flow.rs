//! End-to-end tests: engine + Nominatim client against a mock provider.
//!
//! These run on the real clock (network I/O does not mix with a paused one),
//! so the engine is configured with short delays.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use placefinder::{
    EngineConfig, GeocoderConfig, LocationSearch, NominatimClient, Phase, SearchFailure,
    SelectionResult, Update,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn fast_engine() -> EngineConfig {
    EngineConfig::builder()
        .quiet_period(Duration::from_millis(20))
        .blur_grace(Duration::from_millis(20))
        .build()
        .expect("valid engine config")
}

fn engine_for(
    server: &MockServer,
) -> (
    LocationSearch<NominatimClient>,
    Arc<Mutex<Vec<SelectionResult>>>,
    Arc<Mutex<Vec<SearchFailure>>>,
) {
    let config = GeocoderConfig::builder()
        .endpoint(format!("{}/search", server.uri()))
        .user_agent("placefinder-tests/1.0")
        .timeout(Duration::from_secs(2))
        .build()
        .expect("valid geocoder config");

    let selections = Arc::new(Mutex::new(Vec::new()));
    let failures = Arc::new(Mutex::new(Vec::new()));
    let selection_sink = Arc::clone(&selections);
    let failure_sink = Arc::clone(&failures);

    let search = LocationSearch::builder_nominatim(config)
        .expect("client builds")
        .config(fast_engine())
        .on_location_select(move |place| selection_sink.lock().unwrap().push(place))
        .on_search_failure(move |failure| failure_sink.lock().unwrap().push(failure))
        .build();
    (search, selections, failures)
}

#[tokio::test]
async fn test_lond_scenario_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Lond"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"place_id": 2, "display_name": "London, Ontario, Canada", "lat": "42.9", "lon": "-81.2", "importance": 0.4},
            {"place_id": 1, "display_name": "London, UK", "lat": "51.5", "lon": "-0.1", "importance": 0.9},
            {"place_id": 3, "display_name": "Nowhere", "lon": "0.0", "importance": 1.0}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (mut search, selections, failures) = engine_for(&server);

    for text in ["L", "Lo", "Lon", "Lond"] {
        search.text_changed(text);
    }
    let updates = search.settle().await;
    assert!(matches!(
        updates.last(),
        Some(Update::ResultsApplied { count: 2, .. })
    ));

    let names: Vec<&str> = search
        .candidates()
        .iter()
        .map(|c| c.full_name.as_str())
        .collect();
    assert_eq!(names, vec!["London, UK", "London, Ontario, Canada"]);
    assert_eq!(search.phase(), Phase::ShowingResults);

    let committed = search.select(0).expect("candidate exists");
    assert_eq!(
        committed,
        SelectionResult {
            name: "London, UK".to_string(),
            latitude: 51.5,
            longitude: -0.1,
        }
    );
    assert_eq!(search.query(), "London, UK");
    assert!(!search.is_panel_visible());
    assert_eq!(selections.lock().unwrap().len(), 1);
    assert!(failures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failures_are_classified_end_to_end() {
    for (status, expected) in [
        (429, SearchFailure::RateLimited),
        (500, SearchFailure::Unknown),
        (404, SearchFailure::Unknown),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let (mut search, _, failures) = engine_for(&server);
        search.text_changed("Tokyo");
        let updates = search.settle().await;

        assert!(matches!(
            updates.last(),
            Some(Update::SearchFailed { failure, .. }) if *failure == expected
        ));
        assert!(search.candidates().is_empty());
        assert!(!search.is_panel_visible());
        assert_eq!(search.phase(), Phase::Idle);
        assert_eq!(*failures.lock().unwrap(), vec![expected]);
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_network_failure() {
    let server = MockServer::start().await;
    let (mut search, _, failures) = engine_for(&server);
    drop(server);

    search.text_changed("Tokyo");
    search.settle().await;

    assert_eq!(*failures.lock().unwrap(), vec![SearchFailure::Network]);
    assert!(search.candidates().is_empty());
}
