use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::*;
use crate::bounds::LatLng;
use crate::error::PlacesError;
use crate::types::{PlaceDetails, SearchPage};

const CENTER: LatLng = LatLng::new(35.108_5, -77.044_1);
const INSIDE: LatLng = LatLng::new(35.1, -77.05);
const OUTSIDE: LatLng = LatLng::new(35.262_7, -77.581_6);

#[derive(Debug, Clone, PartialEq)]
struct RecordedSearch {
    query: String,
    anchor: Option<LatLng>,
    page_token: Option<String>,
}

/// In-memory directory. Missing page tokens and missing place ids answer
/// with a provider error.
#[derive(Default)]
struct FakeProvider {
    bounds: Option<LocationBounds>,
    pages: HashMap<Option<String>, SearchPage>,
    details: HashMap<String, PlaceDetails>,
    geocode_calls: Mutex<usize>,
    searches: Mutex<Vec<RecordedSearch>>,
    detail_calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn newbern() -> Self {
        Self {
            bounds: Some(
                LocationBounds::new(
                    CENTER,
                    LatLng::new(35.05, -77.12),
                    LatLng::new(35.16, -76.98),
                )
                .unwrap(),
            ),
            ..Self::default()
        }
    }

    fn page(mut self, token: Option<&str>, candidates: Vec<Candidate>, next: Option<&str>) -> Self {
        self.pages.insert(
            token.map(str::to_owned),
            SearchPage {
                candidates,
                next_page_token: next.map(str::to_owned),
            },
        );
        self
    }

    fn place(mut self, id: &str, status: &str) -> Self {
        self.details.insert(
            id.to_owned(),
            PlaceDetails {
                name: Some(format!("Business {id}")),
                formatted_address: Some(format!("{id} Main St, Newbern, NC 28562")),
                formatted_phone_number: Some("(252) 555-0100".to_owned()),
                website: Some(format!("https://{id}.example")),
                business_status: Some(status.to_owned()),
            },
        );
        self
    }

    fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }

    fn searches(&self) -> Vec<RecordedSearch> {
        self.searches.lock().unwrap().clone()
    }
}

impl DirectoryProvider for FakeProvider {
    async fn geocode(&self, location: &str) -> Result<LocationBounds, PlacesError> {
        *self.geocode_calls.lock().unwrap() += 1;
        self.bounds
            .ok_or_else(|| PlacesError::LocationNotFound(location.to_owned()))
    }

    async fn search_page(&self, request: SearchRequest<'_>) -> Result<SearchPage, PlacesError> {
        self.searches.lock().unwrap().push(RecordedSearch {
            query: request.query.to_owned(),
            anchor: request.anchor,
            page_token: request.page_token.map(str::to_owned),
        });
        self.pages
            .get(&request.page_token.map(str::to_owned))
            .cloned()
            .ok_or_else(|| PlacesError::ApiStatus {
                endpoint: "place/textsearch",
                status: "INVALID_REQUEST".to_owned(),
                message: None,
            })
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        self.detail_calls.lock().unwrap().push(place_id.to_owned());
        self.details
            .get(place_id)
            .cloned()
            .ok_or_else(|| PlacesError::ApiStatus {
                endpoint: "place/details",
                status: "NOT_FOUND".to_owned(),
                message: None,
            })
    }
}

fn at(id: &str, location: LatLng) -> Candidate {
    Candidate {
        place_id: id.to_owned(),
        location,
        name: None,
    }
}

fn inside(id: &str) -> Candidate {
    at(id, INSIDE)
}

fn immediate() -> DiscoveryConfig {
    DiscoveryConfig {
        page_token_delay: Duration::ZERO,
        politeness_delay: Duration::ZERO,
        max_pages: DEFAULT_MAX_PAGES,
    }
}

fn names(run: &DiscoveryRun) -> Vec<&str> {
    run.leads.iter().map(|l| l.company_name.as_str()).collect()
}

#[tokio::test]
async fn mixed_page_yields_only_unique_in_bounds_operational_leads() {
    let provider = FakeProvider::newbern()
        .page(
            None,
            vec![
                inside("a"),
                inside("b"),
                inside("a"),
                at("far", OUTSIDE),
                inside("closed"),
                inside("c"),
                inside("d"),
            ],
            None,
        )
        .place("a", "OPERATIONAL")
        .place("b", "OPERATIONAL")
        .place("c", "OPERATIONAL")
        .place("d", "OPERATIONAL")
        .place("far", "OPERATIONAL")
        .place("closed", "CLOSED_PERMANENTLY");

    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Newbern, NC", 5).await;

    assert_eq!(
        names(&run),
        vec!["Business a", "Business b", "Business c", "Business d"]
    );
    assert!(run.leads.iter().all(|l| l.business_type == "dentist"));
    assert_eq!(run.stop_reason, StopReason::Exhausted);
    assert!(run.is_complete());
    assert_eq!(run.stats.duplicates_skipped, 1);
    assert_eq!(run.stats.out_of_bounds, 1);
    assert_eq!(run.stats.not_operational, 1);
    assert_eq!(run.stats.candidates_seen, 7);
}

#[tokio::test]
async fn no_detail_lookup_for_duplicates_or_out_of_bounds() {
    let provider = FakeProvider::newbern()
        .page(
            None,
            vec![inside("a"), inside("a"), at("far", OUTSIDE), inside("b")],
            None,
        )
        .place("a", "OPERATIONAL")
        .place("b", "OPERATIONAL");

    let discoverer = Discoverer::new(provider, immediate());
    discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert_eq!(discoverer.provider().detail_calls(), vec!["a", "b"]);
}

#[tokio::test]
async fn search_uses_category_query_anchored_at_center() {
    let provider = FakeProvider::newbern().page(None, vec![], None);
    let discoverer = Discoverer::new(provider, immediate());
    discoverer.discover("dentist", "Newbern, NC", 10).await;

    let searches = discoverer.provider().searches();
    assert_eq!(
        searches,
        vec![RecordedSearch {
            query: "dentist in Newbern, NC".to_owned(),
            anchor: Some(CENTER),
            page_token: None,
        }]
    );
}

#[tokio::test]
async fn stops_at_max_results_without_extra_lookups() {
    let candidates = (0..10).map(|i| inside(&format!("p{i}"))).collect();
    let mut provider = FakeProvider::newbern().page(None, candidates, Some("next"));
    for i in 0..10 {
        provider = provider.place(&format!("p{i}"), "OPERATIONAL");
    }

    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Newbern, NC", 3).await;

    assert_eq!(run.leads.len(), 3);
    assert_eq!(run.stop_reason, StopReason::MaxResults);
    assert_eq!(discoverer.provider().detail_calls().len(), 3);
    assert_eq!(
        discoverer.provider().searches().len(),
        1,
        "a full result set must not turn the page"
    );
}

#[tokio::test]
async fn follows_continuation_tokens_across_pages() {
    let provider = FakeProvider::newbern()
        .page(None, vec![inside("a"), inside("b")], Some("t1"))
        .page(Some("t1"), vec![inside("b"), inside("c")], None)
        .place("a", "OPERATIONAL")
        .place("b", "OPERATIONAL")
        .place("c", "OPERATIONAL");

    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert_eq!(names(&run), vec!["Business a", "Business b", "Business c"]);
    assert_eq!(run.stats.pages_fetched, 2);
    assert_eq!(run.stats.duplicates_skipped, 1, "seen set spans pages");
    let tokens: Vec<Option<String>> = discoverer
        .provider()
        .searches()
        .into_iter()
        .map(|s| s.page_token)
        .collect();
    assert_eq!(tokens, vec![None, Some("t1".to_owned())]);
}

#[tokio::test]
async fn location_not_found_returns_empty_without_searching() {
    let provider = FakeProvider::default();
    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Nowhere, ZZ", 10).await;

    assert!(run.leads.is_empty());
    assert!(run.bounds.is_none());
    assert!(matches!(
        run.stop_reason,
        StopReason::LocationNotFound { ref location, .. } if location == "Nowhere, ZZ"
    ));
    assert!(!run.is_complete());
    assert!(discoverer.provider().searches().is_empty());
}

#[tokio::test]
async fn search_failure_keeps_partial_results() {
    // Page "t1" is not registered, so the second search fails.
    let provider = FakeProvider::newbern()
        .page(None, vec![inside("a"), inside("b")], Some("t1"))
        .place("a", "OPERATIONAL")
        .place("b", "OPERATIONAL");

    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert_eq!(names(&run), vec!["Business a", "Business b"]);
    assert!(matches!(
        run.stop_reason,
        StopReason::SearchFailed { page: 2, .. }
    ));
}

#[tokio::test]
async fn first_page_failure_returns_empty() {
    let provider = FakeProvider::newbern();
    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert!(run.leads.is_empty());
    assert!(matches!(
        run.stop_reason,
        StopReason::SearchFailed { page: 1, .. }
    ));
}

#[tokio::test]
async fn details_failure_skips_only_that_candidate() {
    let provider = FakeProvider::newbern()
        .page(None, vec![inside("a"), inside("ghost"), inside("c")], None)
        .place("a", "OPERATIONAL")
        .place("c", "OPERATIONAL");

    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert_eq!(names(&run), vec!["Business a", "Business c"]);
    assert_eq!(run.stats.detail_failures, 1);
    assert_eq!(
        discoverer.provider().detail_calls(),
        vec!["a", "ghost", "c"],
        "failed lookups are not retried"
    );
}

#[tokio::test]
async fn missing_contact_fields_are_absent_not_empty() {
    let mut provider = FakeProvider::newbern().page(None, vec![inside("bare")], None);
    provider.details.insert(
        "bare".to_owned(),
        PlaceDetails {
            name: Some("Bare Bones Dental".to_owned()),
            formatted_address: Some("9 Oak St, Newbern, NC".to_owned()),
            formatted_phone_number: None,
            website: Some(String::new()),
            business_status: Some("OPERATIONAL".to_owned()),
        },
    );

    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Newbern, NC", 10).await;

    let lead = &run.leads[0];
    assert!(lead.phone.is_none());
    assert!(lead.website.is_none());
}

#[tokio::test]
async fn repeated_token_ends_the_run() {
    let provider = FakeProvider::newbern()
        .page(None, vec![inside("a")], Some("t1"))
        .page(Some("t1"), vec![inside("b")], Some("t1"))
        .place("a", "OPERATIONAL")
        .place("b", "OPERATIONAL");

    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert_eq!(run.leads.len(), 2);
    assert_eq!(run.stop_reason, StopReason::StalledToken);
    assert_eq!(discoverer.provider().searches().len(), 2);
}

#[tokio::test]
async fn page_limit_bounds_runaway_pagination() {
    let provider = FakeProvider::newbern()
        .page(None, vec![], Some("t1"))
        .page(Some("t1"), vec![], Some("t2"))
        .page(Some("t2"), vec![], Some("t3"));

    let config = DiscoveryConfig {
        max_pages: 2,
        ..immediate()
    };
    let discoverer = Discoverer::new(provider, config);
    let run = discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert_eq!(run.stop_reason, StopReason::PageLimit { max_pages: 2 });
    assert_eq!(discoverer.provider().searches().len(), 2);
}

#[tokio::test]
async fn zero_max_results_makes_no_provider_calls() {
    let provider = FakeProvider::newbern().page(None, vec![inside("a")], None);
    let discoverer = Discoverer::new(provider, immediate());
    let run = discoverer.discover("dentist", "Newbern, NC", 0).await;

    assert!(run.leads.is_empty());
    assert_eq!(run.stop_reason, StopReason::MaxResults);
    assert_eq!(*discoverer.provider().geocode_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn cancelled_before_start_makes_no_provider_calls() {
    let provider = FakeProvider::newbern().page(None, vec![inside("a")], None);
    let discoverer = Discoverer::new(provider, immediate());
    let cancel = AtomicBool::new(true);
    let run = discoverer
        .discover_with_cancel("dentist", "Newbern, NC", 10, &cancel)
        .await;

    assert_eq!(run.stop_reason, StopReason::Cancelled);
    assert_eq!(*discoverer.provider().geocode_calls.lock().unwrap(), 0);
}

/// Raises the cancel flag the first time a details lookup is made.
struct CancelOnFirstDetail {
    inner: FakeProvider,
    cancel: Arc<AtomicBool>,
}

impl DirectoryProvider for CancelOnFirstDetail {
    async fn geocode(&self, location: &str) -> Result<LocationBounds, PlacesError> {
        self.inner.geocode(location).await
    }

    async fn search_page(&self, request: SearchRequest<'_>) -> Result<SearchPage, PlacesError> {
        self.inner.search_page(request).await
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        self.cancel.store(true, Ordering::Relaxed);
        self.inner.place_details(place_id).await
    }
}

#[tokio::test]
async fn cancel_mid_run_keeps_partial_leads_and_stops_paging() {
    let cancel = Arc::new(AtomicBool::new(false));
    let provider = CancelOnFirstDetail {
        inner: FakeProvider::newbern()
            .page(None, vec![inside("a"), inside("b")], Some("t1"))
            .page(Some("t1"), vec![inside("c")], None)
            .place("a", "OPERATIONAL")
            .place("b", "OPERATIONAL")
            .place("c", "OPERATIONAL"),
        cancel: Arc::clone(&cancel),
    };
    let discoverer = Discoverer::new(provider, immediate());

    let run = discoverer
        .discover_with_cancel("dentist", "Newbern, NC", 10, &cancel)
        .await;

    assert_eq!(run.stop_reason, StopReason::Cancelled);
    assert_eq!(names(&run), vec!["Business a"]);
    assert!(!run.is_complete());
    let inner = &discoverer.provider().inner;
    assert_eq!(inner.detail_calls(), vec!["a"]);
    assert_eq!(inner.searches().len(), 1, "next page must not be fetched");
}

#[tokio::test]
async fn separate_runs_do_not_share_seen_identities() {
    let provider = FakeProvider::newbern()
        .page(None, vec![inside("a")], None)
        .place("a", "OPERATIONAL");
    let discoverer = Discoverer::new(provider, immediate());

    let first = discoverer.discover("dentist", "Newbern, NC", 10).await;
    let second = discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert_eq!(first.leads.len(), 1);
    assert_eq!(second.leads.len(), 1);
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn waits_before_using_a_continuation_token() {
    let provider = FakeProvider::newbern()
        .page(None, vec![], Some("t1"))
        .page(Some("t1"), vec![], None);
    let config = DiscoveryConfig {
        page_token_delay: Duration::from_millis(40),
        ..immediate()
    };
    let discoverer = Discoverer::new(provider, config);

    let started = Instant::now();
    let run = discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert_eq!(run.stop_reason, StopReason::Exhausted);
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn pauses_after_every_detail_lookup_including_failures() {
    let provider = FakeProvider::newbern()
        .page(None, vec![inside("a"), inside("ghost")], None)
        .place("a", "OPERATIONAL");
    let config = DiscoveryConfig {
        politeness_delay: Duration::from_millis(25),
        ..immediate()
    };
    let discoverer = Discoverer::new(provider, config);

    let started = Instant::now();
    let run = discoverer.discover("dentist", "Newbern, NC", 10).await;

    assert_eq!(run.leads.len(), 1);
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn config_from_app_config_uses_millisecond_delays() {
    let app = AppConfig {
        env: leadgen_core::Environment::Test,
        log_level: "info".to_owned(),
        places_api_key: None,
        places_base_url: String::new(),
        request_timeout_secs: 5,
        user_agent: String::new(),
        politeness_delay_ms: 750,
        page_token_delay_ms: 2500,
        max_results: 10,
        max_retries: 0,
        retry_backoff_base_ms: 0,
    };
    let config = DiscoveryConfig::from_app_config(&app);
    assert_eq!(config.politeness_delay, Duration::from_millis(750));
    assert_eq!(config.page_token_delay, Duration::from_millis(2500));
    assert_eq!(config.max_pages, DEFAULT_MAX_PAGES);
}
