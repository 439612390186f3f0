use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::geo::{GeoLocateClient, GeoSearchClient, LocateError, LocateFailure};
use crate::models::{Location, SearchResultSet};

/// Where the free-text search currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    /// Waiting out the debounce window.
    Pending,
    Searching,
    ResultsShown,
}

/// Coarse state shown next to the location field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Idle,
    Searching,
    Locating,
    Resolved,
    Error(LocateFailure),
}

pub struct SearchOutcome {
    pub seq: u64,
    pub results: SearchResultSet,
}

/// Owns the committed location and arbitrates between text search and
/// device geolocation. Only this type writes `committed`.
pub struct LocationResolver {
    search_client: GeoSearchClient,
    locate_client: GeoLocateClient,
    debounce: Duration,

    // Text search
    query: String,
    pending_since: Option<Instant>,
    search_state: SearchState,
    results: SearchResultSet,
    highlighted: usize,
    dropdown_open: bool,
    latest_seq: u64,
    search_task: Option<JoinHandle<()>>,
    search_tx: mpsc::Sender<SearchOutcome>,
    search_rx: mpsc::Receiver<SearchOutcome>,

    // Geolocation
    locating: bool,
    locate_error: Option<LocateFailure>,
    locate_task: Option<JoinHandle<()>>,
    locate_tx: mpsc::Sender<Result<Location, LocateFailure>>,
    locate_rx: mpsc::Receiver<Result<Location, LocateFailure>>,

    committed: Option<Location>,
}

impl LocationResolver {
    pub fn new(
        search_client: GeoSearchClient,
        locate_client: GeoLocateClient,
        debounce: Duration,
    ) -> Self {
        let (search_tx, search_rx) = mpsc::channel(4);
        let (locate_tx, locate_rx) = mpsc::channel(1);

        Self {
            search_client,
            locate_client,
            debounce,
            query: String::new(),
            pending_since: None,
            search_state: SearchState::Idle,
            results: SearchResultSet::empty(),
            highlighted: 0,
            dropdown_open: false,
            latest_seq: 0,
            search_task: None,
            search_tx,
            search_rx,
            locating: false,
            locate_error: None,
            locate_task: None,
            locate_tx,
            locate_rx,
            committed: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search_state(&self) -> SearchState {
        self.search_state
    }

    pub fn results(&self) -> &SearchResultSet {
        &self.results
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn is_dropdown_open(&self) -> bool {
        self.dropdown_open && !self.query.is_empty()
    }

    pub fn is_locating(&self) -> bool {
        self.locating
    }

    pub fn committed(&self) -> Option<&Location> {
        self.committed.as_ref()
    }

    /// True once any location has been committed. Failed attempts never
    /// clear it.
    pub fn is_committed(&self) -> bool {
        self.committed.is_some()
    }

    pub fn state(&self) -> ResolutionState {
        if self.locating {
            ResolutionState::Locating
        } else if matches!(self.search_state, SearchState::Pending | SearchState::Searching) {
            ResolutionState::Searching
        } else if let Some(err) = &self.locate_error {
            ResolutionState::Error(err.clone())
        } else if self.committed.is_some() {
            ResolutionState::Resolved
        } else {
            ResolutionState::Idle
        }
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        let mut query = std::mem::take(&mut self.query);
        query.push(c);
        self.set_query(query, now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        let mut query = std::mem::take(&mut self.query);
        query.pop();
        self.set_query(query, now);
    }

    /// Record new search text. Any search already issued for older text is
    /// invalidated; the new one fires once the input has been quiet for the
    /// debounce window.
    pub fn set_query(&mut self, query: String, now: Instant) {
        self.query = query;
        self.dropdown_open = true;
        self.invalidate_search();

        if self.query.trim().is_empty() {
            self.pending_since = None;
            self.results = SearchResultSet::empty();
            self.search_state = SearchState::Idle;
        } else {
            self.pending_since = Some(now);
            self.search_state = SearchState::Pending;
        }
    }

    /// Issue the pending search if the debounce window has elapsed.
    /// Returns true when a request was sent.
    pub fn poll_debounce(&mut self, now: Instant) -> bool {
        let Some(since) = self.pending_since else {
            return false;
        };
        if now.saturating_duration_since(since) < self.debounce {
            return false;
        }

        self.pending_since = None;
        self.latest_seq += 1;
        self.search_state = SearchState::Searching;

        let seq = self.latest_seq;
        let query = self.query.clone();
        let client = self.search_client.clone();
        let tx = self.search_tx.clone();

        tracing::debug!("Issuing search #{} for {:?}", seq, query);
        self.search_task = Some(tokio::spawn(async move {
            let results = client.search(&query).await;
            let _ = tx.send(SearchOutcome { seq, results }).await;
        }));
        true
    }

    /// Apply finished searches (non-blocking).
    pub fn poll_search(&mut self) {
        while let Ok(outcome) = self.search_rx.try_recv() {
            self.apply_search(outcome);
        }
    }

    pub fn apply_search(&mut self, outcome: SearchOutcome) {
        if outcome.seq != self.latest_seq || self.search_state != SearchState::Searching {
            tracing::debug!(
                "Discarding stale search #{} (latest #{})",
                outcome.seq,
                self.latest_seq
            );
            return;
        }

        self.search_task = None;
        self.results = outcome.results;
        self.highlighted = 0;
        self.search_state = if self.results.is_empty() {
            SearchState::Idle
        } else {
            SearchState::ResultsShown
        };
    }

    pub fn move_highlight(&mut self, delta: isize) {
        let len = self.results.len();
        if len == 0 || !self.is_dropdown_open() {
            return;
        }
        self.highlighted = self.highlighted.saturating_add_signed(delta).min(len - 1);
    }

    pub fn select_highlighted(&mut self) -> bool {
        self.select(self.highlighted)
    }

    /// Commit the result at `index`, clear the query and close the list.
    /// Only results currently shown in the dropdown can be committed.
    pub fn select(&mut self, index: usize) -> bool {
        if !self.is_dropdown_open() {
            return false;
        }
        let Some(location) = self.results.get(index).cloned() else {
            return false;
        };

        self.commit(location);
        self.query.clear();
        self.pending_since = None;
        self.invalidate_search();
        self.results = SearchResultSet::empty();
        self.highlighted = 0;
        self.dropdown_open = false;
        self.search_state = SearchState::Idle;
        true
    }

    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
    }

    /// Ask the device for its position. Ignored while a request is
    /// already running.
    pub fn locate(&mut self) -> bool {
        if self.locating {
            return false;
        }

        self.locating = true;
        self.locate_error = None;

        let client = self.locate_client.clone();
        let tx = self.locate_tx.clone();
        self.locate_task = Some(tokio::spawn(async move {
            let result = client.locate().await;
            let _ = tx.send(result).await;
        }));
        true
    }

    /// Apply a finished geolocation request (non-blocking). A task that ended
    /// without reporting is treated as an unknown device error.
    pub fn poll_locate(&mut self) {
        if let Ok(result) = self.locate_rx.try_recv() {
            self.apply_locate(result);
            return;
        }

        if self.locating && self.locate_task.as_ref().is_some_and(JoinHandle::is_finished) {
            let result = self.locate_rx.try_recv().unwrap_or_else(|_| {
                tracing::warn!("Geolocation task ended without a result");
                Err(LocateError::Unknown.into())
            });
            self.apply_locate(result);
        }
    }

    pub fn apply_locate(&mut self, result: Result<Location, LocateFailure>) {
        self.locating = false;
        self.locate_task = None;
        match result {
            Ok(location) => self.commit(location),
            Err(e) => {
                tracing::info!("Geolocation failed: {}", e);
                self.locate_error = Some(e);
            }
        }
    }

    fn commit(&mut self, location: Location) {
        tracing::info!("Location set to {}", location);
        self.committed = Some(location);
        self.locate_error = None;
    }

    fn invalidate_search(&mut self) {
        self.latest_seq += 1;
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
    }

    #[cfg(test)]
    async fn next_search_outcome(&mut self) -> Option<SearchOutcome> {
        self.search_rx.recv().await
    }

    #[cfg(test)]
    async fn next_locate_result(&mut self) -> Option<Result<Location, LocateFailure>> {
        self.locate_rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::geo::{
        Coordinates, FixedPosition, LocateError, PositionOptions, PositionProvider,
    };

    const DEBOUNCE: Duration = Duration::from_millis(500);

    struct Denied;

    #[async_trait]
    impl PositionProvider for Denied {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, LocateError> {
            Err(LocateError::PermissionDenied)
        }
    }

    struct Crashing;

    #[async_trait]
    impl PositionProvider for Crashing {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, LocateError> {
            panic!("position driver crashed");
        }
    }

    /// Drain background results the way the event loop does until `done`
    /// holds.
    async fn settle(resolver: &mut LocationResolver, done: impl Fn(&LocationResolver) -> bool) {
        for _ in 0..300 {
            resolver.poll_search();
            resolver.poll_locate();
            if done(resolver) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("resolver never settled");
    }

    fn resolver(server: &MockServer, provider: Arc<dyn PositionProvider>) -> LocationResolver {
        let search = GeoSearchClient::new(Client::new(), &server.uri()).unwrap();
        let locate = GeoLocateClient::new(Client::new(), &server.uri(), provider).unwrap();
        LocationResolver::new(search, locate, DEBOUNCE)
    }

    fn loc(city: &str, state: &str, country: &str) -> Location {
        Location {
            city: city.to_string(),
            state: state.to_string(),
            country: country.to_string(),
        }
    }

    fn places(cities: &[&str]) -> serde_json::Value {
        json!(cities
            .iter()
            .map(|c| json!({"address": {"city": c, "country": "United Kingdom"}}))
            .collect::<Vec<_>>())
    }

    async fn mount_search(server: &MockServer, q: &str, body: serde_json::Value, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", q))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn rapid_queries_issue_only_the_last_one() {
        let server = MockServer::start().await;
        mount_search(&server, "Lon", places(&["Long Eaton"]), 0).await;
        mount_search(&server, "Lond", places(&["London"]), 1).await;

        let mut resolver = resolver(&server, Arc::new(Denied));
        let t0 = Instant::now();

        resolver.set_query("Lon".to_string(), t0);
        assert!(!resolver.poll_debounce(t0 + Duration::from_millis(200)));

        resolver.push_char('d', t0 + Duration::from_millis(300));
        assert!(!resolver.poll_debounce(t0 + Duration::from_millis(600)));
        assert_eq!(resolver.search_state(), SearchState::Pending);

        assert!(resolver.poll_debounce(t0 + Duration::from_millis(800)));
        assert!(!resolver.poll_debounce(t0 + Duration::from_millis(900)));

        let outcome = resolver.next_search_outcome().await.unwrap();
        resolver.apply_search(outcome);

        assert_eq!(resolver.search_state(), SearchState::ResultsShown);
        assert_eq!(resolver.results().get(0).unwrap().city, "London");
    }

    #[tokio::test]
    async fn superseded_response_is_discarded() {
        let server = MockServer::start().await;
        mount_search(&server, "Par", places(&["Paradise"]), 1).await;

        let mut resolver = resolver(&server, Arc::new(Denied));
        let t0 = Instant::now();

        resolver.set_query("Par".to_string(), t0);
        assert!(resolver.poll_debounce(t0 + DEBOUNCE));
        let stale = resolver.next_search_outcome().await.unwrap();

        // More typing after the request went out.
        resolver.push_char('i', t0 + Duration::from_millis(700));
        resolver.apply_search(stale);

        assert!(resolver.results().is_empty());
        assert_eq!(resolver.search_state(), SearchState::Pending);
    }

    #[tokio::test]
    async fn clearing_the_query_never_contacts_the_geocoder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let mut resolver = resolver(&server, Arc::new(Denied));
        let t0 = Instant::now();

        resolver.push_char('L', t0);
        resolver.pop_char(t0 + Duration::from_millis(50));
        assert!(!resolver.poll_debounce(t0 + Duration::from_secs(2)));
        assert_eq!(resolver.search_state(), SearchState::Idle);
    }

    #[tokio::test]
    async fn selecting_a_result_commits_and_resets_the_search() {
        let server = MockServer::start().await;
        mount_search(&server, "Lond", places(&["London", "Londonderry"]), 1).await;

        let mut resolver = resolver(&server, Arc::new(Denied));
        let t0 = Instant::now();

        resolver.set_query("Lond".to_string(), t0);
        resolver.poll_debounce(t0 + DEBOUNCE);
        let outcome = resolver.next_search_outcome().await.unwrap();
        resolver.apply_search(outcome);
        assert!(resolver.is_dropdown_open());

        resolver.move_highlight(1);
        resolver.move_highlight(5);
        assert_eq!(resolver.highlighted(), 1);
        assert!(resolver.select_highlighted());

        assert_eq!(
            resolver.committed(),
            Some(&loc("Londonderry", "", "United Kingdom"))
        );
        assert!(resolver.query().is_empty());
        assert!(!resolver.is_dropdown_open());
        assert!(resolver.results().is_empty());
        assert_eq!(resolver.state(), ResolutionState::Resolved);
    }

    #[tokio::test]
    async fn denied_geolocation_keeps_previous_location() {
        let server = MockServer::start().await;
        let mut resolver = resolver(&server, Arc::new(Denied));

        resolver.commit(loc("London", "", "United Kingdom"));
        assert!(resolver.locate());
        assert!(!resolver.locate(), "second request ignored while locating");
        assert_eq!(resolver.state(), ResolutionState::Locating);

        let result = resolver.next_locate_result().await.unwrap();
        resolver.apply_locate(result);

        let ResolutionState::Error(err) = resolver.state() else {
            panic!("expected error state, got {:?}", resolver.state());
        };
        assert_eq!(err, LocateFailure::Position(LocateError::PermissionDenied));
        assert!(err.message().contains("denied"));
        assert_eq!(
            resolver.committed(),
            Some(&loc("London", "", "United Kingdom"))
        );
        assert!(resolver.is_committed());
        assert!(!resolver.is_locating());
    }

    #[tokio::test]
    async fn denied_geolocation_without_prior_location_commits_nothing() {
        let server = MockServer::start().await;
        let mut resolver = resolver(&server, Arc::new(Denied));

        resolver.locate();
        let result = resolver.next_locate_result().await.unwrap();
        resolver.apply_locate(result);

        assert!(!resolver.is_committed());
        assert!(matches!(resolver.state(), ResolutionState::Error(_)));
    }

    #[tokio::test]
    async fn successful_geolocation_overwrites_selection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": {"town": "Sintra", "country": "Portugal"}
            })))
            .mount(&server)
            .await;

        let provider = Arc::new(FixedPosition(Coordinates {
            latitude: 38.8,
            longitude: -9.38,
        }));
        let mut resolver = resolver(&server, provider);
        resolver.commit(loc("London", "", "United Kingdom"));

        resolver.locate();
        let result = resolver.next_locate_result().await.unwrap();
        resolver.apply_locate(result);

        assert_eq!(resolver.committed(), Some(&loc("Sintra", "", "Portugal")));
        assert_eq!(resolver.state(), ResolutionState::Resolved);
    }

    #[tokio::test]
    async fn polled_search_shows_results() {
        let server = MockServer::start().await;
        mount_search(&server, "Lond", places(&["London", "London"]), 1).await;

        let mut resolver = resolver(&server, Arc::new(Denied));
        let t0 = Instant::now();

        resolver.set_query("Lond".to_string(), t0);
        assert!(resolver.poll_debounce(t0 + DEBOUNCE));
        settle(&mut resolver, |r| r.search_state() == SearchState::ResultsShown).await;

        assert_eq!(resolver.results().len(), 1);
        assert_eq!(resolver.state(), ResolutionState::Idle);
    }

    #[tokio::test]
    async fn typing_during_a_search_aborts_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Lon"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(places(&["Long Eaton"]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        mount_search(&server, "Lond", places(&["London"]), 1).await;

        let mut resolver = resolver(&server, Arc::new(Denied));
        let t0 = Instant::now();

        resolver.set_query("Lon".to_string(), t0);
        assert!(resolver.poll_debounce(t0 + DEBOUNCE));
        resolver.push_char('d', t0 + Duration::from_millis(600));
        assert!(resolver.search_task.is_none());

        resolver.poll_search();
        assert_eq!(resolver.search_state(), SearchState::Pending);
        assert!(resolver.results().is_empty());

        assert!(resolver.poll_debounce(t0 + Duration::from_millis(1200)));
        settle(&mut resolver, |r| r.search_state() == SearchState::ResultsShown).await;

        assert_eq!(resolver.results().len(), 1);
        assert_eq!(resolver.results().get(0).unwrap().city, "London");
    }

    #[tokio::test]
    async fn closed_dropdown_results_cannot_be_committed() {
        let server = MockServer::start().await;
        mount_search(&server, "Lond", places(&["London", "Londonderry"]), 1).await;

        let mut resolver = resolver(&server, Arc::new(Denied));
        let t0 = Instant::now();

        resolver.set_query("Lond".to_string(), t0);
        resolver.poll_debounce(t0 + DEBOUNCE);
        settle(&mut resolver, |r| r.search_state() == SearchState::ResultsShown).await;

        resolver.close_dropdown();
        assert!(!resolver.is_dropdown_open());

        resolver.move_highlight(1);
        assert_eq!(resolver.highlighted(), 0);
        assert!(!resolver.select_highlighted());
        assert!(!resolver.select(1));
        assert!(!resolver.is_committed());
        assert_eq!(resolver.query(), "Lond");
    }

    #[tokio::test]
    async fn polled_geolocation_commits_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": {"city": "Porto", "state": "Porto", "country": "Portugal"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = Arc::new(FixedPosition(Coordinates {
            latitude: 41.15,
            longitude: -8.61,
        }));
        let mut resolver = resolver(&server, provider);

        assert!(resolver.locate());
        settle(&mut resolver, |r| !r.is_locating()).await;

        assert_eq!(resolver.committed(), Some(&loc("Porto", "Porto", "Portugal")));
        assert_eq!(resolver.state(), ResolutionState::Resolved);
    }

    #[tokio::test]
    async fn crashed_geolocation_task_does_not_stay_locating() {
        let server = MockServer::start().await;
        let mut resolver = resolver(&server, Arc::new(Crashing));

        assert!(resolver.locate());
        settle(&mut resolver, |r| !r.is_locating()).await;

        assert_eq!(
            resolver.state(),
            ResolutionState::Error(LocateFailure::Position(LocateError::Unknown))
        );
        assert!(!resolver.is_committed());
        assert!(resolver.locate(), "a new request can be made afterwards");
    }
}
