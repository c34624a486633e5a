//! Debounced, cancellable city search.
//!
//! Every keystroke feeds [`CitySearchService::on_query_changed`]; a
//! generation counter makes sure only the newest query's results are ever
//! published. Stale work notices the counter has moved on and drops its
//! output instead of racing the newer query.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::client::OpenMeteoClient;
use crate::translit;
use crate::types::PlaceMatch;

/// Delay between the last keystroke and the geocoding request.
const DEBOUNCE: Duration = Duration::from_millis(500);
/// Queries shorter than this clear the results without touching the network.
const MIN_QUERY_CHARS: usize = 2;

pub struct CitySearchService {
    client: Arc<OpenMeteoClient>,
    results_tx: Arc<watch::Sender<Vec<PlaceMatch>>>,
    generation: Arc<AtomicU64>,
    debounce: Duration,
}

impl CitySearchService {
    pub fn new(client: Arc<OpenMeteoClient>) -> Self {
        Self::with_debounce(client, DEBOUNCE)
    }

    /// Service with a custom debounce window (shortened in tests).
    pub fn with_debounce(client: Arc<OpenMeteoClient>, debounce: Duration) -> Self {
        let (results_tx, _) = watch::channel(Vec::new());
        Self {
            client,
            results_tx: Arc::new(results_tx),
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    /// Latest published result list.
    pub fn results(&self) -> watch::Receiver<Vec<PlaceMatch>> {
        self.results_tx.subscribe()
    }

    /// Feed the current query text. Must be called from within a tokio
    /// runtime; the debounce timer and the request run on a spawned task.
    pub fn on_query_changed(&self, query: &str) {
        // Every call supersedes whatever was pending; older tasks see the
        // bumped counter and drop their work.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if query.chars().count() < MIN_QUERY_CHARS {
            self.results_tx.send_replace(Vec::new());
            return;
        }

        let client = Arc::clone(&self.client);
        let results_tx = Arc::clone(&self.results_tx);
        let current = Arc::clone(&self.generation);
        let debounce = self.debounce;
        let query = query.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                // A newer query arrived while we were waiting; never hit
                // the network for this one.
                return;
            }

            let latin = translit::to_latin(&query);
            let results = match client.search_places(&latin).await {
                Ok(results) => results,
                Err(e) => {
                    // Search is best-effort: failures read as "no matches".
                    debug!("City search for {:?} failed: {}", latin, e);
                    Vec::new()
                }
            };

            if current.load(Ordering::SeqCst) != generation {
                return; // stale: a newer query owns the results cell now
            }
            results_tx.send_replace(results);
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_DEBOUNCE: Duration = Duration::from_millis(40);
    const PUBLISH_TIMEOUT: Duration = Duration::from_secs(3);

    fn service_for(server: &MockServer) -> CitySearchService {
        let client =
            Arc::new(OpenMeteoClient::with_base_urls(&server.uri(), &server.uri()).unwrap());
        CitySearchService::with_debounce(client, TEST_DEBOUNCE)
    }

    fn berlin_body() -> serde_json::Value {
        serde_json::json!({
            "results": [
                {"name": "Berlin", "latitude": 52.52, "longitude": 13.41,
                 "country": "Germany", "admin1": "Berlin"}
            ]
        })
    }

    async fn next_publish(rx: &mut watch::Receiver<Vec<PlaceMatch>>) -> Vec<PlaceMatch> {
        tokio::time::timeout(PUBLISH_TIMEOUT, rx.changed())
            .await
            .unwrap()
            .unwrap();
        rx.borrow_and_update().clone()
    }

    #[tokio::test]
    async fn test_short_query_publishes_empty_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(berlin_body()))
            .expect(0)
            .mount(&server)
            .await;

        let service = service_for(&server);
        let mut rx = service.results();

        service.on_query_changed("a");
        let results = next_publish(&mut rx).await;
        assert!(results.is_empty());

        // Give any stray task a chance to fire before expectations verify.
        tokio::time::sleep(TEST_DEBOUNCE * 3).await;
    }

    #[tokio::test]
    async fn test_rapid_queries_issue_one_call_for_the_newest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "ber"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"name": "Bern", "latitude": 46.95, "longitude": 7.45,
                             "country": "Switzerland"}]
            })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "berlin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(berlin_body()))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server);
        let mut rx = service.results();

        // Both calls land inside one debounce window.
        service.on_query_changed("ber");
        service.on_query_changed("berlin");

        let results = next_publish(&mut rx).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Berlin");

        tokio::time::sleep(TEST_DEBOUNCE * 3).await;
    }

    #[tokio::test]
    async fn test_query_is_transliterated_before_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "ivanichi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"name": "Ivanychi", "latitude": 50.6, "longitude": 24.37,
                             "country": "Ukraine"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server);
        let mut rx = service.results();

        service.on_query_changed("Иваничи");
        let results = next_publish(&mut rx).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Ivanychi");
    }

    #[tokio::test]
    async fn test_remote_failure_publishes_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = service_for(&server);
        let mut rx = service.results();

        service.on_query_changed("berlin");
        let results = next_publish(&mut rx).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_short_query_cancels_pending_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(berlin_body()))
            .expect(0)
            .mount(&server)
            .await;

        let service = service_for(&server);
        let mut rx = service.results();

        // The pending "berlin" search is superseded before its debounce
        // expires, so no request is ever issued.
        service.on_query_changed("berlin");
        service.on_query_changed("b");

        let results = next_publish(&mut rx).await;
        assert!(results.is_empty());

        tokio::time::sleep(TEST_DEBOUNCE * 3).await;
    }
}
