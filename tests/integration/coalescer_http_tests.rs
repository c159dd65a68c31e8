//! Request coalescing over a real HTTP round trip.

use std::time::Duration;

use httpmock::prelude::*;

use sitesearch::api::HttpSearchClient;
use sitesearch::coalescer::{CoalescerConfig, RequestCoalescer};
use sitesearch::config::ApiConfig;
use sitesearch::panel::{RowLabels, rows_from_response};
use sitesearch::test_utils::fixtures;

use super::common::{SEARCH_PATH, mock_keyword};

fn coalescer(server: &MockServer, min_interval: Duration) -> RequestCoalescer<HttpSearchClient> {
    let client = HttpSearchClient::from_config(&ApiConfig {
        endpoint: server.url(SEARCH_PATH),
        ..ApiConfig::default()
    })
    .unwrap();
    RequestCoalescer::new(
        client,
        CoalescerConfig {
            min_interval,
            idle_clear: Duration::from_secs(30),
            ..CoalescerConfig::default()
        },
    )
}

#[tokio::test]
async fn test_typing_burst_hits_endpoint_twice() {
    let server = MockServer::start_async().await;
    let first = mock_keyword(&server, "r", fixtures::empty_response_json()).await;
    let middle = mock_keyword(&server, "ru", fixtures::empty_response_json()).await;
    let middle_too = mock_keyword(&server, "rus", fixtures::empty_response_json()).await;
    let last = mock_keyword(&server, "rust", fixtures::mixed_response_json()).await;

    let coalescer = coalescer(&server, Duration::from_millis(500));
    let (r, ru, rus, rust) = tokio::join!(
        coalescer.submit("r"),
        coalescer.submit("ru"),
        coalescer.submit("rus"),
        coalescer.submit("rust"),
    );

    first.assert_hits_async(1).await;
    middle.assert_hits_async(0).await;
    middle_too.assert_hits_async(0).await;
    last.assert_hits_async(1).await;
    assert_eq!(coalescer.dispatched(), 2);

    assert_eq!(r.unwrap().unwrap().query, "r");
    for reply in [ru, rus, rust] {
        let record = reply.unwrap().unwrap();
        assert_eq!(record.query, "rust");
        let rows = rows_from_response(record.value().unwrap(), &RowLabels::default()).unwrap();
        assert_eq!(rows.len(), 3);
    }
}

#[tokio::test]
async fn test_failed_call_reports_error_to_its_caller() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(SEARCH_PATH);
            then.status(500).body("boom");
        })
        .await;

    let coalescer = coalescer(&server, Duration::ZERO);
    let err = coalescer.submit("rust").await.unwrap_err();
    assert!(err.to_string().contains("500"));
    // the failed record stays unresolved
    assert_eq!(coalescer.tracked(), 1);
    assert!(!coalescer.snapshot()[0].is_resolved());
}

#[tokio::test]
async fn test_empty_query_never_reaches_endpoint() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.method(GET).path(SEARCH_PATH);
            then.status(200).json_body(fixtures::empty_response_json());
        })
        .await;

    let coalescer = coalescer(&server, Duration::ZERO);
    assert!(coalescer.submit("").await.unwrap().is_none());
    any.assert_hits_async(0).await;
    assert_eq!(coalescer.dispatched(), 0);
}
