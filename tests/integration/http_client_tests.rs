//! HTTP search client against httpmock.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use sitesearch::api::{HttpSearchClient, RemoteSearch, SearchHit};
use sitesearch::config::ApiConfig;
use sitesearch::error::{ApiError, ErrorCode};
use sitesearch::test_utils::fixtures;

use super::common::{SEARCH_PATH, mock_keyword};

fn client_for(server: &MockServer) -> HttpSearchClient {
    client_with(ApiConfig {
        endpoint: server.url(SEARCH_PATH),
        ..ApiConfig::default()
    })
}

fn client_with(config: ApiConfig) -> HttpSearchClient {
    HttpSearchClient::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_search_decodes_mixed_hits() {
    let server = MockServer::start_async().await;
    let mock = mock_keyword(&server, "rust", fixtures::mixed_response_json()).await;

    let response = client_for(&server).search("rust").await.unwrap();
    mock.assert_async().await;

    let hits = response.hits();
    assert_eq!(hits.len(), 4);
    assert!(matches!(hits[0], SearchHit::Post(ref post) if post.category.slug == "programming"));
    assert!(matches!(hits[1], SearchHit::Note(ref note) if note.nid == 118));
    assert!(matches!(hits[3], SearchHit::Unknown));
    assert_eq!(response.pagination.unwrap().total_page, 1);
}

#[tokio::test]
async fn test_search_without_data_field() {
    let server = MockServer::start_async().await;
    mock_keyword(&server, "zzz", fixtures::dataless_response_json()).await;

    let response = client_for(&server).search("zzz").await.unwrap();
    assert!(response.data.is_none());
    assert!(response.hits().is_empty());
}

#[tokio::test]
async fn test_query_is_url_encoded() {
    let server = MockServer::start_async().await;
    let mock = mock_keyword(&server, "rust & 日记", fixtures::empty_response_json()).await;

    client_for(&server).search("rust & 日记").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_custom_query_param() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(SEARCH_PATH).query_param("q", "rust");
            then.status(200).json_body(fixtures::empty_response_json());
        })
        .await;

    let client = client_with(ApiConfig {
        endpoint: server.url(SEARCH_PATH),
        query_param: "q".to_string(),
        ..ApiConfig::default()
    });
    client.search("rust").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(SEARCH_PATH)
                .header("authorization", "Bearer s3cret");
            then.status(200).json_body(fixtures::empty_response_json());
        })
        .await;

    let client = client_with(ApiConfig {
        endpoint: server.url(SEARCH_PATH),
        auth_token: Some("s3cret".to_string()),
        ..ApiConfig::default()
    });
    client.search("rust").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_status_error_uses_message_field() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(SEARCH_PATH);
            then.status(422).json_body(json!({ "message": "keyword too short" }));
        })
        .await;

    let err = client_for(&server).search("r").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 422,
            message: "keyword too short".to_string()
        }
    );
    assert_eq!(err.code(), ErrorCode::SearchRejected);
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(SEARCH_PATH);
            then.status(401).body("unauthorized");
        })
        .await;

    let err = client_for(&server).search("rust").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, ref message } if message == "unauthorized"));
    assert_eq!(err.code(), ErrorCode::NetworkAuthFailed);
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(SEARCH_PATH);
            then.status(200).body("<html>not json</html>");
        })
        .await;

    let err = client_for(&server).search("rust").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(SEARCH_PATH);
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(fixtures::empty_response_json());
        })
        .await;

    let client = client_with(ApiConfig {
        endpoint: server.url(SEARCH_PATH),
        timeout_secs: 1,
        ..ApiConfig::default()
    });
    let err = client.search("rust").await.unwrap_err();
    assert_eq!(err, ApiError::Timeout(Duration::from_secs(1)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let client = client_with(ApiConfig {
        endpoint: "http://127.0.0.1:9/api/search".to_string(),
        ..ApiConfig::default()
    });
    let err = client.search("rust").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.code(), ErrorCode::NetworkUnreachable);
}
