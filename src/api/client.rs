use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::RemoteSearch;
use super::types::SearchResponse;
use crate::config::ApiConfig;
use crate::error::{ApiError, Result, SiteError};

/// Remote search over HTTP: `GET {endpoint}?{query_param}={query}`.
#[derive(Clone)]
pub struct HttpSearchClient {
    client: Client,
    endpoint: String,
    query_param: String,
    auth_token: Option<String>,
    timeout: Duration,
}

impl HttpSearchClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim();
        if endpoint.is_empty() {
            return Err(SiteError::MissingConfig("api.endpoint".to_string()));
        }
        let url = Url::parse(endpoint)
            .map_err(|err| SiteError::Config(format!("invalid api.endpoint {endpoint}: {err}")))?;
        if url.scheme() == "http" && !is_loopback(&url) {
            tracing::warn!(
                endpoint,
                "Search endpoint uses unencrypted HTTP. Queries and tokens are sent in plain text."
            );
        }

        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sitesearch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| SiteError::Config(format!("search http client: {err}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            query_param: config.query_param.clone(),
            auth_token: config.auth_token.clone().filter(|token| !token.is_empty()),
            timeout,
        })
    }

    /// Full request URL for `query`.
    #[must_use]
    pub fn request_url(&self, query: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}{}={}",
            self.endpoint,
            self.query_param,
            urlencoding::encode(query)
        )
    }
}

impl fmt::Debug for HttpSearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSearchClient")
            .field("endpoint", &self.endpoint)
            .field("query_param", &self.query_param)
            .field("has_auth_token", &self.auth_token.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl RemoteSearch for HttpSearchClient {
    type Output = SearchResponse;

    async fn search(&self, query: &str) -> std::result::Result<SearchResponse, ApiError> {
        let mut request = self.client.get(self.request_url(query));
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| self.transport_error(&err))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(&err))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body).map_or_else(
                |_| String::from_utf8_lossy(&body).trim().to_string(),
                |parsed| parsed.message,
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

impl HttpSearchClient {
    fn transport_error(&self, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}
