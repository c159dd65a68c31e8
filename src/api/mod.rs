//! Remote search seam.
//!
//! The coalescer never talks HTTP itself; it is handed a [`RemoteSearch`]
//! implementation. [`HttpSearchClient`] is the production one, tests inject
//! scripted fakes.

mod client;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;

pub use client::HttpSearchClient;
pub use types::{Category, NoteHit, PageHit, Pagination, PostHit, SearchHit, SearchResponse};

/// A single asynchronous search call against the remote endpoint.
#[async_trait]
pub trait RemoteSearch: Send + Sync + 'static {
    /// Decoded payload of a successful call.
    type Output: Send + Sync + 'static;

    async fn search(&self, query: &str) -> Result<Self::Output, ApiError>;
}

#[async_trait]
impl<T: RemoteSearch + ?Sized> RemoteSearch for Arc<T> {
    type Output = T::Output;

    async fn search(&self, query: &str) -> Result<Self::Output, ApiError> {
        (**self).search(query).await
    }
}
