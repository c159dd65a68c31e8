//! Shared test utilities for sitesearch.

pub mod fixtures;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::RemoteSearch;
use crate::error::ApiError;

/// In-process search backend with scripted latency and failures.
///
/// Answers `"results for {query}"` after the configured delay, or fails with
/// [`ApiError::Network`] for queries registered through [`ScriptedSearch::fail_on`].
/// Every call is recorded, so tests can assert exactly what reached the backend.
#[derive(Debug, Default)]
pub struct ScriptedSearch {
    default_delay: Duration,
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    #[must_use]
    pub fn new(default_delay: Duration) -> Self {
        Self {
            default_delay,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    #[must_use]
    pub fn fail_on(mut self, query: &str) -> Self {
        self.failures.insert(query.to_string());
        self
    }

    /// Queries received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl RemoteSearch for ScriptedSearch {
    type Output = String;

    async fn search(&self, query: &str) -> Result<String, ApiError> {
        self.calls.lock().push(query.to_string());
        let delay = self.delays.get(query).copied().unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        if self.failures.contains(query) {
            return Err(ApiError::Network(format!("scripted failure for {query}")));
        }
        Ok(format!("results for {query}"))
    }
}

/// Table-driven test case structure.
#[derive(Debug, Clone)]
pub struct TestCase<I, E> {
    pub name: &'static str,
    pub input: I,
    pub expected: E,
}

/// Run table-driven tests, reporting the failing case by name.
pub fn run_table_tests<I, E, F>(cases: Vec<TestCase<I, E>>, test_fn: F)
where
    I: std::fmt::Debug + Clone,
    E: std::fmt::Debug + PartialEq,
    F: Fn(I) -> E,
{
    for case in cases {
        println!("[TEST] Running: {}", case.name);
        println!("[TEST] Input: {:?}", case.input);

        let actual = test_fn(case.input.clone());

        println!("[TEST] Expected: {:?}", case.expected);
        println!("[TEST] Actual: {:?}", actual);

        assert_eq!(actual, case.expected, "Test '{}' failed", case.name);
    }
}
