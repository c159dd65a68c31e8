//! Integration tests against a mock search endpoint.

#[path = "../common/mod.rs"]
mod common;

mod coalescer_http_tests;
mod http_client_tests;
