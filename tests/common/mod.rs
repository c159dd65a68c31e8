//! Helpers shared by the integration suites.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use httpmock::prelude::*;
use serde_json::Value;

/// Path the fake search endpoint is mounted at.
pub const SEARCH_PATH: &str = "/api/search";

/// Mount a `GET /api/search?keyword=<keyword>` mock answering `body`.
pub async fn mock_keyword<'a>(server: &'a MockServer, keyword: &str, body: Value) -> httpmock::Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(GET).path(SEARCH_PATH).query_param("keyword", keyword);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

/// Write a config file pointing at `endpoint` and return its path.
pub fn write_config(dir: &Path, endpoint: &str, extra: &str) -> PathBuf {
    let path = dir.join("config.toml");
    let contents = format!("[api]\nendpoint = \"{endpoint}\"\n{extra}");
    std::fs::write(&path, contents).expect("write config");
    path
}
