//! Canned search endpoint payloads.

use serde_json::{Value, json};

use crate::api::SearchResponse;

/// A response with one hit of every kind plus one kind the client ignores.
#[must_use]
pub fn mixed_response_json() -> Value {
    json!({
        "data": [
            {
                "type": "post",
                "id": "5f1c",
                "title": "Writing a throttle in Rust",
                "slug": "rust-throttle",
                "category": { "name": "Programming", "slug": "programming" }
            },
            {
                "type": "note",
                "id": "61aa",
                "title": "Rainy Sunday",
                "nid": 118
            },
            {
                "type": "page",
                "id": "60bd",
                "title": "About",
                "slug": "about"
            },
            {
                "type": "recently",
                "id": "62ff",
                "content": "not rendered"
            }
        ],
        "pagination": { "total": 4, "currentPage": 1, "totalPage": 1, "size": 10 }
    })
}

#[must_use]
pub fn mixed_response() -> SearchResponse {
    serde_json::from_value(mixed_response_json()).unwrap_or_default()
}

/// A response whose `data` field is missing.
#[must_use]
pub fn dataless_response_json() -> Value {
    json!({ "pagination": { "total": 0, "currentPage": 1, "totalPage": 0, "size": 10 } })
}

#[must_use]
pub fn empty_response_json() -> Value {
    json!({ "data": [] })
}
