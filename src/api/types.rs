use serde::{Deserialize, Serialize};

/// Body returned by the search endpoint.
///
/// `data` is optional: some deployments answer an empty keyword with a bare
/// object, which is treated as "nothing to show" rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Option<Vec<SearchHit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl SearchResponse {
    #[must_use]
    pub fn hits(&self) -> &[SearchHit] {
        self.data.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default, rename = "currentPage")]
    pub current_page: u64,
    #[serde(default, rename = "totalPage")]
    pub total_page: u64,
    #[serde(default)]
    pub size: u64,
}

/// One hit, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    Post(PostHit),
    Note(NoteHit),
    Page(PageHit),
    /// Hit kinds this client does not render.
    #[serde(other)]
    Unknown,
}

impl SearchHit {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Post(_) => "post",
            Self::Note(_) => "note",
            Self::Page(_) => "page",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostHit {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteHit {
    pub id: String,
    pub title: String,
    pub nid: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHit {
    pub id: String,
    pub title: String,
    pub slug: String,
}
