//! Mapping search hits to display rows.

use serde::{Deserialize, Serialize};

use crate::api::{SearchHit, SearchResponse};

/// Subtitles for hit kinds that carry no category of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowLabels {
    pub note: String,
    pub page: String,
}

impl Default for RowLabels {
    fn default() -> Self {
        Self {
            note: "Journal".to_string(),
            page: "Page".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Post,
    Note,
    Page,
}

impl RowKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Note => "note",
            Self::Page => "page",
        }
    }
}

/// One line of the result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRow {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    /// Site-relative path, e.g. `/posts/programming/rust-throttle`.
    pub url: String,
    pub kind: RowKind,
}

impl SearchRow {
    #[must_use]
    pub fn from_hit(hit: &SearchHit, labels: &RowLabels) -> Option<Self> {
        let row = match hit {
            SearchHit::Post(post) => Self {
                id: post.id.clone(),
                title: post.title.clone(),
                subtitle: post.category.name.clone(),
                url: format!("/posts/{}/{}", post.category.slug, post.slug),
                kind: RowKind::Post,
            },
            SearchHit::Note(note) => Self {
                id: note.id.clone(),
                title: note.title.clone(),
                subtitle: labels.note.clone(),
                url: format!("/notes/{}", note.nid),
                kind: RowKind::Note,
            },
            SearchHit::Page(page) => Self {
                id: page.id.clone(),
                title: page.title.clone(),
                subtitle: labels.page.clone(),
                url: format!("/pages/{}", page.slug),
                kind: RowKind::Page,
            },
            SearchHit::Unknown => return None,
        };
        Some(row)
    }

    /// The row URL joined onto `site_url`, or the bare path without one.
    #[must_use]
    pub fn absolute_url(&self, site_url: Option<&str>) -> String {
        match site_url.map(|site| site.trim_end_matches('/')) {
            Some(site) if !site.is_empty() => format!("{site}{}", self.url),
            _ => self.url.clone(),
        }
    }
}

/// Rows for every renderable hit, or `None` when the response has no `data`.
#[must_use]
pub fn rows_from_response(response: &SearchResponse, labels: &RowLabels) -> Option<Vec<SearchRow>> {
    let hits = response.data.as_ref()?;
    Some(
        hits.iter()
            .filter_map(|hit| SearchRow::from_hit(hit, labels))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Category, NoteHit, PageHit, PostHit};
    use crate::test_utils::fixtures;
    use crate::test_utils::{TestCase, run_table_tests};

    #[test]
    fn hit_mapping_per_kind() {
        let labels = RowLabels::default();
        let cases = vec![
            TestCase {
                name: "post uses category",
                input: SearchHit::Post(PostHit {
                    id: "p".into(),
                    title: "Hello".into(),
                    slug: "hello".into(),
                    category: Category {
                        name: "Tech".into(),
                        slug: "tech".into(),
                    },
                }),
                expected: Some(("Tech".to_string(), "/posts/tech/hello".to_string())),
            },
            TestCase {
                name: "note uses nid and note label",
                input: SearchHit::Note(NoteHit {
                    id: "n".into(),
                    title: "Monday".into(),
                    nid: 7,
                }),
                expected: Some(("Journal".to_string(), "/notes/7".to_string())),
            },
            TestCase {
                name: "page uses slug and page label",
                input: SearchHit::Page(PageHit {
                    id: "g".into(),
                    title: "About".into(),
                    slug: "about".into(),
                }),
                expected: Some(("Page".to_string(), "/pages/about".to_string())),
            },
            TestCase {
                name: "unknown kind is skipped",
                input: SearchHit::Unknown,
                expected: None,
            },
        ];

        run_table_tests(cases, |hit| {
            SearchRow::from_hit(&hit, &labels).map(|row| (row.subtitle, row.url))
        });
    }

    #[test]
    fn rows_from_mixed_response_skip_unknown() {
        let rows = rows_from_response(&fixtures::mixed_response(), &RowLabels::default()).unwrap();
        let kinds: Vec<_> = rows.iter().map(|row| row.kind).collect();
        assert_eq!(kinds, [RowKind::Post, RowKind::Note, RowKind::Page]);
        assert_eq!(rows[0].url, "/posts/programming/rust-throttle");
        assert_eq!(rows[1].url, "/notes/118");
    }

    #[test]
    fn rows_from_response_without_data_is_none() {
        let response: SearchResponse =
            serde_json::from_value(fixtures::dataless_response_json()).unwrap();
        assert!(rows_from_response(&response, &RowLabels::default()).is_none());
    }

    #[test]
    fn custom_labels_are_used() {
        let labels = RowLabels {
            note: "生活记录".into(),
            page: "页面".into(),
        };
        let rows = rows_from_response(&fixtures::mixed_response(), &labels).unwrap();
        assert_eq!(rows[1].subtitle, "生活记录");
        assert_eq!(rows[2].subtitle, "页面");
    }

    #[test]
    fn absolute_url_joins_site() {
        let row = SearchRow {
            id: "g".into(),
            title: "About".into(),
            subtitle: "Page".into(),
            url: "/pages/about".into(),
            kind: RowKind::Page,
        };
        assert_eq!(row.absolute_url(None), "/pages/about");
        assert_eq!(
            row.absolute_url(Some("https://blog.example/")),
            "https://blog.example/pages/about"
        );
        assert_eq!(row.absolute_url(Some("")), "/pages/about");
    }
}
