//! Core data models shared by the stores, the registry clients, and the CLI.
//!
//! These types mirror the JSON documents exchanged with the registry API.
//! Field names on the wire are fixed by the API: `lastSyncedAt` is camelCase
//! while `max_depth` is snake_case.

use serde::{Deserialize, Serialize};

/// A crawl/ingestion target tracked by the registry.
///
/// Every `Source` held by a [`SourceStore`](crate::store::SourceStore) carries
/// the `id` the server assigned to it. Drafts that have not been persisted
/// yet are represented by [`SourceDraft`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireSource")]
pub struct Source {
    /// Opaque identifier assigned by the registry.
    pub id: String,
    /// Display name. Defaults to the URL when the server does not send one.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Server-assigned crawl status (e.g. `"pending"`, `"completed"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// RFC 3339 timestamp of the last completed ingestion.
    #[serde(rename = "lastSyncedAt", skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<Vec<String>>,
}

/// Shape accepted from the wire. The registry backend stores only the URL,
/// so `name` may be missing from its responses.
#[derive(Deserialize)]
struct WireSource {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(rename = "lastSyncedAt", default)]
    last_synced_at: Option<String>,
    #[serde(default)]
    max_depth: Option<u32>,
    #[serde(default)]
    exclusions: Option<Vec<String>>,
}

impl From<WireSource> for Source {
    fn from(w: WireSource) -> Self {
        let name = w
            .name
            .filter(|n| !n.is_empty())
            .or_else(|| w.url.clone())
            .unwrap_or_default();
        Self {
            id: w.id,
            name,
            url: w.url,
            status: w.status,
            last_synced_at: w.last_synced_at,
            max_depth: w.max_depth,
            exclusions: w.exclusions,
        }
    }
}

/// A Source that has not been persisted yet (no `id`).
///
/// This is the body of `POST /api/sources`. Build one from user input with
/// [`SourceForm`](crate::form::SourceForm) so that name defaulting and
/// exclusion parsing stay consistent across callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<Vec<String>>,
}

impl SourceDraft {
    /// A minimal draft for `url`, named after the URL itself.
    pub fn for_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            url: Some(url),
            max_depth: None,
            exclusions: None,
        }
    }
}

/// Registry-wide settings edited through the settings panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Reranking provider (`"none"`, `"jina"`, `"cohere"`).
    #[serde(default = "default_rerank_provider")]
    pub rerank_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
}

fn default_rerank_provider() -> String {
    "none".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rerank_provider: default_rerank_provider(),
            rerank_api_key: None,
            gemini_api_key: None,
        }
    }
}
