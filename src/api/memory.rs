//! In-memory [`RegistryApi`] implementation for testing and offline use.
//!
//! Behaves like the registry backend: ids are server-assigned UUIDs, the
//! listing is newest-first, and a URL can only be registered once (checked
//! by SHA-256 content hash, answered with `409 Duplicate detected`).
//!
//! Every call is recorded, and a single failure can be queued with
//! [`InMemoryRegistry::fail_next`] to exercise error paths.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::RegistryApi;
use crate::error::RegistryError;
use crate::models::{Settings, Source, SourceDraft};

/// A request served by an [`InMemoryRegistry`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryRequest {
    List,
    Create(SourceDraft),
    Delete(String),
    Resync(String),
    GetSettings,
    UpdateSettings(Settings),
}

struct StoredSource {
    source: Source,
    /// `None` for sources without a URL; those never count as duplicates.
    content_hash: Option<String>,
}

#[derive(Default)]
struct RegistryState {
    /// Listing order (newest first).
    sources: Vec<StoredSource>,
    settings: Settings,
    pending_failure: Option<RegistryError>,
    requests: Vec<RegistryRequest>,
}

/// In-process registry.
#[derive(Default)]
pub struct InMemoryRegistry {
    state: Mutex<RegistryState>,
}

fn content_hash(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with `sources`, listed in the given order.
    pub fn with_sources(sources: Vec<Source>) -> Self {
        let registry = Self::new();
        registry.lock().sources = sources
            .into_iter()
            .map(|source| StoredSource {
                content_hash: source.url.as_deref().map(content_hash),
                source,
            })
            .collect();
        registry
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call (of any kind) fail with `err` without touching state.
    pub fn fail_next(&self, err: RegistryError) {
        self.lock().pending_failure = Some(err);
    }

    /// Server-side listing, as `list_sources` would return it.
    pub fn sources(&self) -> Vec<Source> {
        self.lock().sources.iter().map(|s| s.source.clone()).collect()
    }

    /// Server-side settings.
    pub fn settings(&self) -> Settings {
        self.lock().settings.clone()
    }

    /// All requests served so far, including failed ones.
    pub fn requests(&self) -> Vec<RegistryRequest> {
        self.lock().requests.clone()
    }

    /// Update a stored source's crawl status, as the ingestion worker would.
    pub fn set_status(&self, id: &str, status: &str, last_synced_at: Option<&str>) -> bool {
        let mut state = self.lock();
        match state.sources.iter_mut().find(|s| s.source.id == id) {
            Some(stored) => {
                stored.source.status = Some(status.to_string());
                if let Some(ts) = last_synced_at {
                    stored.source.last_synced_at = Some(ts.to_string());
                }
                true
            }
            None => false,
        }
    }

    /// Record `request` and consume a queued failure, if any.
    fn enter(&self, request: RegistryRequest) -> Result<MutexGuard<'_, RegistryState>, RegistryError> {
        let mut state = self.lock();
        state.requests.push(request);
        match state.pending_failure.take() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl RegistryApi for InMemoryRegistry {
    async fn list_sources(&self) -> Result<Vec<Source>, RegistryError> {
        let state = self.enter(RegistryRequest::List)?;
        Ok(state.sources.iter().map(|s| s.source.clone()).collect())
    }

    async fn create_source(&self, draft: &SourceDraft) -> Result<Source, RegistryError> {
        let mut state = self.enter(RegistryRequest::Create(draft.clone()))?;

        let hash = draft.url.as_deref().map(content_hash);
        if hash.is_some() && state.sources.iter().any(|s| s.content_hash == hash) {
            return Err(RegistryError::status(409, "Duplicate detected"));
        }

        let source = Source {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name.clone(),
            url: draft.url.clone(),
            status: Some("pending".to_string()),
            last_synced_at: None,
            max_depth: draft.max_depth,
            exclusions: draft.exclusions.clone(),
        };
        state.sources.insert(
            0,
            StoredSource {
                source: source.clone(),
                content_hash: hash,
            },
        );
        Ok(source)
    }

    async fn delete_source(&self, id: &str) -> Result<(), RegistryError> {
        let mut state = self.enter(RegistryRequest::Delete(id.to_string()))?;
        state.sources.retain(|s| s.source.id != id);
        Ok(())
    }

    async fn resync_source(&self, id: &str) -> Result<(), RegistryError> {
        let mut state = self.enter(RegistryRequest::Resync(id.to_string()))?;
        match state.sources.iter_mut().find(|s| s.source.id == id) {
            Some(stored) => {
                stored.source.status = Some("pending".to_string());
                Ok(())
            }
            None => Err(RegistryError::status(404, format!("source not found: {}", id))),
        }
    }

    async fn get_settings(&self) -> Result<Settings, RegistryError> {
        let state = self.enter(RegistryRequest::GetSettings)?;
        Ok(state.settings.clone())
    }

    async fn update_settings(&self, settings: &Settings) -> Result<(), RegistryError> {
        let mut state = self.enter(RegistryRequest::UpdateSettings(settings.clone()))?;
        state.settings = settings.clone();
        Ok(())
    }
}
