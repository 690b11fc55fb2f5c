//! Source Registry Store.
//!
//! [`SourceStore`] owns the client-side copy of the Source collection plus a
//! shared status pair (`is_loading`, `error`), and is the only place that
//! mutates them. Its four operations each make exactly one registry call:
//!
//! | Operation | Request | Effect on `sources` when the call succeeds |
//! |-----------|---------|---------------------------------------------|
//! | [`fetch_sources`](SourceStore::fetch_sources) | list | replaced with the server listing |
//! | [`add_source`](SourceStore::add_source) | create | server record appended |
//! | [`delete_source`](SourceStore::delete_source) | delete | every entry with that id removed |
//! | [`resync_source`](SourceStore::resync_source) | resync | unchanged |
//!
//! A failed call leaves `sources` untouched and sets `error` to
//! `"Failed to <operation>: <reason>"`. Errors never escape as `Err`: each
//! operation resolves to an [`Outcome`] that mirrors what it wrote into the
//! shared flags.
//!
//! # Status flags
//!
//! ```text
//!   Idle(error=None) ──┐            ┌──▶ Idle(error=None)   on success
//!                      ├─▶ Loading ─┤
//!   Idle(error=Some) ──┘            └──▶ Idle(error=Some)   on failure
//! ```
//!
//! Starting any operation sets `is_loading` and clears `error`; finishing it
//! resets `is_loading` and records the result. The pair is shared by all
//! operations and is last-writer-wins: overlapping calls are not queued, so
//! one call finishing clears `is_loading` while another is still in flight,
//! and a later start wipes an earlier failure. Callers that need a specific
//! call's result use its returned [`Outcome`].
//!
//! # Consistency
//!
//! State lives in a `tokio::sync::watch` channel. Every mutation is one
//! synchronous `send_modify`, so readers and subscribers only ever see whole
//! states, and no lock is held across a registry call.

use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::api::RegistryApi;
use crate::error::RegistryError;
use crate::models::{Source, SourceDraft};

const OP_FETCH: &str = "fetch sources";
const OP_ADD: &str = "add source";
const OP_DELETE: &str = "delete source";
const OP_RESYNC: &str = "resync source";

/// Snapshot of everything the store exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceState {
    /// Sources in insertion/fetch order. Every entry has a non-empty `id`.
    pub sources: Vec<Source>,
    pub is_loading: bool,
    /// Message from the most recent failed operation, cleared when any
    /// operation starts.
    pub error: Option<String>,
}

/// Result of a single store operation.
///
/// Returned for per-call correlation only; the same information is already
/// reflected in the store's shared flags, so it is fine to ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }

    /// The error message, for a failed call.
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Succeeded => None,
            Outcome::Failed(msg) => Some(msg.as_str()),
        }
    }

    /// Turn a failure into an error carrying the store's message, for
    /// callers that stop at the first failed operation.
    pub fn into_result(self) -> anyhow::Result<()> {
        match self {
            Outcome::Succeeded => Ok(()),
            Outcome::Failed(msg) => Err(anyhow::anyhow!(msg)),
        }
    }
}

/// Client-side state manager for the Source collection.
pub struct SourceStore<A> {
    api: A,
    state: watch::Sender<SourceState>,
}

impl<A: RegistryApi> SourceStore<A> {
    /// An empty, idle store backed by `api`.
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(SourceState::default());
        Self { api, state }
    }

    /// The registry backend this store talks to.
    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn sources(&self) -> Vec<Source> {
        self.state.borrow().sources.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn snapshot(&self) -> SourceState {
        self.state.borrow().clone()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SourceState> {
        self.state.subscribe()
    }

    /// Replace the collection with the server's current listing.
    pub async fn fetch_sources(&self) -> Outcome {
        self.begin();
        let result = self
            .api
            .list_sources()
            .await
            .and_then(|listing| match listing.iter().position(|s| s.id.is_empty()) {
                Some(idx) => Err(RegistryError::invalid(format!(
                    "listing entry {} has no id",
                    idx
                ))),
                None => Ok(listing),
            });

        match result {
            Ok(listing) => {
                debug!(count = listing.len(), "fetched sources");
                self.state.send_modify(|s| {
                    s.sources = listing;
                    s.is_loading = false;
                });
                Outcome::Succeeded
            }
            Err(e) => {
                let msg = self.fail(OP_FETCH, &e);
                error!(error = %e, "Failed to fetch sources");
                Outcome::Failed(msg)
            }
        }
    }

    /// Submit `draft` and append the server's canonical record.
    pub async fn add_source(&self, draft: SourceDraft) -> Outcome {
        self.begin();
        let result = self.api.create_source(&draft).await.and_then(|created| {
            if created.id.is_empty() {
                Err(RegistryError::invalid("server returned a source without an id"))
            } else {
                Ok(created)
            }
        });

        match result {
            Ok(created) => {
                debug!(id = %created.id, url = ?created.url, "added source");
                self.state.send_modify(|s| {
                    s.sources.push(created);
                    s.is_loading = false;
                });
                Outcome::Succeeded
            }
            Err(e) => {
                let msg = self.fail(OP_ADD, &e);
                error!(error = %e, url = ?draft.url, "Failed to add source");
                Outcome::Failed(msg)
            }
        }
    }

    /// Delete `id` on the server, then drop every local entry with that id.
    pub async fn delete_source(&self, id: &str) -> Outcome {
        self.begin();
        match self.api.delete_source(id).await {
            Ok(()) => {
                debug!(id, "deleted source");
                self.state.send_modify(|s| {
                    s.sources.retain(|src| src.id != id);
                    s.is_loading = false;
                });
                Outcome::Succeeded
            }
            Err(e) => {
                let msg = self.fail(OP_DELETE, &e);
                warn!(error = %e, id, "Failed to delete source");
                Outcome::Failed(msg)
            }
        }
    }

    /// Ask the server to re-run ingestion for `id`.
    ///
    /// The collection is not touched; the new status only shows up after a
    /// later [`fetch_sources`](Self::fetch_sources).
    pub async fn resync_source(&self, id: &str) -> Outcome {
        self.begin();
        match self.api.resync_source(id).await {
            Ok(()) => {
                debug!(id, "resync requested");
                self.state.send_modify(|s| s.is_loading = false);
                Outcome::Succeeded
            }
            Err(e) => {
                let msg = self.fail(OP_RESYNC, &e);
                warn!(error = %e, id, "Failed to resync source");
                Outcome::Failed(msg)
            }
        }
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    fn fail(&self, operation: &str, err: &RegistryError) -> String {
        let msg = err.describe(operation);
        self.state.send_modify(|s| {
            s.error = Some(msg.clone());
            s.is_loading = false;
        });
        msg
    }
}
