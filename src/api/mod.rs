//! Registry API abstraction.
//!
//! The [`RegistryApi`] trait is the single seam between the stores and the
//! remote registry service. Each method performs exactly one request and
//! reports failures as a [`RegistryError`]; retries, caching, and state
//! tracking are left to the caller.
//!
//! Two implementations ship with the crate:
//!
//! | Type | Backend |
//! |------|---------|
//! | [`HttpRegistryClient`] | The registry's JSON HTTP API via `reqwest` |
//! | [`InMemoryRegistry`] | An in-process registry for tests and offline use |
//!
//! # Endpoints
//!
//! | Method | Request | Success response |
//! |--------|---------|------------------|
//! | [`list_sources`](RegistryApi::list_sources) | `GET /api/sources` | JSON array of sources |
//! | [`create_source`](RegistryApi::create_source) | `POST /api/sources` | JSON source with `id` |
//! | [`delete_source`](RegistryApi::delete_source) | `DELETE /api/sources/{id}` | any 2xx |
//! | [`resync_source`](RegistryApi::resync_source) | `POST /api/sources/{id}/resync` | any 2xx |
//! | [`get_settings`](RegistryApi::get_settings) | `GET /api/settings` | JSON settings |
//! | [`update_settings`](RegistryApi::update_settings) | `PUT /api/settings` | any 2xx |

pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RegistryError;
use crate::models::{Settings, Source, SourceDraft};

pub use http::HttpRegistryClient;
pub use memory::{InMemoryRegistry, RegistryRequest};

/// Remote registry operations consumed by the stores.
///
/// Implementations must be `Send + Sync` so a store can be shared across
/// tasks and its operations overlapped.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Fetch the full listing, in server order.
    async fn list_sources(&self) -> Result<Vec<Source>, RegistryError>;

    /// Persist a draft and return the canonical record, including its `id`.
    async fn create_source(&self, draft: &SourceDraft) -> Result<Source, RegistryError>;

    /// Delete a source by id.
    async fn delete_source(&self, id: &str) -> Result<(), RegistryError>;

    /// Ask the server to re-run ingestion for a source.
    async fn resync_source(&self, id: &str) -> Result<(), RegistryError>;

    async fn get_settings(&self) -> Result<Settings, RegistryError>;

    async fn update_settings(&self, settings: &Settings) -> Result<(), RegistryError>;
}

#[async_trait]
impl<T: RegistryApi + ?Sized> RegistryApi for Arc<T> {
    async fn list_sources(&self) -> Result<Vec<Source>, RegistryError> {
        (**self).list_sources().await
    }

    async fn create_source(&self, draft: &SourceDraft) -> Result<Source, RegistryError> {
        (**self).create_source(draft).await
    }

    async fn delete_source(&self, id: &str) -> Result<(), RegistryError> {
        (**self).delete_source(id).await
    }

    async fn resync_source(&self, id: &str) -> Result<(), RegistryError> {
        (**self).resync_source(id).await
    }

    async fn get_settings(&self) -> Result<Settings, RegistryError> {
        (**self).get_settings().await
    }

    async fn update_settings(&self, settings: &Settings) -> Result<(), RegistryError> {
        (**self).update_settings(settings).await
    }
}
