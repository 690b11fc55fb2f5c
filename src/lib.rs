//! # Source Registry
//!
//! Client-side state management for a web crawl source registry.
//!
//! A *source* is a crawl/ingestion target (a URL, an optional crawl depth,
//! optional path exclusions) that a remote registry service persists and
//! ingests. This crate keeps an authoritative in-memory copy of the source
//! collection, drives every create/list/delete/resync call against the
//! registry, and exposes the result to front ends as read-only, observable
//! state.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────────────┐
//! │  Front ends  │──▶│    Stores    │──▶│    RegistryApi      │
//! │ CLI / forms  │   │ Source/Sett. │   │ HTTP │ in-memory    │
//! └──────┬───────┘   └──────┬───────┘   └─────────────────────┘
//!        │   watch::Receiver│
//!        └◀─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use source_registry::api::HttpRegistryClient;
//! use source_registry::form::SourceForm;
//! use source_registry::store::SourceStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = HttpRegistryClient::new("http://localhost:8081", "/api")?;
//! let store = SourceStore::new(client);
//!
//! store.fetch_sources().await;
//! store
//!     .add_source(SourceForm::new("https://example.com").into_draft()?)
//!     .await;
//!
//! if let Some(err) = store.error() {
//!     eprintln!("{}", err);
//! }
//! for s in store.sources() {
//!     println!("{} {}", s.id, s.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Source, draft, and settings types |
//! | [`form`] | Builds validated creation payloads from user input |
//! | [`error`] | Registry and form error types |
//! | [`api`] | Registry API trait, HTTP client, in-memory registry |
//! | [`store`] | Source Registry Store |
//! | [`settings`] | Settings store |
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`sources_cmd`], [`settings_cmd`] | `srcreg` command implementations |

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod models;
pub mod settings;
pub mod settings_cmd;
pub mod sources_cmd;
pub mod store;
