//! Settings store.
//!
//! Backs the settings panel with the same status discipline as
//! [`SourceStore`](crate::store::SourceStore): starting an operation sets
//! `is_loading` and clears `error`, a failure records
//! `"Failed to <operation>: <reason>"` and leaves the current settings alone.

use tokio::sync::watch;
use tracing::{debug, error};

use crate::api::RegistryApi;
use crate::models::Settings;
use crate::store::Outcome;

const OP_FETCH: &str = "fetch settings";
const OP_UPDATE: &str = "update settings";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsState {
    /// `None` until the first successful fetch or update.
    pub settings: Option<Settings>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct SettingsStore<A> {
    api: A,
    state: watch::Sender<SettingsState>,
}

impl<A: RegistryApi> SettingsStore<A> {
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(SettingsState::default());
        Self { api, state }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn settings(&self) -> Option<Settings> {
        self.state.borrow().settings.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn snapshot(&self) -> SettingsState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SettingsState> {
        self.state.subscribe()
    }

    pub async fn fetch_settings(&self) -> Outcome {
        self.begin();
        match self.api.get_settings().await {
            Ok(settings) => {
                debug!(provider = %settings.rerank_provider, "fetched settings");
                self.state.send_modify(|s| {
                    s.settings = Some(settings);
                    s.is_loading = false;
                });
                Outcome::Succeeded
            }
            Err(e) => {
                let msg = e.describe(OP_FETCH);
                self.finish_with_error(msg.clone());
                error!(error = %e, "Failed to fetch settings");
                Outcome::Failed(msg)
            }
        }
    }

    /// Send `settings` to the server; the local copy changes only once the
    /// server has accepted them.
    pub async fn update_settings(&self, settings: Settings) -> Outcome {
        self.begin();
        match self.api.update_settings(&settings).await {
            Ok(()) => {
                debug!(provider = %settings.rerank_provider, "updated settings");
                self.state.send_modify(|s| {
                    s.settings = Some(settings);
                    s.is_loading = false;
                });
                Outcome::Succeeded
            }
            Err(e) => {
                let msg = e.describe(OP_UPDATE);
                self.finish_with_error(msg.clone());
                error!(error = %e, "Failed to update settings");
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

    fn finish_with_error(&self, msg: String) {
        self.state.send_modify(|s| {
            s.error = Some(msg);
            s.is_loading = false;
        });
    }
}
