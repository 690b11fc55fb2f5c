//! `srcreg settings` commands.

use anyhow::{bail, Result};

use crate::api::RegistryApi;
use crate::models::Settings;
use crate::settings::SettingsStore;

/// Requested changes; `None` leaves a field as the server has it.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub rerank_provider: Option<String>,
    pub rerank_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.rerank_provider.is_none()
            && self.rerank_api_key.is_none()
            && self.gemini_api_key.is_none()
    }

    /// Apply to `base`. An empty key string clears that key.
    pub fn apply(&self, mut base: Settings) -> Settings {
        if let Some(p) = &self.rerank_provider {
            base.rerank_provider = p.clone();
        }
        if let Some(k) = &self.rerank_api_key {
            base.rerank_api_key = Some(k.clone()).filter(|k| !k.is_empty());
        }
        if let Some(k) = &self.gemini_api_key {
            base.gemini_api_key = Some(k.clone()).filter(|k| !k.is_empty());
        }
        base
    }
}

fn mask(key: Option<&str>) -> &'static str {
    match key {
        Some(_) => "(set)",
        None => "-",
    }
}

/// Render settings for display. API keys are never printed.
pub fn render_settings(settings: &Settings) -> String {
    format!(
        "{:<16} {}\n{:<16} {}\n{:<16} {}\n",
        "rerank_provider",
        settings.rerank_provider,
        "rerank_api_key",
        mask(settings.rerank_api_key.as_deref()),
        "gemini_api_key",
        mask(settings.gemini_api_key.as_deref()),
    )
}

/// `srcreg settings show`
pub async fn show_settings<A: RegistryApi>(store: &SettingsStore<A>) -> Result<()> {
    store.fetch_settings().await.into_result()?;
    if let Some(settings) = store.settings() {
        print!("{}", render_settings(&settings));
    }
    Ok(())
}

/// `srcreg settings set`: fetch the current settings, apply `patch`, save.
pub async fn set_settings<A: RegistryApi>(
    store: &SettingsStore<A>,
    patch: &SettingsPatch,
) -> Result<()> {
    if patch.is_empty() {
        bail!("nothing to update; pass at least one setting");
    }

    store.fetch_settings().await.into_result()?;
    let updated = patch.apply(store.settings().unwrap_or_default());
    store.update_settings(updated).await.into_result()?;

    if let Some(settings) = store.settings() {
        print!("{}", render_settings(&settings));
    }
    Ok(())
}
