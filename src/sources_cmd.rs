//! `srcreg sources` commands.
//!
//! Each command runs one [`SourceStore`] operation, prints the resulting
//! state, and turns the store's `error` into a command failure so the
//! process exits non-zero.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::api::RegistryApi;
use crate::form::SourceForm;
use crate::models::Source;
use crate::store::SourceStore;

/// Render `lastSyncedAt` for display: RFC 3339 becomes `YYYY-MM-DD HH:MM UTC`,
/// anything else is shown as-is, and a missing value as `-`.
pub fn format_synced_at(raw: Option<&str>) -> String {
    match raw {
        None => "-".to_string(),
        Some(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => dt
                .with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M UTC")
                .to_string(),
            Err(_) => s.to_string(),
        },
    }
}

/// Format sources as a fixed-width table.
pub fn render_sources(sources: &[Source]) -> String {
    if sources.is_empty() {
        return "No sources registered.\n".to_string();
    }

    let mut out = format!(
        "{:<38} {:<28} {:<12} {:<20} URL\n",
        "ID", "NAME", "STATUS", "LAST SYNCED"
    );
    for s in sources {
        out.push_str(&format!(
            "{:<38} {:<28} {:<12} {:<20} {}\n",
            s.id,
            s.name,
            s.status.as_deref().unwrap_or("-"),
            format_synced_at(s.last_synced_at.as_deref()),
            s.url.as_deref().unwrap_or("-"),
        ));
    }
    out
}

/// `srcreg sources list`
pub async fn list_sources<A: RegistryApi>(store: &SourceStore<A>) -> Result<()> {
    store.fetch_sources().await.into_result()?;
    print!("{}", render_sources(&store.sources()));
    Ok(())
}

/// `srcreg sources add`
pub async fn add_source<A: RegistryApi>(store: &SourceStore<A>, form: SourceForm) -> Result<()> {
    let draft = form.into_draft()?;
    store.add_source(draft).await.into_result()?;

    if let Some(created) = store.sources().last() {
        println!(
            "Added source {} ({})",
            created.id,
            created.url.as_deref().unwrap_or(created.name.as_str())
        );
    }
    Ok(())
}

/// `srcreg sources delete`
pub async fn delete_source<A: RegistryApi>(store: &SourceStore<A>, id: &str) -> Result<()> {
    store.delete_source(id).await.into_result()?;
    println!("Deleted source {}", id);
    Ok(())
}

/// `srcreg sources resync`
pub async fn resync_source<A: RegistryApi>(store: &SourceStore<A>, id: &str) -> Result<()> {
    store.resync_source(id).await.into_result()?;
    println!("Resync requested for source {}", id);
    Ok(())
}
