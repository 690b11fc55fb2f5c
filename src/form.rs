//! Creation payload builder.
//!
//! Turns raw user input (a URL, an optional name, and the "advanced" crawl
//! options typed as free text) into a validated [`SourceDraft`]. The CLI and
//! any other front end go through here so that every draft submitted to the
//! registry follows the same rules:
//!
//! - `name` defaults to the URL when no name is given.
//! - `max_depth` and `exclusions` are only sent when advanced options are on.
//! - Exclusions are one path pattern per line; blank lines are dropped and
//!   the remaining lines keep their order.

use reqwest::Url;

use crate::error::FormError;
use crate::models::SourceDraft;

/// Raw input for creating a source.
#[derive(Debug, Clone, Default)]
pub struct SourceForm {
    pub url: String,
    pub name: Option<String>,
    /// Whether the advanced crawl options below are submitted at all.
    pub advanced: bool,
    pub max_depth_text: Option<String>,
    pub exclusions_text: Option<String>,
}

impl SourceForm {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Validate the input and build the creation payload.
    pub fn into_draft(self) -> Result<SourceDraft, FormError> {
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(FormError::MissingUrl);
        }
        validate_url(&url)?;

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| url.clone());

        let (max_depth, exclusions) = if self.advanced {
            let depth = match self.max_depth_text.as_deref() {
                Some(text) => parse_depth(text)?,
                None => None,
            };
            let exclusions = self
                .exclusions_text
                .as_deref()
                .map(parse_exclusions)
                .filter(|e| !e.is_empty());
            (depth, exclusions)
        } else {
            (None, None)
        };

        Ok(SourceDraft {
            name,
            url: Some(url),
            max_depth,
            exclusions,
        })
    }
}

fn validate_url(url: &str) -> Result<(), FormError> {
    let parsed = Url::parse(url).map_err(|e| FormError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FormError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn parse_depth(text: &str) -> Result<Option<u32>, FormError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u32>()
        .map(Some)
        .map_err(|_| FormError::InvalidDepth(text.to_string()))
}

/// Split free-form multi-line text into exclusion patterns.
///
/// Each line is trimmed; blank lines are skipped. Order is preserved.
pub fn parse_exclusions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
