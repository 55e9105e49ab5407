// src/config/source.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_SOURCE_URL: &str = "https://www.dr.dk/nyheder";

/// CSS selectors describing where items live on the news page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceSelectors {
    /// One element per news item.
    pub item: String,
    /// Time labels inside an item; the last non-primary one wins.
    pub time: String,
    /// Class marking a time element as the "primary" badge (skipped).
    pub time_primary_class: String,
    pub heading: String,
    /// Body candidates, tried in order; the first match is used.
    pub body: Vec<String>,
}

impl Default for SourceSelectors {
    fn default() -> Self {
        Self {
            item: "li.hydra-latest-news-page__short-news-item".into(),
            time: "span.dre-teaser-meta-label".into(),
            time_primary_class: "dre-teaser-meta-label--primary".into(),
            heading: "span.dre-title-text".into(),
            body: vec![
                r#"div.hydra-latest-news-page-short-news-article__body[itemprop="articleBody"]"#
                    .into(),
                "p.hydra-latest-news-page-short-news-card__summary".into(),
            ],
        }
    }
}

/// Load selectors from an explicit path. Supports TOML or JSON formats.
pub fn load_selectors_from(path: &Path) -> Result<SourceSelectors> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading source selectors from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_selectors(&content, ext.as_str())
}

/// Explicit path if given, built-in defaults otherwise.
pub fn load_selectors(path: Option<&Path>) -> Result<SourceSelectors> {
    match path {
        Some(p) => load_selectors_from(p),
        None => Ok(SourceSelectors::default()),
    }
}

fn parse_selectors(s: &str, hint_ext: &str) -> Result<SourceSelectors> {
    let parsed = match hint_ext {
        "json" => serde_json::from_str::<SourceSelectors>(s).map_err(anyhow::Error::from),
        "toml" => toml::from_str::<SourceSelectors>(s).map_err(anyhow::Error::from),
        // No usable extension: JSON if it looks like an object, TOML otherwise.
        _ if s.trim_start().starts_with('{') => {
            serde_json::from_str::<SourceSelectors>(s).map_err(anyhow::Error::from)
        }
        _ => toml::from_str::<SourceSelectors>(s).map_err(anyhow::Error::from),
    };
    let sel = parsed.context("unsupported source selector format")?;
    if sel.item.trim().is_empty() || sel.heading.trim().is_empty() {
        return Err(anyhow!("source selectors need non-empty `item` and `heading`"));
    }
    Ok(sel)
}
