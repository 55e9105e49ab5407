//! digest.rs: compose one plain-text digest out of a batch of items.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use std::path::Path;

use crate::reflow::{reflow, Width};
use crate::source::NewsItem;

/// Formatted digest text plus the number of items it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub text: String,
    pub items: usize,
}

impl Digest {
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Write the digest as UTF-8, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        std::fs::write(path, &self.text)
            .with_context(|| format!("writing digest {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct DigestFormatter {
    pub width: Width,
    /// Full separator line, without the newline.
    pub separator: String,
    pub title: String,
}

impl DigestFormatter {
    pub fn new(width: Width, separator: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            width,
            separator: separator.into(),
            title: title.into(),
        }
    }

    /// `None` for an empty batch: there is nothing to send this run.
    pub fn format(&self, batch: &[NewsItem], now: &DateTime<FixedOffset>) -> Option<Digest> {
        if batch.is_empty() {
            return None;
        }
        let stamp = now.format("%Y-%m-%d %H:%M:%S%.6f%:z");
        let mut text = format!("{}: {}\n", self.title, stamp);
        for item in batch {
            self.push_item(&mut text, item);
        }
        Some(Digest {
            text,
            items: batch.len(),
        })
    }

    fn push_item(&self, out: &mut String, item: &NewsItem) {
        let bounded = self.width.is_bounded();
        out.push_str(&reflow(
            &format!("{}: {}", item.time_label, item.heading),
            self.width,
        ));
        out.push('\n');

        if !item.body.is_empty() {
            out.push('\n');
            if bounded {
                out.push('\n');
            }
            out.push_str(&reflow(&item.body, self.width));
            out.push('\n');
        } else if bounded {
            out.push('\n');
        }

        out.push_str(&self.separator);
        out.push('\n');
    }
}
