// src/config/mod.rs
//! Immutable run configuration, built once at startup and handed to the
//! pipeline. Nothing below reads process-wide state on its own.

pub mod size;
pub mod source;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;

use crate::compress::CodecConfig;
use crate::reflow::Width;
use source::SourceSelectors;

/// `--end-date` value meaning "never stop".
pub const NO_CUTOFF: &str = "FFFFFFFF";

/// A string that never shows up in logs or `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(len={})", self.0.len())
    }
}

/// Parse `YYYYMMDD`; the `FFFFFFFF` sentinel (any case) means no cutoff.
pub fn parse_cutoff(s: &str) -> Result<Option<NaiveDate>> {
    let s = s.trim();
    if s.eq_ignore_ascii_case(NO_CUTOFF) {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(s, "%Y%m%d")
        .with_context(|| format!("end date `{s}` is not YYYYMMDD or {NO_CUTOFF}"))?;
    Ok(Some(date))
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source_url: String,
    pub selectors: SourceSelectors,
    /// Drop items already covered by the previous run.
    pub only_new: bool,
    pub width: Width,
    pub separator: String,
    /// Header label in front of the run timestamp.
    pub title: String,
    /// Hand the winning artifact to the mailer when the gate allows it.
    pub send: bool,
    pub cutoff: Option<NaiveDate>,
    pub ceiling_bytes: u64,
    /// Replay/capture file for debug runs.
    pub debug_cache: Option<PathBuf>,
    pub digest_path: PathBuf,
    pub marker_path: PathBuf,
    pub compress_dir: PathBuf,
    pub passphrase: Option<Secret>,
    pub codecs: Vec<CodecConfig>,
}

impl RunConfig {
    /// Separator line: `sep_char` repeated to the reflow width (60 if unbounded).
    pub fn separator_line(sep_char: &str, width: Width) -> String {
        sep_char.repeat(width.separator_len())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_url: source::DEFAULT_SOURCE_URL.to_string(),
            selectors: SourceSelectors::default(),
            only_new: true,
            width: Width::Unbounded,
            separator: Self::separator_line("-", Width::Unbounded),
            title: "Nyheder fra DR".to_string(),
            send: true,
            cutoff: None,
            ceiling_bytes: 100_000,
            debug_cache: None,
            digest_path: PathBuf::from("news.txt"),
            marker_path: PathBuf::from("last.txt"),
            compress_dir: PathBuf::from("compress"),
            passphrase: None,
            codecs: crate::compress::codecs::default_codecs(),
        }
    }
}

/// SMTP settings for the dispatch step.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Implicit-TLS relay host.
    pub smtp_host: String,
    pub username: String,
    pub password: Secret,
    /// Display name in the `From:` header; the address is `username`.
    pub from_name: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}
