// src/compress/mod.rs
//! Compression trial: build the same digest under every codec configuration,
//! keep what succeeded, pick the smallest.
//!
//! Each configuration runs on its own blocking task, reads the shared digest
//! bytes and writes its own file, so the trials never touch shared state.

pub mod codecs;
pub mod filters;

use anyhow::{Context, Result};
use metrics::counter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Secret;
use crate::error::{AllCodecsFailed, CodecError};
use filters::{compress_with, Filter, ARCHIVE_EXTENSION};

/// A named filter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    pub name: String,
    pub filters: Vec<Filter>,
}

impl CodecConfig {
    pub fn new(name: impl Into<String>, filters: Vec<Filter>) -> Self {
        Self {
            name: name.into(),
            filters,
        }
    }
}

/// A configuration that produced an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    pub codec_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Wipe and recreate the artifact directory so stale winners never linger.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).with_context(|| format!("clearing {}", dir.display()))?;
    }
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}

#[derive(Debug, Clone)]
pub struct CompressionTrial {
    output_dir: PathBuf,
    /// Digest file stem, e.g. `news` for `news.txt`.
    stem: String,
    /// Name of the single entry inside each archive, e.g. `news.txt`.
    entry_name: String,
    passphrase: Option<Secret>,
}

impl CompressionTrial {
    pub fn new(output_dir: impl Into<PathBuf>, digest_path: &Path) -> Self {
        let stem = digest_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("digest")
            .to_string();
        let entry_name = digest_path
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{stem}.txt"));
        Self {
            output_dir: output_dir.into(),
            stem,
            entry_name,
            passphrase: None,
        }
    }

    pub fn with_passphrase(mut self, passphrase: Option<Secret>) -> Self {
        self.passphrase = passphrase;
        self
    }

    /// Archive path for a config: `{codec}_{stem}.7z`.
    pub fn artifact_path(&self, codec_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{codec_name}_{}.{ARCHIVE_EXTENSION}", self.stem))
    }

    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    /// Try every configuration; failures are logged and left out.
    /// Results keep the order of `configs`.
    pub async fn trial_all(&self, digest: &[u8], configs: &[CodecConfig]) -> Vec<TrialResult> {
        let data: Arc<[u8]> = Arc::from(digest);
        let passphrase: Option<Arc<str>> = self.passphrase.as_ref().map(|p| Arc::from(p.expose()));
        let entry: Arc<str> = Arc::from(self.entry_name.as_str());

        let handles: Vec<_> = configs
            .iter()
            .map(|cfg| {
                let name = cfg.name.clone();
                let filters = cfg.filters.clone();
                let data = Arc::clone(&data);
                let passphrase = passphrase.clone();
                let entry = Arc::clone(&entry);
                let path = self.artifact_path(&cfg.name);
                let handle = tokio::task::spawn_blocking(move || {
                    build_artifact(&filters, &entry, &data, path, passphrase.as_deref())
                });
                (name, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            counter!("codec_trials_total").increment(1);
            let outcome = handle
                .await
                .unwrap_or_else(|e| Err(CodecError::Aborted(e.to_string())));
            match outcome {
                Ok((path, size_bytes)) => {
                    tracing::info!(codec = %name, size_bytes, "codec succeeded");
                    results.push(TrialResult {
                        codec_name: name,
                        path,
                        size_bytes,
                    });
                }
                Err(e) => {
                    tracing::warn!(codec = %name, error = %e, "codec skipped");
                    counter!("codec_failures_total", "codec" => name).increment(1);
                }
            }
        }
        results
    }
}

fn build_artifact(
    filters: &[Filter],
    entry_name: &str,
    data: &[u8],
    path: PathBuf,
    passphrase: Option<&str>,
) -> Result<(PathBuf, u64), CodecError> {
    let archive = compress_with(filters, entry_name, data, passphrase)?;
    if let Err(e) = std::fs::write(&path, &archive) {
        let _ = std::fs::remove_file(&path);
        return Err(e.into());
    }
    Ok((path, archive.len() as u64))
}

/// Smallest artifact; ties go to the earliest entry.
pub fn select_best(results: &[TrialResult]) -> Result<&TrialResult, AllCodecsFailed> {
    results
        .iter()
        .min_by_key(|r| r.size_bytes)
        .ok_or(AllCodecsFailed)
}
