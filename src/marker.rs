//! marker.rs: persisted "last headline" marker.
//!
//! Read-then-write is not atomic; runs against the same marker must be
//! serialised by whoever schedules them.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub trait MarkerStore: Send + Sync {
    fn read_last_heading(&self) -> Result<Option<String>>;
    fn write_last_heading(&self, heading: &str) -> Result<()>;
}

impl<S: MarkerStore + ?Sized> MarkerStore for Arc<S> {
    fn read_last_heading(&self) -> Result<Option<String>> {
        (**self).read_last_heading()
    }

    fn write_last_heading(&self, heading: &str) -> Result<()> {
        (**self).write_last_heading(heading)
    }
}

/// UTF-8 text file holding exactly one heading.
#[derive(Debug, Clone)]
pub struct FileMarkerStore {
    path: PathBuf,
}

impl FileMarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MarkerStore for FileMarkerStore {
    fn read_last_heading(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let s = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading marker {}", self.path.display()))?;
        Ok(Some(s))
    }

    fn write_last_heading(&self, heading: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        std::fs::write(&self.path, heading)
            .with_context(|| format!("writing marker {}", self.path.display()))
    }
}

// --- Test helper ---
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    pub value: Mutex<Option<String>>,
    pub writes: Mutex<Vec<String>>,
}

impl MemoryMarkerStore {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            value: Mutex::new(initial.map(str::to_string)),
            writes: Mutex::new(vec![]),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.value.lock().ok().and_then(|v| v.clone())
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or_default()
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn read_last_heading(&self) -> Result<Option<String>> {
        Ok(self.current())
    }

    fn write_last_heading(&self, heading: &str) -> Result<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| anyhow::anyhow!("marker mutex poisoned"))?;
        *value = Some(heading.to_string());
        if let Ok(mut w) = self.writes.lock() {
            w.push(heading.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_roundtrips_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMarkerStore::new(dir.path().join("state/last.txt"));
        assert_eq!(store.read_last_heading().unwrap(), None);
        store.write_last_heading("Økonomi: Kø ved grænsen").unwrap();
        assert_eq!(
            store.read_last_heading().unwrap().as_deref(),
            Some("Økonomi: Kø ved grænsen")
        );
    }

    #[test]
    fn memory_store_counts_writes() {
        let store = MemoryMarkerStore::new(Some("old"));
        store.write_last_heading("new").unwrap();
        assert_eq!(store.current().as_deref(), Some("new"));
        assert_eq!(store.write_count(), 1);
    }
}
