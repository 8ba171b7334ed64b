//! Pluggable durable storage for the migration-history corpus.
//!
//! The corpus is append-only by construction: the trait exposes no update or
//! delete operation, which eliminates lost-update concerns entirely.
//!
//! # Storage format
//!
//! `FsCorpusStore` keeps one JSON document per line in `corpus.jsonl` under
//! its base directory, appended on every confirmed migration.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::warn;

use migrate_model::CorpusEntry;

const CORPUS_FILE: &str = "corpus.jsonl";

/// Durable storage behind the similarity index.
pub trait CorpusStore: Send + Sync {
    /// Appends one entry. Never overwrites.
    fn append(&self, entry: &CorpusEntry) -> Result<()>;

    /// Loads every entry in append order.
    fn load(&self) -> Result<Vec<CorpusEntry>>;
}

/// Filesystem-backed corpus store (JSON lines).
#[derive(Debug)]
pub struct FsCorpusStore {
    base_dir: PathBuf,
}

impl FsCorpusStore {
    /// Creates the store, creating the base directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("create corpus dir: {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn corpus_path(&self) -> PathBuf {
        self.base_dir.join(CORPUS_FILE)
    }
}

impl CorpusStore for FsCorpusStore {
    fn append(&self, entry: &CorpusEntry) -> Result<()> {
        let path = self.corpus_path();
        let json = serde_json::to_string(entry)
            .with_context(|| format!("serialize corpus entry {}", entry.record.dna_id))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open corpus file: {}", path.display()))?;
        writeln!(file, "{json}")
            .with_context(|| format!("append corpus entry to {}", path.display()))?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<CorpusEntry>> {
        let path = self.corpus_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&path)
            .with_context(|| format!("open corpus file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read corpus line {}", line_no + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CorpusEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    // A torn or hand-edited line must not take down the
                    // whole corpus.
                    warn!(line = line_no + 1, %error, "skipping unreadable corpus line");
                }
            }
        }
        Ok(entries)
    }
}

/// In-memory corpus store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCorpusStore {
    entries: Mutex<Vec<CorpusEntry>>,
}

impl MemoryCorpusStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CorpusStore for MemoryCorpusStore {
    fn append(&self, entry: &CorpusEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("corpus store lock poisoned"))?
            .push(entry.clone());
        Ok(())
    }

    fn load(&self) -> Result<Vec<CorpusEntry>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("corpus store lock poisoned"))?
            .clone())
    }
}
