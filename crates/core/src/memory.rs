//! File-backed key-value memory store.
//!
//! Memory is **not chat history**. It is facts the model asked to keep
//! (through the remember directive) that get compiled into the system
//! prompt before each request, so they survive a cleared conversation.
//!
//! Entries live in insertion order and every mutation is written back to
//! the backing file before the call returns. The file is plain text, one
//! `key=value` record per line behind a timestamp comment; `#` comments,
//! blank lines, and lines without `=` are skipped on load.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Key-value store persisted as `key=value` lines.
///
/// Keys are lowercased on every insert and lookup. The backing file is
/// rewritten in full on each mutation; a failed write is logged and the
/// in-memory state stays authoritative for the rest of the session.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Vec<(String, String)>,
    path: PathBuf,
}

impl MemoryStore {
    /// Load the store from `path`, or start empty if the file is missing.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = Vec::new();
        if let Ok(contents) = std::fs::read_to_string(&path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some((key, value)) = line.split_once('=') else {
                    tracing::debug!("skipping malformed memory line: {line}");
                    continue;
                };
                upsert(&mut entries, key, value.trim());
            }
        }
        Self { entries, path }
    }

    /// Get the value for a key. Lookup is case-insensitive.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set (upsert) a key-value pair, then write the store back to disk.
    ///
    /// An existing key keeps its position; its value is replaced.
    pub fn set(&mut self, key: &str, value: &str) {
        upsert(&mut self.entries, key, value);
        self.flush();
    }

    /// Remove every entry, then write the store back to disk.
    ///
    /// The file ends up containing only the timestamp header.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.flush();
    }

    /// Compile the entries into the context string embedded in every
    /// outbound request.
    pub fn compile_context(&self) -> String {
        if self.entries.is_empty() {
            return "No memories".to_string();
        }
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Write the store to the backing file, header line first.
    ///
    /// Values keep any `=` they contain (load splits on the first one);
    /// newlines are flattened to spaces so the file stays line-oriented.
    pub fn save(&self) -> Result<()> {
        let mut out = format!(
            "# memory saved {}\n",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S")
        );
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(&value.replace('\n', " "));
            out.push('\n');
        }
        std::fs::write(&self.path, out)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Persist, downgrading failure to a warning.
    fn flush(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("memory not persisted: {e:#}");
        }
    }
}

fn upsert(entries: &mut Vec<(String, String)>, key: &str, value: &str) {
    let key = key.trim().to_lowercase();
    if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == key) {
        existing.1 = value.to_string();
    } else {
        entries.push((key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, MemoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load(dir.path().join("memory.txt"));
        (dir, store)
    }

    #[test]
    fn missing_file_loads_empty() {
        let (_dir, store) = scratch();
        assert!(store.is_empty());
    }

    #[test]
    fn set_and_get() {
        let (_dir, mut store) = scratch();
        assert!(store.get("user").is_none());

        store.set("user", "likes rust");
        assert_eq!(store.get("user").unwrap(), "likes rust");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let (_dir, mut store) = scratch();
        store.set("Alice", "alice@example.com");

        assert_eq!(store.get("alice").unwrap(), "alice@example.com");
        assert_eq!(store.get("ALICE").unwrap(), "alice@example.com");
        assert_eq!(store.entries()[0].0, "alice");
    }

    #[test]
    fn upsert_keeps_position() {
        let (_dir, mut store) = scratch();
        store.set("a", "1");
        store.set("b", "2");
        store.set("a", "3");

        assert_eq!(store.entries(), &[
            ("a".to_string(), "3".to_string()),
            ("b".to_string(), "2".to_string()),
        ]);
    }

    #[test]
    fn round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.txt");

        let mut store = MemoryStore::load(&path);
        store.set("alice", "alice@example.com");
        store.set("greeting", "formal");

        let reloaded = MemoryStore::load(&path);
        assert_eq!(reloaded.entries(), store.entries());
    }

    #[test]
    fn load_skips_comments_blanks_and_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.txt");
        std::fs::write(&path, "# memory saved 2026-01-01T00:00:00\n\nnot a record\nalice=alice@example.com\n").unwrap();

        let store = MemoryStore::load(&path);
        assert_eq!(store.entries(), &[(
            "alice".to_string(),
            "alice@example.com".to_string(),
        )]);
    }

    #[test]
    fn value_keeps_equals_sign() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.txt");

        let mut store = MemoryStore::load(&path);
        store.set("formula", "a=b");

        let reloaded = MemoryStore::load(&path);
        assert_eq!(reloaded.get("formula").unwrap(), "a=b");
    }

    #[test]
    fn clear_leaves_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.txt");

        let mut store = MemoryStore::load(&path);
        store.set("alice", "alice@example.com");
        store.clear();

        assert!(store.is_empty());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with('#'));
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn failed_save_keeps_in_memory_state() {
        let mut store = MemoryStore::load("/nonexistent/dir/memory.txt");
        store.set("alice", "alice@example.com");
        assert_eq!(store.get("alice").unwrap(), "alice@example.com");
    }

    #[test]
    fn compile_context_empty() {
        let (_dir, store) = scratch();
        assert_eq!(store.compile_context(), "No memories");
    }

    #[test]
    fn compile_context_entries_in_order() {
        let (_dir, mut store) = scratch();
        store.set("alice", "alice@example.com");
        store.set("style", "formal");
        assert_eq!(
            store.compile_context(),
            "alice: alice@example.com, style: formal"
        );
    }
}
