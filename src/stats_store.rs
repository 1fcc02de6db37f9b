use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::ledger::StatsLedger;

/// Narrow string key-value persistence used for the ledger.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn clear(&self, key: &str) -> Result<()>;
}

/// SQLite-backed store; one row per key in `kv_store`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let store = Self {
            path: path.to_path_buf(),
        };
        store.connect()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(conn)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let value = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        let now_ms = chrono::Utc::now().timestamp_millis();
        conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at_ms) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at_ms = excluded.updated_at_ms
            "#,
            params![key, value, now_ms],
        )?;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        guard.remove(key);
        Ok(())
    }
}

/// Best-effort ledger persistence under a single key. Nothing here returns an
/// error: unreadable data reads as an empty ledger, failed writes are logged.
pub struct StatsStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl StatsStore {
    pub fn new(backend: Box<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            backend,
            key: key.to_string(),
        }
    }

    pub fn read(&self) -> StatsLedger {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StatsLedger::default(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read stats ledger");
                return StatsLedger::default();
            }
        };
        match serde_json::from_str::<StatsLedger>(&raw) {
            Ok(mut ledger) if ledger.is_consistent() => {
                ledger.trim_log();
                ledger
            }
            Ok(ledger) => {
                tracing::warn!(
                    key = %self.key,
                    wins = ledger.wins,
                    total = ledger.total,
                    log_len = ledger.log.len(),
                    "Stored stats ledger is inconsistent, starting fresh"
                );
                StatsLedger::default()
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Stored stats ledger is corrupt, starting fresh");
                StatsLedger::default()
            }
        }
    }

    pub fn write(&self, ledger: &StatsLedger) {
        let result = serde_json::to_string(ledger)
            .context("failed to serialize stats ledger")
            .and_then(|json| self.backend.set(&self.key, &json));
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist stats ledger");
        }
    }

    pub fn reset(&self) -> StatsLedger {
        let ledger = StatsLedger::default();
        self.write(&ledger);
        ledger
    }

    /// Drop the stored key entirely.
    pub fn remove(&self) {
        if let Err(e) = self.backend.clear(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "Failed to clear stats ledger");
        }
    }
}
