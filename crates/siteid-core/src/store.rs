use crate::error::{EngineError, Result};
use crate::record::{OrderPatch, OrderRecord};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

// ---------------------------------------------------------------------------
// SnapshotFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(SnapshotFormat::Json),
            Some("yaml") | Some("yml") => Ok(SnapshotFormat::Yaml),
            _ => Err(EngineError::UnsupportedSnapshotFormat(
                path.display().to_string(),
            )),
        }
    }

    pub fn parse(self, data: &str) -> Result<Vec<OrderRecord>> {
        Ok(match self {
            SnapshotFormat::Json => serde_json::from_str(data)?,
            SnapshotFormat::Yaml => serde_yaml::from_str(data)?,
        })
    }

    pub fn render(self, records: &[OrderRecord]) -> Result<String> {
        Ok(match self {
            SnapshotFormat::Json => serde_json::to_string_pretty(records)?,
            SnapshotFormat::Yaml => serde_yaml::to_string(records)?,
        })
    }
}

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// A small record store over a JSON/YAML array of orders. It backs the CLI
/// and serves as the in-memory fake in tests; the dashboard's real store
/// plugs into the same update/delete effect shape.
#[derive(Debug)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
    records: Mutex<Vec<OrderRecord>>,
}

impl SnapshotStore {
    pub fn in_memory(records: Vec<OrderRecord>) -> Self {
        Self {
            path: None,
            records: Mutex::new(records),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let format = SnapshotFormat::from_path(path)?;
        let data = std::fs::read_to_string(path)?;
        let records = format.parse(&data)?;
        tracing::debug!(path = %path.display(), count = records.len(), "loaded snapshot");
        Ok(Self {
            path: Some(path.to_path_buf()),
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn records(&self) -> MutexGuard<'_, Vec<OrderRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fresh copy of every record, in store order.
    pub fn list(&self) -> Vec<OrderRecord> {
        self.records().clone()
    }

    pub async fn update(&self, id: String, patch: OrderPatch) -> Result<OrderRecord> {
        let mut records = self.records();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EngineError::RecordNotFound(id))?;
        patch.apply(record);
        Ok(record.clone())
    }

    pub async fn delete(&self, id: String) -> Result<()> {
        let mut records = self.records();
        let pos = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(EngineError::RecordNotFound(id))?;
        records.remove(pos);
        Ok(())
    }

    /// Write the current records back to the file the store was opened from.
    /// In-memory stores have nothing to save.
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let format = SnapshotFormat::from_path(path)?;
        let data = format.render(&self.records())?;
        crate::io::atomic_write(path, data.as_bytes())
    }
}
