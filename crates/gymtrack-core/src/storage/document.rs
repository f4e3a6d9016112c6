//! Local JSON user document.
//!
//! Stands in for the remote document database. Writes merge the patch's
//! top-level fields over the stored object, so fields the engine does not
//! know about (profile data, tokens) survive every update.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{CoreError, Result};
use crate::snapshot::{SnapshotPatch, UserSnapshot};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Clones share one write lock, so jobs holding clones of the same store
/// never interleave a read-modify-write cycle.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot. A missing document reads as an empty snapshot.
    pub fn load(&self) -> Result<UserSnapshot> {
        let object = self.read_object()?;
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Merge `patch` into the stored document and return the new snapshot.
    pub fn merge(&self, patch: &SnapshotPatch) -> Result<UserSnapshot> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.merge_unlocked(patch)
    }

    /// Load, build a patch from the fresh snapshot, and merge it, all under
    /// the store's write lock.
    pub fn update<F>(&self, build: F) -> Result<UserSnapshot>
    where
        F: FnOnce(&UserSnapshot) -> SnapshotPatch,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.load()?;
        let patch = build(&snapshot);
        self.merge_unlocked(&patch)
    }

    fn merge_unlocked(&self, patch: &SnapshotPatch) -> Result<UserSnapshot> {
        let mut object = self.read_object()?;
        if !patch.is_empty() {
            let fields = match serde_json::to_value(patch)? {
                Value::Object(fields) => fields,
                _ => Map::new(),
            };
            tracing::debug!(
                path = %self.path.display(),
                fields = ?fields.keys().collect::<Vec<_>>(),
                "merging patch"
            );
            object.extend(fields);
            self.write_object(&object)?;
        }
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    fn read_object(&self) -> Result<Map<String, Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&content)? {
            Value::Object(object) => Ok(object),
            _ => Err(CoreError::MalformedDocument {
                path: self.path.clone(),
            }),
        }
    }

    fn write_object(&self, object: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .path
            .with_extension(format!("json.{}-{seq}.tmp", std::process::id()));
        std::fs::write(&tmp, serde_json::to_string_pretty(object)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
