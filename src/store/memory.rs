use std::sync::Mutex;

use serde_json::Value;

use crate::app::{EddyError, Result};
use crate::store::Store;

/// Store that keeps the blob in memory; nothing is written to disk.
#[derive(Default)]
pub struct MemoryStore {
    blob: Mutex<Option<Value>>,
}

impl MemoryStore {
    pub fn with_blob(blob: Value) -> Self {
        Self {
            blob: Mutex::new(Some(blob)),
        }
    }

    /// Copy of what was last saved.
    pub fn snapshot(&self) -> Option<Value> {
        self.blob.lock().ok().and_then(|blob| blob.clone())
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<Value>> {
        let blob = self
            .blob
            .lock()
            .map_err(|e| EddyError::Other(e.to_string()))?;
        Ok(blob.clone())
    }

    fn save(&self, blob: &Value) -> Result<()> {
        let mut slot = self
            .blob
            .lock()
            .map_err(|e| EddyError::Other(e.to_string()))?;
        *slot = Some(blob.clone());
        Ok(())
    }
}
