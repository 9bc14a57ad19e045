pub mod json;
pub mod memory;

use serde_json::Value;

use crate::app::Result;

pub use json::JsonStore;
pub use memory::MemoryStore;

/// Where the settings blob lives between runs.
pub trait Store {
    /// The stored blob, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Value>>;

    /// Replace the stored blob. On error the previous blob stays in place.
    fn save(&self, blob: &Value) -> Result<()>;
}
