pub mod context;
pub mod error;
pub mod reader;

pub use context::AppContext;
pub use error::{EddyError, Result};
pub use reader::{Reader, RefreshReport, ViewUpdate};
