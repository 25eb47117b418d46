pub mod csv_export;
pub mod json_backend;

use crate::errors::Result;
use crate::ledger::Document;

/// Abstraction over persistence backends holding the application document.
/// The core treats this as an opaque load/save pair.
pub trait StorageBackend: Send + Sync {
    fn save(&self, document: &Document) -> Result<()>;
    fn load(&self) -> Result<Document>;
}

pub use json_backend::JsonStorage;
