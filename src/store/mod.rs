pub mod json_store;
pub mod memory;
pub mod progress;
pub mod schema;

use anyhow::Result;

pub use json_store::JsonStore;
pub use memory::MemoryBackend;
pub use progress::{AnswerOutcome, ProgressStore};
pub use schema::{CategoryProgress, ProgressData};

/// Durable home of the whole progress map. Reads and writes are whole-value;
/// the last write wins.
pub trait ProgressBackend {
    /// `Ok(None)` when nothing has been saved yet.
    fn read(&self) -> Result<Option<ProgressData>>;

    fn write(&self, data: &ProgressData) -> Result<()>;
}
