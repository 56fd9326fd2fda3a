pub mod batch;
pub mod options;
pub mod selection;

pub use batch::{ADVANCE_RATIO, BATCH_SIZE, BatchChange, BatchPolicy, batch_count, batch_window};
pub use options::build_options;
pub use selection::{Selection, SelectionEngine, pick_question};
