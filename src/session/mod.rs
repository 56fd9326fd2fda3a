pub mod controller;
pub mod sink;

pub use controller::{PendingQuestion, PoolSlot, SessionController};
pub use sink::{DisplaySink, ProgressSummary};
