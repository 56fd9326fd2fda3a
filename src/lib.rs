//! Adaptive question selection and progress tracking for amateur radio
//! license exam pools. The terminal front-end lives in the binary; this
//! library holds everything it drives.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pool;
pub mod session;
pub mod store;
