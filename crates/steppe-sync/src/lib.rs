//! End-to-end menu synchronization: iiko → normalized rows → destination store.

pub mod error;
pub mod pipeline;

pub use error::SyncError;
pub use pipeline::{client_from_config, fetch_normalized, run_sync, MenuSnapshot, SyncReport};
