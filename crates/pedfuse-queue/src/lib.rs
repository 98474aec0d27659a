//! Redis Streams transport for the PedFuse pipeline.
//!
//! This crate provides:
//! - Publishing encoded images onto the inbound stream
//! - Worker consumption through a consumer group
//! - Publishing fusion result JSON onto the outbound stream
//!
//! Messages are acknowledged exactly once by consumers regardless of
//! processing outcome; there is no retry or dead-letter layer.

pub mod error;
pub mod message;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use message::{ImageMessage, DATA_FIELD, FILENAME_FIELD, UNKNOWN_FILE};
pub use queue::{ImageQueue, QueueConfig, RESULT_FIELD};
