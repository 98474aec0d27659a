//! Streaming pedestrian fusion worker.
//!
//! This crate provides:
//! - The serial stream runner consuming images from Redis
//! - Worker configuration from environment variables
//! - Natural filename ordering for the publisher tool

pub mod config;
pub mod error;
pub mod natsort;
pub mod runner;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use runner::StreamRunner;
