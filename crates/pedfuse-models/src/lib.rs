//! Shared data models for the PedFuse pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Raw and pixel-space bounding boxes
//! - Detector outputs (box, score, class label)
//! - Fused pedestrian records (box + average depth)
//! - Per-image fusion results as published downstream

pub mod bbox;
pub mod detection;
pub mod record;

// Re-export common types
pub use bbox::{InvalidBoxError, PixelBox, RawBox};
pub use detection::Detection;
pub use record::{FusionResult, PedestrianRecord};
