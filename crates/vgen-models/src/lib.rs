//! Shared data models for the daily video generator.
//!
//! This crate provides Serde-serializable types for:
//! - Product categories
//! - Video generation requests
//! - Run reports (per-category and sync outcomes)

pub mod category;
pub mod request;
pub mod run;

// Re-export common types
pub use category::Category;
pub use request::{GenerateVideoRequest, DEFAULT_REGION};
pub use run::{CategoryOutcome, RunId, RunReport, SyncOutcome};
