//! Cross-module tests for the battle engine.
//!
//! # Test Structure
//!
//! - `determinism.rs`: Same seed and inputs produce the same event stream
//! - `scenarios.rs`: End-to-end battles with hand-checked numbers
//! - `properties.rs`: Property tests for clamping, ordering and conservation
//! - `helpers.rs`: Catalog, roster and session factories

mod helpers;

pub use helpers::*;
