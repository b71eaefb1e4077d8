//! Lumen Core
//!
//! Contains the data-oriented building blocks shared by engine components:
//! - Fixed-capacity SoA component managers with generation-checked refs
//! - Descriptor (JSON property) conversion
//! - Parallel ordering of ref lists by a column key
//! - Shared math types (SH coefficients)

pub mod components;
pub mod dod;
pub mod math;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
