//! Lumen Services Layer
//!
//! Platform-facing services; currently engine settings.

pub mod settings;

pub use settings::{Settings, SettingsError};
