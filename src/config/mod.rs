//! Configuration module for Spendwise
//!
//! - Platform-aware path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::SpendwisePaths;
pub use settings::Settings;
