//! Configuration for Cachette.

pub mod settings;

pub use settings::Settings;
