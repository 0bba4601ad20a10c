//! Project-level configuration (`.blobvault.toml`).

pub mod settings;

pub use settings::Settings;
