//! User configuration (`~/.secret.toml`).

pub mod settings;

pub use settings::Settings;
