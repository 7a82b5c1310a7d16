/// Database connection and table creation
pub mod database;

/// Application settings from environment variables and settings.toml
pub mod settings;
