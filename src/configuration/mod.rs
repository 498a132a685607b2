//! Exported action configurations: format, generation, persistence.

pub mod generator;
pub mod schema;
pub mod store;

pub use generator::{generate, to_recorded_actions};
pub use schema::{ActionConfigEntry, Category, Configuration};
pub use store::{sanitize_filename, sanitize_key, ConfigurationStore};
