// Preview settings: JSON-backed configuration.

pub mod store;
pub mod types;

pub use store::{SettingsError, SettingsStore};
pub use types::PreviewSettings;
