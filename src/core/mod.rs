//! Core application services: settings, their persistence, logging setup

pub mod error;
pub mod logging;
pub mod resources;
pub mod settings_persistence;

pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use resources::GameSettings;
pub use settings_persistence::{load_settings, save_settings, settings_or_default, settings_path};
