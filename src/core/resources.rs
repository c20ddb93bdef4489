//! User settings

use serde::{Deserialize, Serialize};

/// Persisted user preferences
///
/// Missing fields in a settings file fall back to their defaults, so older
/// files keep loading after fields are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Draw pieces with chess glyphs instead of letters
    pub unicode_pieces: bool,

    /// Mark the selected piece's moves and captures on the board
    pub show_hints: bool,

    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            unicode_pieces: false,
            show_hints: true,
            log_filter: "info".to_string(),
        }
    }
}
