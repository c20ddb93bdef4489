//! Terminal front end
//!
//! - **game_ui**: the interactive session loop and board drawing
//! - **promotion_ui**: the pawn promotion prompt

pub mod game_ui;
pub mod promotion_ui;

pub use game_ui::{Flow, Session};
pub use promotion_ui::{parse_choice, PromptPromotion};
