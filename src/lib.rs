//! ChessTable: two-player chess at the terminal
//!
//! The rules live in the `chess_rules` crate. This crate adds the command
//! line, persisted settings, logging and the interactive session.

pub mod cli;
pub mod core;
pub mod ui;
