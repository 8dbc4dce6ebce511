//! Shell Module
//!
//! User-facing front ends for built menus.

pub mod prompt;

pub use prompt::TerminalPrompt;
