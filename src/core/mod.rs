//! # Core Module
//!
//! Configuration, embed building and response sizing shared by the command engine.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add platform-neutral embeds and line pagination
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod embeds;
pub mod response;

// Re-export commonly used items
pub use config::Config;
pub use embeds::{Embed, EMBED_COLOR};
pub use response::{
    chunk_for_message, chunk_text, paginate_lines, truncate, EMBED_LIMIT, MESSAGE_LIMIT,
};
