//! Embed builders for command responses
//!
//! Platform-neutral embed description; the Discord adapter turns it into a
//! serenity `CreateEmbed`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use super::response::{truncate, EMBED_LIMIT};

/// Accent color used when a command does not pick one
pub const EMBED_COLOR: u32 = 0xD5_A6_73;

#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: u32,
    pub footer: Option<String>,
}

impl Default for Embed {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            color: EMBED_COLOR,
            footer: None,
        }
    }
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Description is truncated to the embed limit
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(truncate(description.as_ref(), EMBED_LIMIT));
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_uses_default_color() {
        let embed = Embed::new().title("Hi").description("there");
        assert_eq!(embed.title.as_deref(), Some("Hi"));
        assert_eq!(embed.description.as_deref(), Some("there"));
        assert_eq!(embed.color, EMBED_COLOR);
        assert!(embed.footer.is_none());
    }

    #[test]
    fn test_description_truncates_long_text() {
        let embed = Embed::new().description("x".repeat(5000));
        let description = embed.description.unwrap();
        assert!(description.len() <= EMBED_LIMIT);
        assert!(description.ends_with("..."));
    }
}
