//! # Chat Platform
//!
//! The outbound side of the bot as seen by the command engine: sending, editing and
//! deleting messages, resolving users and emotes, and reading channel history.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Extract platform trait so dispatch can run without a gateway connection

pub mod discord;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::core::Embed;

macro_rules! snowflake {
    ($($name:ident),*) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

snowflake!(UserId, ChannelId, GuildId, MessageId);

/// A user as known to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
    pub discriminator: u16,
    pub bot: bool,
}

impl UserRef {
    /// `name#1234` form
    pub fn tag(&self) -> String {
        format!("{}#{:04}", self.name, self.discriminator)
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMeta {
    pub filename: String,
    pub size: u64,
    pub url: String,
}

/// A raw text message delivered by the event source
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub author: UserRef,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub content: String,
    pub attachments: Vec<AttachmentMeta>,
}

impl InboundMessage {
    pub fn handle(&self) -> MessageHandle {
        MessageHandle {
            channel_id: self.channel_id,
            message_id: self.id,
        }
    }
}

/// Identifies a message already sent to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// A message read back from channel history
#[derive(Debug, Clone)]
pub struct HistoryMessage {
    pub id: MessageId,
    pub author: UserRef,
    pub content: String,
}

/// A custom guild emote
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Emote {
    pub id: u64,
    pub name: String,
    pub animated: bool,
}

impl Emote {
    pub fn mention(&self) -> String {
        if self.animated {
            format!("<a:{}:{}>", self.name, self.id)
        } else {
            format!("<:{}:{}>", self.name, self.id)
        }
    }

    pub fn image_url(&self) -> String {
        let ext = if self.animated { "gif" } else { "png" };
        format!("https://cdn.discordapp.com/emojis/{}.{ext}", self.id)
    }
}

/// Page indicator shown next to navigation buttons (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageIndicator {
    pub current: usize,
    pub total: usize,
}

/// Content of an outbound message or edit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutboundMessage {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    /// Navigation buttons; `None` sends or edits the message without any
    pub navigation: Option<PageIndicator>,
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    pub fn with_navigation(mut self, indicator: PageIndicator) -> Self {
        self.navigation = Some(indicator);
        self
    }
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("missing permission: {0}")]
    Forbidden(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Operations the command engine needs from the chat platform
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send(
        &self,
        channel: ChannelId,
        message: OutboundMessage,
    ) -> Result<MessageHandle, PlatformError>;

    async fn edit(
        &self,
        handle: MessageHandle,
        message: OutboundMessage,
    ) -> Result<(), PlatformError>;

    async fn delete_message(&self, handle: MessageHandle) -> Result<(), PlatformError>;

    async fn resolve_user_by_id(&self, id: UserId) -> Option<UserRef>;

    async fn resolve_user_by_tag(&self, name: &str, discriminator: u16) -> Option<UserRef>;

    /// Resolve a `<@id>` or `<@!id>` mention
    async fn resolve_user_by_mention(&self, mention: &str) -> Option<UserRef> {
        let id = parse_user_mention(mention)?;
        self.resolve_user_by_id(id).await
    }

    async fn resolve_user_by_fuzzy_name(&self, name: &str) -> Option<UserRef>;

    /// Most recent messages first, at most `limit`
    async fn fetch_recent_messages(
        &self,
        channel: ChannelId,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, PlatformError>;

    async fn open_direct_channel(&self, user: UserId) -> Result<ChannelId, PlatformError>;

    async fn find_emote(&self, name: &str) -> Option<Emote>;

    /// Disconnect from the event source
    async fn shutdown(&self);
}

/// Extract the user id from a `<@id>` or `<@!id>` mention
pub fn parse_user_mention(mention: &str) -> Option<UserId> {
    let inner = mention.strip_prefix("<@")?.strip_suffix('>')?;
    let digits = inner.strip_prefix('!').unwrap_or(inner);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(UserId)
}
