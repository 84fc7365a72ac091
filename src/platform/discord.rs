//! Serenity-backed [`ChatPlatform`]
//!
//! Built per gateway event from the serenity `Context`. User and emote lookups
//! go through the serenity cache; emote hits are memoised in a shared map.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, warn};
use serenity::builder::CreateEmbed;
use serenity::cache::Cache;
use serenity::client::bridge::gateway::ShardMessenger;
use serenity::http::{Http, HttpError};
use serenity::model::channel::Message;
use serenity::model::user::User;
use serenity::model::id as sid;
use serenity::prelude::Context;
use serenity::Error as SerenityError;
use std::sync::Arc;

use super::{
    AttachmentMeta, ChannelId, ChatPlatform, Emote, GuildId, HistoryMessage, InboundMessage,
    MessageHandle, MessageId, OutboundMessage, PlatformError, UserId, UserRef,
};
use crate::core::Embed;
use crate::message_components::create_pagination_buttons;

/// Largest page Discord returns from the message history endpoint
const HISTORY_PAGE: usize = 100;

/// Emotes found so far, keyed by lowercased name
pub type EmoteCache = Arc<DashMap<String, Emote>>;

pub struct DiscordPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
    shard: ShardMessenger,
    emotes: EmoteCache,
}

impl DiscordPlatform {
    pub fn from_context(ctx: &Context, emotes: EmoteCache) -> Self {
        Self {
            http: Arc::clone(&ctx.http),
            cache: Arc::clone(&ctx.cache),
            shard: ctx.shard.clone(),
            emotes,
        }
    }

    /// Every cached guild member whose user matches `predicate`
    fn find_member(&self, predicate: impl Fn(&User) -> bool) -> Option<UserRef> {
        self.cache.guilds().into_iter().find_map(|guild_id| {
            let guild = self.cache.guild(guild_id)?;
            let found = guild
                .members
                .values()
                .find(|member| predicate(&member.user))
                .map(|member| user_ref(&member.user));
            found
        })
    }
}

pub fn user_ref(user: &User) -> UserRef {
    UserRef {
        id: UserId(user.id.0),
        name: user.name.clone(),
        discriminator: user.discriminator,
        bot: user.bot,
    }
}

/// Convert a serenity message into the engine's inbound event
pub fn inbound_message(msg: &Message) -> InboundMessage {
    InboundMessage {
        id: MessageId(msg.id.0),
        author: user_ref(&msg.author),
        channel_id: ChannelId(msg.channel_id.0),
        guild_id: msg.guild_id.map(|id| GuildId(id.0)),
        content: msg.content.clone(),
        attachments: msg
            .attachments
            .iter()
            .map(|a| AttachmentMeta {
                filename: a.filename.clone(),
                size: a.size,
                url: a.url.clone(),
            })
            .collect(),
    }
}

pub fn create_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::default();
    if let Some(title) = &embed.title {
        builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder.description(description);
    }
    if let Some(footer) = &embed.footer {
        builder.footer(|f| f.text(footer));
    }
    builder.color(embed.color);
    builder
}

fn platform_error(error: SerenityError) -> PlatformError {
    if let SerenityError::Http(http_error) = &error {
        if let HttpError::UnsuccessfulRequest(response) = http_error.as_ref() {
            match response.status_code.as_u16() {
                403 => return PlatformError::Forbidden(response.error.message.clone()),
                404 => return PlatformError::NotFound(response.error.message.clone()),
                _ => {}
            }
        }
    }
    PlatformError::Request(error.to_string())
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    async fn send(
        &self,
        channel: ChannelId,
        message: OutboundMessage,
    ) -> Result<MessageHandle, PlatformError> {
        let sent = sid::ChannelId(channel.0)
            .send_message(&self.http, |m| {
                if let Some(content) = &message.content {
                    m.content(content);
                }
                if let Some(embed) = &message.embed {
                    m.set_embed(create_embed(embed));
                }
                if let Some(indicator) = message.navigation {
                    m.set_components(create_pagination_buttons(indicator));
                }
                m
            })
            .await
            .map_err(platform_error)?;

        Ok(MessageHandle {
            channel_id: channel,
            message_id: MessageId(sent.id.0),
        })
    }

    async fn edit(
        &self,
        handle: MessageHandle,
        message: OutboundMessage,
    ) -> Result<(), PlatformError> {
        sid::ChannelId(handle.channel_id.0)
            .edit_message(&self.http, sid::MessageId(handle.message_id.0), |m| {
                if let Some(content) = &message.content {
                    m.content(content);
                }
                if let Some(embed) = &message.embed {
                    m.set_embed(create_embed(embed));
                }
                match message.navigation {
                    Some(indicator) => m.set_components(create_pagination_buttons(indicator)),
                    None => m.components(|c| c),
                };
                m
            })
            .await
            .map_err(platform_error)?;
        Ok(())
    }

    async fn delete_message(&self, handle: MessageHandle) -> Result<(), PlatformError> {
        sid::ChannelId(handle.channel_id.0)
            .delete_message(&self.http, sid::MessageId(handle.message_id.0))
            .await
            .map_err(platform_error)
    }

    async fn resolve_user_by_id(&self, id: UserId) -> Option<UserRef> {
        if let Some(user) = self.cache.user(sid::UserId(id.0)) {
            return Some(user_ref(&user));
        }
        match sid::UserId(id.0).to_user(&self.http).await {
            Ok(user) => Some(user_ref(&user)),
            Err(e) => {
                debug!("User {id} not found: {e}");
                None
            }
        }
    }

    async fn resolve_user_by_tag(&self, name: &str, discriminator: u16) -> Option<UserRef> {
        self.find_member(|user| user.name == name && user.discriminator == discriminator)
    }

    async fn resolve_user_by_fuzzy_name(&self, name: &str) -> Option<UserRef> {
        let needle = name.to_lowercase();
        self.find_member(|user| user.name.to_lowercase() == needle)
            .or_else(|| self.find_member(|user| user.name.to_lowercase().contains(&needle)))
    }

    async fn fetch_recent_messages(
        &self,
        channel: ChannelId,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, PlatformError> {
        let channel = sid::ChannelId(channel.0);
        let mut collected = Vec::with_capacity(limit);
        let mut before: Option<sid::MessageId> = None;

        while collected.len() < limit {
            let page_size = (limit - collected.len()).min(HISTORY_PAGE) as u64;
            let page = channel
                .messages(&self.http, |request| {
                    request.limit(page_size);
                    if let Some(before) = before {
                        request.before(before);
                    }
                    request
                })
                .await
                .map_err(platform_error)?;

            let exhausted = (page.len() as u64) < page_size;
            before = page.last().map(|m| m.id);
            collected.extend(page.iter().map(|m| HistoryMessage {
                id: MessageId(m.id.0),
                author: user_ref(&m.author),
                content: m.content.clone(),
            }));
            if exhausted || before.is_none() {
                break;
            }
        }

        Ok(collected)
    }

    async fn open_direct_channel(&self, user: UserId) -> Result<ChannelId, PlatformError> {
        let channel = sid::UserId(user.0)
            .create_dm_channel(&self.http)
            .await
            .map_err(platform_error)?;
        Ok(ChannelId(channel.id.0))
    }

    async fn find_emote(&self, name: &str) -> Option<Emote> {
        let key = name.to_lowercase();
        if let Some(emote) = self.emotes.get(&key) {
            return Some(emote.clone());
        }

        let emote = self.cache.guilds().into_iter().find_map(|guild_id| {
            let guild = self.cache.guild(guild_id)?;
            let found = guild
                .emojis
                .values()
                .find(|emoji| emoji.name.to_lowercase() == key)
                .map(|emoji| Emote {
                    id: emoji.id.0,
                    name: emoji.name.clone(),
                    animated: emoji.animated,
                });
            found
        })?;
        self.emotes.insert(key, emote.clone());
        Some(emote)
    }

    async fn shutdown(&self) {
        warn!("Closing gateway connection");
        self.shard.shutdown_clean();
    }
}
