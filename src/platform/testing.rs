//! In-memory platform used by unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use super::{
    ChannelId, ChatPlatform, Emote, HistoryMessage, InboundMessage, MessageHandle, MessageId,
    OutboundMessage, PlatformError, UserId, UserRef,
};

pub const OWNER: UserId = UserId(100_000_000_000_000_001);

/// Records every outbound operation
#[derive(Default)]
pub struct FakePlatform {
    pub users: Vec<UserRef>,
    pub emotes: Vec<Emote>,
    pub history: Vec<HistoryMessage>,
    pub deny_delete: bool,
    pub sent: Mutex<Vec<(ChannelId, OutboundMessage)>>,
    pub edits: Mutex<Vec<(MessageHandle, OutboundMessage)>>,
    pub deleted: Mutex<Vec<MessageHandle>>,
    pub shut_down: AtomicBool,
    next_id: AtomicU64,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(mut self, users: Vec<UserRef>) -> Self {
        self.users = users;
        self
    }

    pub fn with_emotes(mut self, emotes: Vec<Emote>) -> Self {
        self.emotes = emotes;
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryMessage>) -> Self {
        self.history = history;
        self
    }

    /// Fail every delete as if the bot lacked permission
    pub fn denying_delete(mut self) -> Self {
        self.deny_delete = true;
        self
    }

    pub fn sent(&self) -> Vec<(ChannelId, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }

    /// Text content or embed title/description of every sent message
    pub fn sent_text(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|(_, m)| render(&m))
            .collect()
    }

    pub fn edits(&self) -> Vec<(MessageHandle, OutboundMessage)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<MessageHandle> {
        self.deleted.lock().unwrap().clone()
    }
}

pub fn render(message: &OutboundMessage) -> String {
    let mut out = message.content.clone().unwrap_or_default();
    if let Some(embed) = &message.embed {
        if let Some(title) = &embed.title {
            out.push_str(title);
        }
        if let Some(description) = &embed.description {
            out.push('\n');
            out.push_str(description);
        }
    }
    out
}

pub fn user(id: u64, name: &str, discriminator: u16) -> UserRef {
    UserRef {
        id: UserId(id),
        name: name.to_string(),
        discriminator,
        bot: false,
    }
}

pub fn message_from(author: UserRef, content: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(900),
        author,
        channel_id: ChannelId(500),
        guild_id: None,
        content: content.to_string(),
        attachments: Vec::new(),
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn send(
        &self,
        channel: ChannelId,
        message: OutboundMessage,
    ) -> Result<MessageHandle, PlatformError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.lock().unwrap().push((channel, message));
        Ok(MessageHandle {
            channel_id: channel,
            message_id: MessageId(id),
        })
    }

    async fn edit(
        &self,
        handle: MessageHandle,
        message: OutboundMessage,
    ) -> Result<(), PlatformError> {
        self.edits.lock().unwrap().push((handle, message));
        Ok(())
    }

    async fn delete_message(&self, handle: MessageHandle) -> Result<(), PlatformError> {
        if self.deny_delete {
            return Err(PlatformError::Forbidden("manage messages".to_string()));
        }
        self.deleted.lock().unwrap().push(handle);
        Ok(())
    }

    async fn resolve_user_by_id(&self, id: UserId) -> Option<UserRef> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    async fn resolve_user_by_tag(&self, name: &str, discriminator: u16) -> Option<UserRef> {
        self.users
            .iter()
            .find(|u| u.name == name && u.discriminator == discriminator)
            .cloned()
    }

    async fn resolve_user_by_fuzzy_name(&self, name: &str) -> Option<UserRef> {
        let name = name.to_lowercase();
        self.users
            .iter()
            .find(|u| u.name.to_lowercase() == name)
            .cloned()
    }

    async fn fetch_recent_messages(
        &self,
        _channel: ChannelId,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, PlatformError> {
        Ok(self.history.iter().take(limit).cloned().collect())
    }

    async fn open_direct_channel(&self, user: UserId) -> Result<ChannelId, PlatformError> {
        Ok(ChannelId(user.0))
    }

    async fn find_emote(&self, name: &str) -> Option<Emote> {
        let name = name.to_lowercase();
        self.emotes
            .iter()
            .find(|e| e.name.to_lowercase() == name)
            .cloned()
    }

    async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}
