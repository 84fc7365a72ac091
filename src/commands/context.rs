//! Per-invocation execution context
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: One context per invocation carrying the triggering message and reply helpers
//! - 1.0.0: Initial implementation with core shared state

use anyhow::Result;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::lifecycle::Lifecycle;
use super::paginator::{Paginator, PaginatorStore};
use super::registry::CommandRegistry;
use crate::core::{chunk_for_message, Config, Embed};
use crate::platform::{
    ChannelId, ChatPlatform, InboundMessage, MessageHandle, OutboundMessage, UserRef,
};

/// Everything a handler may touch while running one command
///
/// Built by the dispatcher for a single invocation and dropped when the handler
/// returns.
pub struct ExecutionContext {
    request_id: Uuid,
    event: InboundMessage,
    platform: Arc<dyn ChatPlatform>,
    config: Arc<Config>,
    registry: Arc<CommandRegistry>,
    paginators: Arc<PaginatorStore>,
    lifecycle: Arc<Lifecycle>,
}

impl ExecutionContext {
    pub fn new(
        request_id: Uuid,
        event: InboundMessage,
        platform: Arc<dyn ChatPlatform>,
        config: Arc<Config>,
        registry: Arc<CommandRegistry>,
        paginators: Arc<PaginatorStore>,
        lifecycle: Arc<Lifecycle>,
    ) -> Self {
        Self {
            request_id,
            event,
            platform,
            config,
            registry,
            paginators,
            lifecycle,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// The message that invoked the command
    pub fn event(&self) -> &InboundMessage {
        &self.event
    }

    pub fn author(&self) -> &UserRef {
        &self.event.author
    }

    pub fn channel_id(&self) -> ChannelId {
        self.event.channel_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn platform(&self) -> &dyn ChatPlatform {
        self.platform.as_ref()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Send text to the invoking channel, split to the message limit
    ///
    /// Returns the handle of the last message sent.
    pub async fn reply(&self, content: impl AsRef<str>) -> Result<MessageHandle> {
        self.send_to(self.event.channel_id, content).await
    }

    /// Send text to any channel, split to the message limit
    pub async fn send_to(
        &self,
        channel: ChannelId,
        content: impl AsRef<str>,
    ) -> Result<MessageHandle> {
        let chunks = chunk_for_message(content.as_ref());
        let mut last = None;
        for chunk in chunks {
            last = Some(
                self.platform
                    .send(channel, OutboundMessage::text(chunk))
                    .await?,
            );
        }
        last.ok_or_else(|| anyhow::anyhow!("nothing to send"))
    }

    pub async fn reply_embed(&self, embed: Embed) -> Result<MessageHandle> {
        let handle = self
            .platform
            .send(self.event.channel_id, OutboundMessage::embed(embed))
            .await?;
        Ok(handle)
    }

    pub async fn reply_error(&self, message: impl AsRef<str>) -> Result<MessageHandle> {
        debug!("[{}] Replying with error: {}", self.request_id, message.as_ref());
        self.reply(format!("❌ {}", message.as_ref())).await
    }

    pub async fn reply_success(&self, message: impl AsRef<str>) -> Result<MessageHandle> {
        self.reply(format!("✅ {}", message.as_ref())).await
    }

    /// Send pages navigable by the command author
    pub async fn reply_paginated(
        &self,
        title: impl Into<String>,
        pages: Vec<String>,
    ) -> Result<MessageHandle> {
        let paginator = Paginator::new(pages, self.event.author.id).titled(title);
        let handle = self
            .paginators
            .open(Arc::clone(&self.platform), self.event.channel_id, paginator)
            .await?;
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MESSAGE_LIMIT;
    use crate::platform::testing::{message_from, user, FakePlatform, OWNER};
    use crate::platform::UserId;
    use std::time::Duration;

    fn context(platform: Arc<FakePlatform>) -> ExecutionContext {
        ExecutionContext::new(
            Uuid::new_v4(),
            message_from(user(7, "bean", 1), "..test"),
            platform,
            Arc::new(Config::for_owner(OWNER)),
            Arc::new(CommandRegistry::new()),
            Arc::new(PaginatorStore::new(Duration::from_secs(60))),
            Arc::new(Lifecycle::new()),
        )
    }

    #[tokio::test]
    async fn test_reply_helpers_format() {
        let platform = Arc::new(FakePlatform::new());
        let ctx = context(platform.clone());
        ctx.reply_error("nope").await.unwrap();
        ctx.reply_success("done").await.unwrap();
        assert_eq!(platform.sent_text(), vec!["❌ nope", "✅ done"]);
        assert!(platform.sent().iter().all(|(c, _)| *c == ChannelId(500)));
    }

    #[tokio::test]
    async fn test_long_reply_is_chunked() {
        let platform = Arc::new(FakePlatform::new());
        let ctx = context(platform.clone());
        ctx.reply("x".repeat(MESSAGE_LIMIT + 10)).await.unwrap();
        assert_eq!(platform.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_paginated_reply_navigator_is_author() {
        let platform = Arc::new(FakePlatform::new());
        let ctx = context(platform.clone());
        ctx.reply_paginated("Pages", vec!["a".into(), "b".into()])
            .await
            .unwrap();
        assert_eq!(ctx.paginators.len(), 1);
        assert_eq!(ctx.author().id, UserId(7));
        assert!(platform.sent()[0].1.navigation.is_some());
    }
}
