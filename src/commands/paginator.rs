//! Paginated responses
//!
//! Long output is split into pages shown one at a time with First/Prev/Next/Last
//! buttons. Only the user the pages were opened for may navigate; navigation is
//! clamped at both ends. Buttons are removed once the paginator has been idle for
//! the configured timeout.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use dashmap::DashMap;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

use crate::core::Embed;
use crate::platform::{
    ChannelId, ChatPlatform, MessageHandle, MessageId, OutboundMessage, PageIndicator,
    PlatformError, UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    First,
    Previous,
    Next,
    Last,
}

impl PageAction {
    pub const ALL: [PageAction; 4] = [
        PageAction::First,
        PageAction::Previous,
        PageAction::Next,
        PageAction::Last,
    ];

    /// Button id carried by component interactions
    pub fn custom_id(self) -> &'static str {
        match self {
            PageAction::First => "page_first",
            PageAction::Previous => "page_prev",
            PageAction::Next => "page_next",
            PageAction::Last => "page_last",
        }
    }

    pub fn from_custom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.custom_id() == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved,
    /// Already at the first/last page
    Unchanged,
    /// Unknown message or not the permitted navigator
    Ignored,
}

/// A button press on a paginated message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationRequest {
    pub message_id: MessageId,
    pub user: UserId,
    pub action: PageAction,
}

#[derive(Debug, Clone)]
pub struct Paginator {
    title: Option<String>,
    pages: Vec<String>,
    cursor: usize,
    navigator: UserId,
}

impl Paginator {
    pub fn new(pages: Vec<String>, navigator: UserId) -> Self {
        let pages = if pages.is_empty() {
            vec![String::new()]
        } else {
            pages
        };
        Self {
            title: None,
            pages,
            cursor: 0,
            navigator,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn navigate(&mut self, user: UserId, action: PageAction) -> Navigation {
        if user != self.navigator {
            return Navigation::Ignored;
        }
        let last = self.pages.len() - 1;
        let target = match action {
            PageAction::First => 0,
            PageAction::Previous => self.cursor.saturating_sub(1),
            PageAction::Next => (self.cursor + 1).min(last),
            PageAction::Last => last,
        };
        if target == self.cursor {
            Navigation::Unchanged
        } else {
            self.cursor = target;
            Navigation::Moved
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> &str {
        &self.pages[self.cursor]
    }

    pub fn navigator(&self) -> UserId {
        self.navigator
    }

    /// Current page as a message, with or without navigation buttons
    pub fn render(&self, with_navigation: bool) -> OutboundMessage {
        let mut embed = Embed::new().description(self.current_page());
        if let Some(title) = &self.title {
            embed = embed.title(title.clone());
        }
        let message = OutboundMessage::embed(embed);
        if with_navigation && self.pages.len() > 1 {
            message.with_navigation(PageIndicator {
                current: self.cursor + 1,
                total: self.pages.len(),
            })
        } else {
            message
        }
    }
}

struct ActivePaginator {
    paginator: Paginator,
    platform: Arc<dyn ChatPlatform>,
    handle: MessageHandle,
    last_activity: Instant,
}

/// Paginators awaiting navigation, keyed by their message
pub struct PaginatorStore {
    active: DashMap<MessageId, ActivePaginator>,
    idle_timeout: Duration,
}

impl PaginatorStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            active: DashMap::new(),
            idle_timeout,
        }
    }

    /// Send the first page; multi-page paginators stay navigable until idle
    pub async fn open(
        self: &Arc<Self>,
        platform: Arc<dyn ChatPlatform>,
        channel: ChannelId,
        paginator: Paginator,
    ) -> Result<MessageHandle, PlatformError> {
        if paginator.page_count() <= 1 {
            return platform.send(channel, paginator.render(false)).await;
        }

        let handle = platform.send(channel, paginator.render(true)).await?;
        debug!(
            "Opened paginator on message {} with {} pages for user {}",
            handle.message_id,
            paginator.page_count(),
            paginator.navigator()
        );
        self.active.insert(
            handle.message_id,
            ActivePaginator {
                paginator,
                platform,
                handle,
                last_activity: Instant::now(),
            },
        );
        tokio::spawn(Arc::clone(self).expire_when_idle(handle.message_id));
        Ok(handle)
    }

    /// Apply a button press and re-render the page if it moved
    pub async fn navigate(&self, request: NavigationRequest) -> Navigation {
        let (platform, handle, message) = {
            let Some(mut entry) = self.active.get_mut(&request.message_id) else {
                return Navigation::Ignored;
            };
            match entry.paginator.navigate(request.user, request.action) {
                Navigation::Moved => {
                    entry.last_activity = Instant::now();
                    (
                        Arc::clone(&entry.platform),
                        entry.handle,
                        entry.paginator.render(true),
                    )
                }
                Navigation::Unchanged => {
                    entry.last_activity = Instant::now();
                    return Navigation::Unchanged;
                }
                Navigation::Ignored => return Navigation::Ignored,
            }
        };

        if let Err(e) = platform.edit(handle, message).await {
            warn!("Failed to update paginated message {}: {e}", handle.message_id);
        }
        Navigation::Moved
    }

    /// Drop state for a deleted message
    pub fn forget(&self, message_id: MessageId) -> bool {
        self.active.remove(&message_id).is_some()
    }

    pub fn is_active(&self, message_id: MessageId) -> bool {
        self.active.contains_key(&message_id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    async fn expire_when_idle(self: Arc<Self>, message_id: MessageId) {
        loop {
            let deadline = match self.active.get(&message_id) {
                Some(entry) => entry.last_activity + self.idle_timeout,
                None => return,
            };
            sleep_until(deadline).await;

            let timeout = self.idle_timeout;
            let expired = self.active.remove_if(&message_id, |_, entry| {
                entry.last_activity + timeout <= Instant::now()
            });
            if let Some((_, entry)) = expired {
                debug!("Paginator on message {message_id} expired");
                let message = entry.paginator.render(false);
                if let Err(e) = entry.platform.edit(entry.handle, message).await {
                    warn!("Failed to remove page buttons from message {message_id}: {e}");
                }
                return;
            }
        }
    }
}
