//! Message components for paginated replies
//!
//! Builds the First/Prev/indicator/Next/Last button row and routes button
//! presses to the paginator store.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Buttons driven by paginator state; presses routed to `PaginatorStore`
//! - 1.0.0: Pagination button row for multi-page help

use anyhow::Result;
use log::{debug, info};
use serenity::builder::CreateComponents;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use crate::commands::paginator::{Navigation, NavigationRequest, PageAction, PaginatorStore};
use crate::platform::{MessageId, PageIndicator, UserId};

/// Custom id of the disabled page indicator button
const PAGE_INFO_ID: &str = "page_info";

fn button_label(action: PageAction) -> &'static str {
    match action {
        PageAction::First => "⏮️",
        PageAction::Previous => "⬅️",
        PageAction::Next => "➡️",
        PageAction::Last => "⏭️",
    }
}

/// Whether `action` would move away from the page shown by `indicator`
pub fn button_enabled(action: PageAction, indicator: PageIndicator) -> bool {
    match action {
        PageAction::First | PageAction::Previous => indicator.current > 1,
        PageAction::Next | PageAction::Last => indicator.current < indicator.total,
    }
}

/// Create pagination buttons
pub fn create_pagination_buttons(indicator: PageIndicator) -> CreateComponents {
    CreateComponents::default()
        .create_action_row(|row| {
            for action in [PageAction::First, PageAction::Previous] {
                row.create_button(|button| {
                    button
                        .custom_id(action.custom_id())
                        .label(button_label(action))
                        .style(ButtonStyle::Secondary)
                        .disabled(!button_enabled(action, indicator))
                });
            }
            row.create_button(|button| {
                button
                    .custom_id(PAGE_INFO_ID)
                    .label(format!("{}/{}", indicator.current, indicator.total))
                    .style(ButtonStyle::Secondary)
                    .disabled(true)
            });
            for action in [PageAction::Next, PageAction::Last] {
                row.create_button(|button| {
                    button
                        .custom_id(action.custom_id())
                        .label(button_label(action))
                        .style(ButtonStyle::Secondary)
                        .disabled(!button_enabled(action, indicator))
                });
            }
            row
        })
        .to_owned()
}

/// Translate a button press into a paginator request; `None` for other components
pub fn navigation_request(
    custom_id: &str,
    message_id: MessageId,
    user: UserId,
) -> Option<NavigationRequest> {
    let action = PageAction::from_custom_id(custom_id)?;
    Some(NavigationRequest {
        message_id,
        user,
        action,
    })
}

/// Handle a component interaction
///
/// Page buttons are acknowledged straight away and the paginator edits the
/// message itself; anything else is left alone.
pub async fn handle_component_interaction(
    ctx: &Context,
    interaction: &MessageComponentInteraction,
    paginators: &PaginatorStore,
) -> Result<()> {
    let custom_id = interaction.data.custom_id.as_str();
    let Some(request) = navigation_request(
        custom_id,
        MessageId(interaction.message.id.0),
        UserId(interaction.user.id.0),
    ) else {
        debug!("Ignoring component interaction {custom_id}");
        return Ok(());
    };

    interaction
        .create_interaction_response(&ctx.http, |response| {
            response.kind(InteractionResponseType::DeferredUpdateMessage)
        })
        .await?;

    match paginators.navigate(request).await {
        Navigation::Moved => info!(
            "Paginator {} moved {:?} by {}",
            request.message_id, request.action, request.user
        ),
        outcome => debug!(
            "Paginator {} press {custom_id} from {}: {outcome:?}",
            request.message_id, request.user
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_pagination_buttons() {
        let components = create_pagination_buttons(PageIndicator {
            current: 2,
            total: 5,
        });
        assert_eq!(components.0.len(), 1);
    }

    #[test]
    fn test_buttons_disabled_at_edges() {
        let first = PageIndicator {
            current: 1,
            total: 3,
        };
        assert!(!button_enabled(PageAction::First, first));
        assert!(!button_enabled(PageAction::Previous, first));
        assert!(button_enabled(PageAction::Next, first));

        let last = PageIndicator {
            current: 3,
            total: 3,
        };
        assert!(button_enabled(PageAction::Previous, last));
        assert!(!button_enabled(PageAction::Last, last));
    }

    #[test]
    fn test_navigation_request_only_for_page_buttons() {
        let request = navigation_request("page_next", MessageId(3), UserId(4)).unwrap();
        assert_eq!(request.action, PageAction::Next);
        assert_eq!(request.message_id, MessageId(3));
        assert!(navigation_request(PAGE_INFO_ID, MessageId(3), UserId(4)).is_none());
        assert!(navigation_request("confirm_x", MessageId(3), UserId(4)).is_none());
    }
}
