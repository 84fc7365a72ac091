//! Owner command group
//!
//! Handles: smsg, semt, sebd, regex, shutdown. Every command here is owner-only.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use regex::Regex;
use std::time::Duration;

use crate::commands::arguments::ArgumentBag;
use crate::commands::context::ExecutionContext;
use crate::commands::descriptor::CommandDescriptor;
use crate::commands::handler::{CommandGroup, CommandHandler};
use crate::commands::transformer::{TrGreedy, TrInt, TrRest, TrWord};
use crate::core::{Embed, EMBED_COLOR};

const EMOJI_SCALES: &str = "⚖️";

/// Owner commands; shutdown delays are adjustable for tests
#[derive(Debug, Clone, Copy)]
pub struct OwnerCommands {
    /// Between the goodbye reply and disconnecting the gateway
    pub shutdown_grace: Duration,
    /// Between disconnecting and signalling process termination
    pub shutdown_settle: Duration,
}

impl Default for OwnerCommands {
    fn default() -> Self {
        Self {
            shutdown_grace: Duration::from_secs(2),
            shutdown_settle: Duration::from_secs(1),
        }
    }
}

impl CommandGroup for OwnerCommands {
    fn name(&self) -> &'static str {
        "Owner"
    }

    fn commands(&self) -> Vec<CommandDescriptor> {
        vec![
            CommandDescriptor::builder("smsg")
                .aliases(&["sendmsg"])
                .description("Sends a message. Only my owner can use this.")
                .extended_description(
                    "Sends a message to the command user's channel. This is an owner only \
                     command as to prevent spam.",
                )
                .owner_only()
                .delete_invoking_message()
                .arg(TrRest::new().named("message"))
                .execute(SendMessage),
            CommandDescriptor::builder("semt")
                .aliases(&["sendemote"])
                .description("Sends one or more emotes. Only my owner can use this.")
                .extended_description(
                    "Sends one or more emotes to the command user's channel. If an emote is \
                     not found, I simply don't send that one (unlike with `emote`).",
                )
                .owner_only()
                .delete_invoking_message()
                .arg(TrGreedy::new(|token: &str| Some(token.to_string())).named("names"))
                .execute(SendEmote),
            CommandDescriptor::builder("sebd")
                .aliases(&["sendembed"])
                .description("Sends an embed. Only my owner can use this.")
                .extended_description(
                    "Sends a message embed to the command user's channel. `color` is a decimal \
                     RGB value.",
                )
                .owner_only()
                .delete_invoking_message()
                .arg(TrWord::new().named("title"))
                .arg(TrWord::new().named("description"))
                .arg(TrInt::optional(i64::from(EMBED_COLOR)).named("color"))
                .execute(SendEmbed),
            CommandDescriptor::builder("regex")
                .aliases(&["testregex", "regularexpression"])
                .description("Tests a regex against some cases.")
                .extended_description(
                    "Attempts to match each of `cases` in full against `regex`, reporting which \
                     ones matched and their groups. Owner only to prevent expensive patterns.",
                )
                .owner_only()
                .arg(TrWord::new().named("regex"))
                .arg(TrGreedy::new(|token: &str| Some(token.to_string())).named("cases"))
                .execute(TestRegex),
            CommandDescriptor::builder("shutdown")
                .description("Shuts down the bot. Only my owner can use this.")
                .extended_description(
                    "Shuts down the bot process. I wait two seconds and disconnect from Discord, \
                     then wait another second and terminate myself.",
                )
                .owner_only()
                .execute(Shutdown {
                    grace: self.shutdown_grace,
                    settle: self.shutdown_settle,
                }),
        ]
    }
}

struct SendMessage;

#[async_trait]
impl CommandHandler for SendMessage {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let content = args.get::<String>(0)?;
        if content.is_empty() {
            ctx.reply_error("I can't send an empty message!").await?;
            return Ok(());
        }
        ctx.reply(content).await?;
        Ok(())
    }
}

struct SendEmote;

#[async_trait]
impl CommandHandler for SendEmote {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let names = args.get::<Vec<String>>(0)?;

        let mut mentions = Vec::new();
        for name in names.iter().filter(|n| !n.is_empty()) {
            if let Some(emote) = ctx.platform().find_emote(name).await {
                mentions.push(emote.mention());
            }
        }

        if mentions.is_empty() {
            ctx.reply_error("I don't have any of those emotes!").await?;
            return Ok(());
        }
        ctx.reply(mentions.join(" ")).await?;
        Ok(())
    }
}

struct SendEmbed;

#[async_trait]
impl CommandHandler for SendEmbed {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let title = args.get::<String>(0)?;
        let description = args.get::<String>(1)?;
        let Ok(color) = u32::try_from(*args.get::<i64>(2)?) else {
            ctx.reply_error("That color isn't valid!").await?;
            return Ok(());
        };

        let embed = Embed::new()
            .title(title.clone())
            .description(description)
            .color(color);
        ctx.reply_embed(embed).await?;
        Ok(())
    }
}

/// `[whole, group1, ...]` for a full match of `case`, unmatched groups empty
pub fn full_match_groups(regex: &Regex, case: &str) -> Option<Vec<String>> {
    let captures = regex.captures(case)?;
    Some(
        captures
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect(),
    )
}

struct TestRegex;

#[async_trait]
impl CommandHandler for TestRegex {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let pattern = args.get::<String>(0)?;
        let cases = args.get::<Vec<String>>(1)?;

        let anchored = match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(regex) => regex,
            Err(e) => {
                info!("[{}] Rejected regex {pattern:?}: {e}", ctx.request_id());
                ctx.reply_error("That regex isn't valid!").await?;
                return Ok(());
            }
        };

        let description = cases
            .iter()
            .map(|case| match full_match_groups(&anchored, case) {
                Some(groups) => format!("**{case}**: [{}]", groups.join(", ")),
                None => format!("**{case}**: (no match)"),
            })
            .collect::<Vec<_>>()
            .join("\n");

        let embed = Embed::new()
            .title(format!("{EMOJI_SCALES}  Testing regex **{pattern}**:"))
            .description(description);
        ctx.reply_embed(embed).await?;
        Ok(())
    }
}

struct Shutdown {
    grace: Duration,
    settle: Duration,
}

#[async_trait]
impl CommandHandler for Shutdown {
    async fn execute(&self, ctx: &ExecutionContext, _args: &ArgumentBag) -> Result<()> {
        info!(
            "[{}] Shutdown requested by {}",
            ctx.request_id(),
            ctx.author().id
        );
        if let Err(e) = ctx.reply_success("Goodbye, world...").await {
            warn!("[{}] Failed to say goodbye: {e}", ctx.request_id());
        }

        tokio::time::sleep(self.grace).await;
        ctx.lifecycle().stop_accepting();
        ctx.platform().shutdown().await;

        tokio::time::sleep(self.settle).await;
        ctx.lifecycle().request_termination();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dispatcher::{DispatchOutcome, DispatchState, Dispatcher};
    use crate::commands::error::PolicyRejection;
    use crate::commands::handlers::testing::{invoke, member, owner};
    use crate::commands::registry::CommandRegistry;
    use crate::core::Config;
    use crate::platform::testing::{message_from, FakePlatform, OWNER};
    use crate::platform::Emote;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio::time::timeout;

    fn emote(id: u64, name: &str) -> Emote {
        Emote {
            id,
            name: name.to_string(),
            animated: false,
        }
    }

    #[test]
    fn test_full_match_groups() {
        let regex = Regex::new("^(?:(a+)(b)?)$").unwrap();
        assert_eq!(
            full_match_groups(&regex, "aab"),
            Some(vec!["aab".to_string(), "aa".to_string(), "b".to_string()])
        );
        assert_eq!(
            full_match_groups(&regex, "aa"),
            Some(vec!["aa".to_string(), "aa".to_string(), String::new()])
        );
        assert_eq!(full_match_groups(&regex, "aaba"), None);
    }

    #[tokio::test]
    async fn test_members_cannot_use_owner_commands() {
        let platform = Arc::new(FakePlatform::new());
        let outcome = invoke(&platform, member(), "..smsg hello").await;
        assert_eq!(
            outcome,
            DispatchOutcome::Rejected {
                command: "smsg".to_string(),
                reason: PolicyRejection::OwnerOnly,
            }
        );
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_smsg_echoes_and_deletes() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, owner(), "..sendmsg hello   there\n```rs\nfn main() {}\n```").await;
        assert_eq!(
            platform.sent_text(),
            vec!["hello   there\n```rs\nfn main() {}\n```"]
        );
        assert_eq!(platform.deleted().len(), 1);
    }

    #[tokio::test]
    async fn test_semt_skips_unknown() {
        let platform = Arc::new(FakePlatform::new().with_emotes(vec![emote(5, "bean")]));
        invoke(&platform, owner(), "..semt nope bean").await;
        invoke(&platform, owner(), "..semt nope").await;
        assert_eq!(
            platform.sent_text(),
            vec!["<:bean:5>", "❌ I don't have any of those emotes!"]
        );
    }

    #[tokio::test]
    async fn test_sebd_default_and_custom_color() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, owner(), "..sebd Hi there").await;
        invoke(&platform, owner(), "..sebd Hi there 255").await;
        let sent = platform.sent();
        let first = sent[0].1.embed.clone().unwrap();
        assert_eq!(first.title.as_deref(), Some("Hi"));
        assert_eq!(first.description.as_deref(), Some("there"));
        assert_eq!(first.color, EMBED_COLOR);
        assert_eq!(sent[1].1.embed.clone().unwrap().color, 255);
    }

    #[tokio::test]
    async fn test_sebd_missing_description() {
        let platform = Arc::new(FakePlatform::new());
        let outcome = invoke(&platform, owner(), "..sebd Hi").await;
        assert_eq!(outcome.state(), DispatchState::Failed);
        let sent = platform.sent_text();
        assert!(sent[0].starts_with("❌ Argument `description` is missing"));
        assert!(platform.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_regex_reports_matches() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, owner(), "..regex (a+)b aab  ab\nc").await;
        invoke(&platform, owner(), "..testregex (unclosed x").await;
        let sent = platform.sent_text();
        assert_eq!(
            sent[0],
            "⚖️  Testing regex **(a+)b**:\n**aab**: [aab, aa]\n**ab**: [ab, a]\n**c**: (no match)"
        );
        assert_eq!(sent[1], "❌ That regex isn't valid!");
    }

    #[tokio::test]
    async fn test_shutdown_sequence() {
        let group = OwnerCommands {
            shutdown_grace: Duration::from_millis(10),
            shutdown_settle: Duration::from_millis(10),
        };
        let mut registry = CommandRegistry::new();
        registry.register_group(&group).unwrap();
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(Config::for_owner(OWNER)),
            Arc::new(registry),
        ));
        let platform = Arc::new(FakePlatform::new());

        let outcome = dispatcher
            .dispatch(platform.clone(), message_from(owner(), "..shutdown"))
            .await;
        assert_eq!(outcome.state(), DispatchState::Executed);
        assert_eq!(platform.sent_text(), vec!["✅ Goodbye, world..."]);
        assert!(platform.shut_down.load(Ordering::SeqCst));
        assert!(!dispatcher.lifecycle().is_accepting());
        timeout(Duration::from_secs(1), dispatcher.lifecycle().terminated())
            .await
            .expect("termination should be signalled");

        let late = dispatcher
            .dispatch(platform.clone(), message_from(owner(), "..shutdown"))
            .await;
        assert_eq!(
            late,
            DispatchOutcome::Rejected {
                command: "shutdown".to_string(),
                reason: PolicyRejection::ShuttingDown,
            }
        );
    }
}
