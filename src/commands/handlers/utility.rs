//! Utility command group
//!
//! Handles: help, whois, ping
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Prefix commands; paginated help built from the registry
//! - 1.0.0: Extracted from command_handler.rs

use anyhow::Result;
use async_trait::async_trait;
use std::time::Instant;

use crate::commands::arguments::ArgumentBag;
use crate::commands::context::ExecutionContext;
use crate::commands::descriptor::CommandDescriptor;
use crate::commands::handler::{CommandGroup, CommandHandler};
use crate::commands::registry::CommandRegistry;
use crate::commands::transformer::{TrUser, TrWord, UserSearchResult};
use crate::core::{paginate_lines, Embed};
use crate::platform::OutboundMessage;

/// Commands listed per help page
const HELP_PAGE_SIZE: usize = 10;

pub struct UtilityCommands;

impl CommandGroup for UtilityCommands {
    fn name(&self) -> &'static str {
        "Utility"
    }

    fn commands(&self) -> Vec<CommandDescriptor> {
        vec![
            CommandDescriptor::builder("help")
                .aliases(&["commands", "h"])
                .description("Lists my commands or explains one of them.")
                .extended_description(
                    "Without an argument, lists every command I know. With a `command` name or \
                     alias, shows what that command does, how to use it and its aliases.",
                )
                .arg(TrWord::optional("").named("command"))
                .execute(Help),
            CommandDescriptor::builder("whois")
                .aliases(&["user", "userinfo"])
                .description("Shows information about a user.")
                .extended_description(
                    "Looks up `user` by ID, `name#1234` tag, mention or name and shows what I \
                     know about them. Without an argument, shows information about you.",
                )
                .arg(TrUser::optional())
                .execute(Whois),
            CommandDescriptor::builder("ping")
                .description("Checks that I'm awake.")
                .extended_description("Replies and reports how long sending the reply took.")
                .execute(Ping),
        ]
    }
}

/// One line per command, in registration order
pub fn help_lines(registry: &CommandRegistry, prefix: &str) -> Vec<String> {
    registry
        .commands()
        .map(|command| {
            format!(
                "**{}** `{prefix}{}`: {}",
                command.group, command.name, command.description
            )
        })
        .collect()
}

/// Detailed help for one command
pub fn command_help(command: &CommandDescriptor, prefix: &str) -> Embed {
    let details = if command.extended_description.is_empty() {
        command.description.as_str()
    } else {
        command.extended_description.as_str()
    };
    let aliases = if command.aliases.is_empty() {
        "(none)".to_string()
    } else {
        command.aliases.join(", ")
    };
    let owner_note = if command.owner_only {
        "\n*Only my owner can use this.*"
    } else {
        ""
    };

    Embed::new()
        .title(format!("📖  `{prefix}{}`", command.name))
        .description(format!(
            "`{}`\n\n{details}\n\n**Aliases**: {aliases}{owner_note}",
            command.usage(prefix)
        ))
}

struct Help;

#[async_trait]
impl CommandHandler for Help {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let prefix = ctx.config().prefix.clone();
        let query = args.get::<String>(0)?;

        if !query.is_empty() {
            match ctx.registry().resolve(query) {
                Some(command) => {
                    ctx.reply_embed(command_help(&command, &prefix)).await?;
                }
                None => {
                    ctx.reply_error(format!("I don't have a command called `{query}`!"))
                        .await?;
                }
            }
            return Ok(());
        }

        let lines = help_lines(ctx.registry(), &prefix);
        let pages = paginate_lines(&lines, HELP_PAGE_SIZE)
            .into_iter()
            .map(|page| format!("{page}\n\nUse `{prefix}help command` for details."))
            .collect();
        ctx.reply_paginated("📖  My commands", pages).await?;
        Ok(())
    }
}

struct Whois;

#[async_trait]
impl CommandHandler for Whois {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let user = match args.get::<Option<UserSearchResult>>(0)? {
            None => ctx.author().clone(),
            Some(UserSearchResult::Found(user)) => user.clone(),
            Some(UserSearchResult::NotFound) => {
                ctx.reply_error("I can't find that user!").await?;
                return Ok(());
            }
        };

        let embed = Embed::new()
            .title(format!("👤  {}", user.tag()))
            .description(format!(
                "**ID**: {}\n**Mention**: {}\n**Bot**: {}",
                user.id,
                user.mention(),
                if user.bot { "yes" } else { "no" }
            ));
        ctx.reply_embed(embed).await?;
        Ok(())
    }
}

struct Ping;

#[async_trait]
impl CommandHandler for Ping {
    async fn execute(&self, ctx: &ExecutionContext, _args: &ArgumentBag) -> Result<()> {
        let started = Instant::now();
        let handle = ctx.reply("🏓 Pong!").await?;
        let elapsed = started.elapsed().as_millis();
        ctx.platform()
            .edit(handle, OutboundMessage::text(format!("🏓 Pong! `{elapsed}ms`")))
            .await?;
        Ok(())
    }
}
