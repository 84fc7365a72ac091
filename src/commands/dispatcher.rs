//! Command dispatcher
//!
//! Drives one inbound message through
//! `Received → Parsed → Authorized → ArgumentsDecoded → Executed | Rejected | Failed`.
//! Non-commands, unknown commands and owner-only violations are dropped silently;
//! argument errors and handler failures are answered in the invoking channel.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::arguments::decode_arguments;
use super::context::ExecutionContext;
use super::error::{ParseFailure, PolicyRejection};
use super::lifecycle::Lifecycle;
use super::paginator::PaginatorStore;
use super::registry::CommandRegistry;
use super::transformer::TransformContext;
use crate::core::Config;
use crate::platform::{ChatPlatform, InboundMessage, OutboundMessage};

/// Generic reply when a handler fails
pub const HANDLER_FAILURE_REPLY: &str =
    "❌ Something went wrong while running that command. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Received,
    Parsed,
    Authorized,
    ArgumentsDecoded,
    Executed,
    Rejected,
    Failed,
}

/// Where a dispatch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not addressed to the bot
    Ignored,
    /// Prefixed, but no such command
    Unresolved { command: String },
    Rejected {
        command: String,
        reason: PolicyRejection,
    },
    InvalidArguments {
        command: String,
        failure: ParseFailure,
    },
    Executed { command: String },
    Failed { command: String },
}

impl DispatchOutcome {
    /// Last state the state machine reached
    pub fn state(&self) -> DispatchState {
        match self {
            DispatchOutcome::Ignored => DispatchState::Received,
            DispatchOutcome::Unresolved { .. } => DispatchState::Parsed,
            DispatchOutcome::Rejected { .. } => DispatchState::Rejected,
            DispatchOutcome::InvalidArguments { .. } => DispatchState::Failed,
            DispatchOutcome::Executed { .. } => DispatchState::Executed,
            DispatchOutcome::Failed { .. } => DispatchState::Failed,
        }
    }
}

pub struct Dispatcher {
    config: Arc<Config>,
    registry: Arc<CommandRegistry>,
    paginators: Arc<PaginatorStore>,
    lifecycle: Arc<Lifecycle>,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>, registry: Arc<CommandRegistry>) -> Self {
        let paginators = Arc::new(PaginatorStore::new(config.paginator_timeout));
        Self {
            config,
            registry,
            paginators,
            lifecycle: Arc::new(Lifecycle::new()),
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn paginators(&self) -> &Arc<PaginatorStore> {
        &self.paginators
    }

    pub fn lifecycle(&self) -> &Arc<Lifecycle> {
        &self.lifecycle
    }

    /// Split `..name rest of line` into `("name", "rest of line")`
    pub fn parse_invocation<'a>(&self, content: &'a str) -> Option<(String, &'a str)> {
        let body = content.trim_start().strip_prefix(self.config.prefix.as_str())?;
        let body = body.trim_start();
        let (name, remainder) = match body.find(char::is_whitespace) {
            Some(index) => (&body[..index], &body[index..]),
            None => (body, ""),
        };
        if name.is_empty() {
            return None;
        }
        Some((name.to_lowercase(), remainder.trim_start()))
    }

    /// Dispatch on its own task so slow handlers never hold up the event loop
    pub fn spawn(
        self: &Arc<Self>,
        platform: Arc<dyn ChatPlatform>,
        event: InboundMessage,
    ) -> JoinHandle<DispatchOutcome> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move { dispatcher.dispatch(platform, event).await })
    }

    pub async fn dispatch(
        &self,
        platform: Arc<dyn ChatPlatform>,
        event: InboundMessage,
    ) -> DispatchOutcome {
        // Received
        if event.author.bot || event.content.trim().is_empty() {
            return DispatchOutcome::Ignored;
        }
        let Some((name, remainder)) = self.parse_invocation(&event.content) else {
            return DispatchOutcome::Ignored;
        };
        let remainder = remainder.to_string();
        let request_id = Uuid::new_v4();

        // Parsed
        let Some(descriptor) = self.registry.resolve(&name) else {
            debug!("[{request_id}] Unknown command {name} from {}", event.author.id);
            return DispatchOutcome::Unresolved { command: name };
        };
        let command = descriptor.name.clone();
        info!(
            "[{request_id}] 🎯 Command {command} | User: {} | Channel: {} | Args: '{}'",
            event.author.id,
            event.channel_id,
            remainder.chars().take(100).collect::<String>()
        );

        // Authorized
        if !self.lifecycle.is_accepting() {
            info!("[{request_id}] Dropping {command}: shutting down");
            return DispatchOutcome::Rejected {
                command,
                reason: PolicyRejection::ShuttingDown,
            };
        }
        if descriptor.owner_only && event.author.id != self.config.owner_id {
            info!(
                "[{request_id}] 🚫 {} tried owner-only command {command}",
                event.author.id
            );
            return DispatchOutcome::Rejected {
                command,
                reason: PolicyRejection::OwnerOnly,
            };
        }

        // ArgumentsDecoded
        let decoded = {
            let ctx = TransformContext {
                platform: platform.as_ref(),
                event: &event,
            };
            decode_arguments(
                &descriptor.expected_arguments,
                &remainder,
                descriptor.suppress_arg_parsing,
                &ctx,
            )
            .await
        };
        let args = match decoded {
            Ok(args) => args,
            Err(failure) => {
                debug!("[{request_id}] Argument error for {command}: {failure}");
                let reply = format!(
                    "❌ {failure}\nUsage: `{}`",
                    descriptor.usage(&self.config.prefix)
                );
                if let Err(e) = platform
                    .send(event.channel_id, OutboundMessage::text(reply))
                    .await
                {
                    warn!("[{request_id}] Failed to send argument error: {e}");
                }
                return DispatchOutcome::InvalidArguments { command, failure };
            }
        };

        // Executed
        let invoking = event.handle();
        let author = event.author.id;
        let ctx = ExecutionContext::new(
            request_id,
            event,
            Arc::clone(&platform),
            Arc::clone(&self.config),
            Arc::clone(&self.registry),
            Arc::clone(&self.paginators),
            Arc::clone(&self.lifecycle),
        );
        let handler = Arc::clone(&descriptor.handler);
        let task = tokio::spawn(async move { handler.execute(&ctx, &args).await });

        let outcome = match task.await {
            Ok(Ok(())) => {
                info!("[{request_id}] ✅ Command {command} completed");
                DispatchOutcome::Executed { command }
            }
            Ok(Err(e)) => {
                error!("[{request_id}] ❌ Command {command} from {author} failed: {e:?}");
                self.report_failure(platform.as_ref(), invoking.channel_id, request_id)
                    .await;
                DispatchOutcome::Failed { command }
            }
            Err(join_error) => {
                error!("[{request_id}] ❌ Command {command} from {author} panicked: {join_error}");
                self.report_failure(platform.as_ref(), invoking.channel_id, request_id)
                    .await;
                DispatchOutcome::Failed { command }
            }
        };

        if descriptor.delete_invoking_message {
            if let Err(e) = platform.delete_message(invoking).await {
                warn!(
                    "[{request_id}] Could not delete invoking message {}: {e}",
                    invoking.message_id
                );
            }
        }

        outcome
    }

    async fn report_failure(
        &self,
        platform: &dyn ChatPlatform,
        channel: crate::platform::ChannelId,
        request_id: Uuid,
    ) {
        if let Err(e) = platform
            .send(channel, OutboundMessage::text(HANDLER_FAILURE_REPLY))
            .await
        {
            error!("[{request_id}] Failed to send error message: {e}");
        }
    }
}
