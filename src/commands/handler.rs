//! Command handler and command group traits
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Handlers receive an execution context and decoded argument bag
//! - 1.0.0: `CommandHandler` over raw argument text

use anyhow::Result;
use async_trait::async_trait;

use super::arguments::ArgumentBag;
use super::context::ExecutionContext;
use super::descriptor::CommandDescriptor;

/// Body of a single command
///
/// # Example
///
/// ```ignore
/// struct Ping;
///
/// #[async_trait]
/// impl CommandHandler for Ping {
///     async fn execute(&self, ctx: &ExecutionContext, _args: &ArgumentBag) -> Result<()> {
///         ctx.reply("Pong!").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()>;
}

/// A named set of commands registered together at startup
pub trait CommandGroup {
    fn name(&self) -> &'static str;

    fn commands(&self) -> Vec<CommandDescriptor>;
}
