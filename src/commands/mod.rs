//! # Command System
//!
//! Prefix command dispatch: transformers decode arguments, the registry resolves
//! names and aliases, and the dispatcher runs each invocation on its own task.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Prefix commands with typed argument transformers, paginated replies
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod arguments;
pub mod context;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod lifecycle;
pub mod paginator;
pub mod registry;
pub mod transformer;

pub use arguments::{decode_arguments, ArgumentBag};
pub use context::ExecutionContext;
pub use descriptor::{CommandBuilder, CommandDescriptor};
pub use dispatcher::{DispatchOutcome, DispatchState, Dispatcher};
pub use error::{ArgumentError, ParseFailure, ParseFailureReason, PolicyRejection, RegistryError};
pub use handler::{CommandGroup, CommandHandler};
pub use handlers::build_registry;
pub use lifecycle::Lifecycle;
pub use paginator::{Navigation, NavigationRequest, PageAction, Paginator, PaginatorStore};
pub use registry::CommandRegistry;
pub use transformer::{
    ArgumentTransformer, TokenCursor, TrBigInt, TrGreedy, TrInt, TrRest, TrSplit, TrUser, TrWord,
    TransformContext, Transformer, UserSearchResult,
};
