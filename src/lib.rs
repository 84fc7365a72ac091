// Core layer - shared types and configuration
pub mod core;

// Platform layer - chat platform trait and the serenity adapter
pub mod platform;

// UI components
pub mod message_components;

// Application layer
pub mod commands;

pub use core::Config;

pub use commands::{build_registry, CommandRegistry, DispatchOutcome, Dispatcher};
pub use platform::{ChatPlatform, InboundMessage};
