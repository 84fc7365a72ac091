//! Built-in command groups
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 3.0.0: Prefix command groups (Fun, Owner, Utility) registered through `CommandGroup`
//! - 2.0.0: `build_registry` fails startup on duplicate names or aliases
//! - 1.0.0: Fun and Utility groups

pub mod fun;
pub mod owner;
pub mod utility;

use super::error::RegistryError;
use super::handler::CommandGroup;
use super::registry::CommandRegistry;

pub use fun::FunCommands;
pub use owner::OwnerCommands;
pub use utility::UtilityCommands;

/// Every built-in group, in help order
pub fn all_groups() -> Vec<Box<dyn CommandGroup>> {
    vec![
        Box::new(FunCommands),
        Box::new(UtilityCommands),
        Box::new(OwnerCommands::default()),
    ]
}

/// Registry holding every built-in command
///
/// Fails on the first duplicate name or alias.
pub fn build_registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    for group in all_groups() {
        registry.register_group(group.as_ref())?;
    }
    Ok(registry)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use super::build_registry;
    use crate::commands::dispatcher::{DispatchOutcome, Dispatcher};
    use crate::core::Config;
    use crate::platform::testing::{message_from, user, FakePlatform, OWNER};
    use crate::platform::UserRef;

    pub fn member() -> UserRef {
        user(7, "bean", 1)
    }

    pub fn owner() -> UserRef {
        user(OWNER.0, "owner", 1)
    }

    /// Dispatch `content` from `author` through the full built-in registry
    pub async fn invoke(
        platform: &Arc<FakePlatform>,
        author: UserRef,
        content: &str,
    ) -> DispatchOutcome {
        let registry = build_registry().unwrap();
        let dispatcher = Dispatcher::new(Arc::new(Config::for_owner(OWNER)), Arc::new(registry));
        dispatcher
            .dispatch(platform.clone(), message_from(author, content))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_do_not_collide() {
        let registry = build_registry().unwrap();
        assert!(registry.len() >= 15);
        for name in ["coin", "dice", "choose", "sendemote", "emotes", "h", "userinfo"] {
            assert!(registry.contains(name), "missing alias {name}");
        }
    }

    #[test]
    fn test_groups_are_tagged() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.resolve("flip").unwrap().group, "Fun");
        assert_eq!(registry.resolve("shutdown").unwrap().group, "Owner");
        assert_eq!(registry.resolve("help").unwrap().group, "Utility");
        assert!(registry
            .commands()
            .filter(|c| c.group == "Owner")
            .all(|c| c.owner_only));
    }
}
