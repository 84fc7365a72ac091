//! Command registry
//!
//! Built once at startup from explicit command group registrations, then shared
//! read-only behind an `Arc`.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Case-insensitive aliases, duplicate detection, command groups
//! - 1.0.0: Name lookup for prefix commands

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::descriptor::CommandDescriptor;
use super::error::RegistryError;
use super::handler::CommandGroup;

/// Registry mapping every command name and alias to its descriptor
///
/// # Example
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
/// registry.register_group(&FunCommands)?;
/// let registry = Arc::new(registry);
///
/// if let Some(descriptor) = registry.resolve("COIN") {
///     assert_eq!(descriptor.name, "flip");
/// }
/// ```
#[derive(Default)]
pub struct CommandRegistry {
    lookup: HashMap<String, Arc<CommandDescriptor>>,
    commands: Vec<Arc<CommandDescriptor>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its name and aliases
    ///
    /// Fails without modifying the registry if any of those names is taken or
    /// repeated within the descriptor.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        let mut names: Vec<String> = Vec::new();
        for name in descriptor.names() {
            let name = name.to_lowercase();
            if self.lookup.contains_key(&name) || names.contains(&name) {
                return Err(RegistryError::DuplicateName {
                    name,
                    command: descriptor.name.clone(),
                });
            }
            names.push(name);
        }

        let descriptor = Arc::new(descriptor);
        for name in names {
            self.lookup.insert(name, Arc::clone(&descriptor));
        }
        self.commands.push(descriptor);
        Ok(())
    }

    /// Register every command of a group, tagging each with the group name
    pub fn register_group(&mut self, group: &dyn CommandGroup) -> Result<(), RegistryError> {
        let commands = group.commands();
        debug!(
            "Registering {} commands from group {}",
            commands.len(),
            group.name()
        );
        for mut descriptor in commands {
            descriptor.group = group.name().to_string();
            self.register(descriptor)?;
        }
        Ok(())
    }

    /// Case-insensitive lookup by name or alias
    pub fn resolve(&self, token: &str) -> Option<Arc<CommandDescriptor>> {
        self.lookup.get(&token.to_lowercase()).cloned()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.lookup.contains_key(&token.to_lowercase())
    }

    /// Descriptors in registration order
    pub fn commands(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.commands.iter()
    }

    /// Number of commands (not names)
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::arguments::ArgumentBag;
    use crate::commands::context::ExecutionContext;
    use crate::commands::handler::CommandHandler;
    use anyhow::Result;
    use async_trait::async_trait;

    struct MockHandler;

    #[async_trait]
    impl CommandHandler for MockHandler {
        async fn execute(&self, _ctx: &ExecutionContext, _args: &ArgumentBag) -> Result<()> {
            Ok(())
        }
    }

    fn command(name: &str, aliases: &[&str]) -> CommandDescriptor {
        CommandDescriptor::builder(name)
            .aliases(aliases)
            .execute(MockHandler)
    }

    struct TwoCommands;

    impl CommandGroup for TwoCommands {
        fn name(&self) -> &'static str {
            "Pair"
        }

        fn commands(&self) -> Vec<CommandDescriptor> {
            vec![command("first", &["one"]), command("second", &["two"])]
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_resolve_name_and_alias_case_insensitive() {
        let mut registry = CommandRegistry::new();
        registry
            .register(command("flip", &["coin", "flipcoin"]))
            .unwrap();

        for token in ["flip", "FLIP", "Coin", "flipcoin"] {
            assert_eq!(registry.resolve(token).unwrap().name, "flip");
        }
        assert!(registry.resolve("roll").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_alias_rejected_atomically() {
        let mut registry = CommandRegistry::new();
        registry.register(command("emote", &["emotes"])).unwrap();

        let err = registry
            .register(command("semt", &["sendemote", "EMOTES"]))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateName {
                name: "emotes".to_string(),
                command: "semt".to_string(),
            }
        );
        assert!(!registry.contains("semt"));
        assert!(!registry.contains("sendemote"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_alias_colliding_with_name_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(command("roll", &[])).unwrap();
        assert!(registry.register(command("dice", &["roll"])).is_err());
        assert!(!registry.contains("dice"));
    }

    #[test]
    fn test_self_duplicate_rejected() {
        let mut registry = CommandRegistry::new();
        assert!(registry.register(command("pick", &["pick"])).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_group_sets_group_name() {
        let mut registry = CommandRegistry::new();
        registry.register_group(&TwoCommands).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.commands().all(|c| c.group == "Pair"));
        assert_eq!(
            registry.commands().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["first", "second"]
        );
        assert_eq!(registry.resolve("two").unwrap().name, "second");
    }
}
