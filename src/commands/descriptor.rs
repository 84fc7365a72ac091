//! Command descriptors
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::sync::Arc;

use super::handler::CommandHandler;
use super::transformer::ArgumentTransformer;

/// Immutable metadata and handler for one command
pub struct CommandDescriptor {
    pub name: String,
    pub aliases: Vec<String>,
    pub group: String,
    pub description: String,
    pub extended_description: String,
    pub owner_only: bool,
    pub delete_invoking_message: bool,
    /// Hand the whole remainder to the single expected transformer as one token
    pub suppress_arg_parsing: bool,
    pub expected_arguments: Vec<Box<dyn ArgumentTransformer>>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn builder(name: &str) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    /// Name followed by aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// `prefixname arg [optional]`
    pub fn usage(&self, prefix: &str) -> String {
        let mut usage = format!("{prefix}{}", self.name);
        for argument in &self.expected_arguments {
            usage.push(' ');
            usage.push_str(&argument.usage());
        }
        usage
    }
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("owner_only", &self.owner_only)
            .field("arguments", &self.expected_arguments.len())
            .finish()
    }
}

/// Declarative construction of a [`CommandDescriptor`]
pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    description: String,
    extended_description: String,
    owner_only: bool,
    delete_invoking_message: bool,
    suppress_arg_parsing: bool,
    expected_arguments: Vec<Box<dyn ArgumentTransformer>>,
}

impl CommandBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            aliases: Vec::new(),
            description: String::new(),
            extended_description: String::new(),
            owner_only: false,
            delete_invoking_message: false,
            suppress_arg_parsing: false,
            expected_arguments: Vec::new(),
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases
            .extend(aliases.iter().map(|alias| alias.to_lowercase()));
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn extended_description(mut self, extended: &str) -> Self {
        self.extended_description = extended.to_string();
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    pub fn delete_invoking_message(mut self) -> Self {
        self.delete_invoking_message = true;
        self
    }

    pub fn suppress_arg_parsing(mut self) -> Self {
        self.suppress_arg_parsing = true;
        self
    }

    /// Append the next expected argument
    pub fn arg(mut self, transformer: impl ArgumentTransformer + 'static) -> Self {
        self.expected_arguments.push(Box::new(transformer));
        self
    }

    /// Finish the descriptor with its handler
    pub fn execute(self, handler: impl CommandHandler + 'static) -> CommandDescriptor {
        CommandDescriptor {
            name: self.name,
            aliases: self.aliases,
            group: String::new(),
            description: self.description,
            extended_description: self.extended_description,
            owner_only: self.owner_only,
            delete_invoking_message: self.delete_invoking_message,
            suppress_arg_parsing: self.suppress_arg_parsing,
            expected_arguments: self.expected_arguments,
            handler: Arc::new(handler),
        }
    }
}
