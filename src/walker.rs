//! Walk a declaration tree in lock-step with a persisted setting.
//!
//! The declaration (from the project manifest) says which variables exist;
//! the persisted setting remembers what they resolved to last time. For
//! every leaf the walker asks a [`Resolver`] for the value, records it in
//! the setting, and adds it to the [`ResolvedEnvironment`].
//!
//! ```text
//! { "db": { "host": "DB host", "port+": "DB port" } }
//!        ↓ walk, resolver answers "localhost", "5432"
//! setting:     { "db": { "host": "localhost", "port": "5432" } }
//! environment: DB_HOST=localhost, DB_PORT=5432
//! ```
//!
//! Interior keys are used verbatim as persisted segments; only leaf keys
//! carry modifiers (see [`LeafKey`]).

use serde_json::{Map, Value};

use crate::env::{ResolvedEnvironment, environment_name};
use crate::error::PromptenvError;
use crate::leaf::LeafKey;
use crate::tree::PersistedSection;
use crate::types::{Resolution, WalkedLeaf};

/// Decides the value of each leaf during a walk.
pub trait Resolver {
    fn resolve(&mut self, leaf: &WalkedLeaf) -> Result<Resolution, PromptenvError>;
}

impl<F> Resolver for F
where
    F: FnMut(&WalkedLeaf) -> Result<Resolution, PromptenvError>,
{
    fn resolve(&mut self, leaf: &WalkedLeaf) -> Result<Resolution, PromptenvError> {
        self(leaf)
    }
}

pub struct ConfigurationWalker<'s> {
    settings: &'s mut PersistedSection,
    environment: ResolvedEnvironment,
}

impl<'s> ConfigurationWalker<'s> {
    pub fn new(settings: &'s mut PersistedSection) -> Self {
        Self {
            settings,
            environment: ResolvedEnvironment::new(),
        }
    }

    /// Resolve every leaf of `declaration`, depth first, in declaration order.
    ///
    /// The first error aborts the walk; the setting may then be partially
    /// updated and should not be saved.
    pub fn walk<R: Resolver + ?Sized>(
        mut self,
        declaration: &Map<String, Value>,
        resolver: &mut R,
    ) -> Result<ResolvedEnvironment, PromptenvError> {
        let mut prefix = Vec::new();
        self.walk_branch(declaration, resolver, &mut prefix)?;
        Ok(self.environment)
    }

    fn walk_branch<R: Resolver + ?Sized>(
        &mut self,
        declaration: &Map<String, Value>,
        resolver: &mut R,
        prefix: &mut Vec<String>,
    ) -> Result<(), PromptenvError> {
        for (key, value) in declaration {
            match value {
                Value::Object(section) => {
                    prefix.push(key.clone());
                    self.walk_branch(section, resolver, prefix)?;
                    prefix.pop();
                }
                Value::Null => {
                    return Err(PromptenvError::NullSection {
                        name: environment_name(prefix.iter().chain([key])),
                    });
                }
                Value::String(prompt) => self.visit_leaf(key, prompt, resolver, prefix)?,
                _ => {
                    return Err(PromptenvError::InvalidDeclaration {
                        name: environment_name(prefix.iter().chain([key])),
                    });
                }
            }
        }
        Ok(())
    }

    fn visit_leaf<R: Resolver + ?Sized>(
        &mut self,
        raw_key: &str,
        prompt: &str,
        resolver: &mut R,
        prefix: &[String],
    ) -> Result<(), PromptenvError> {
        let key = LeafKey::parse(raw_key);
        let head = self.settings.descend(prefix);

        let leaf = WalkedLeaf {
            prompt: prompt.to_string(),
            is_number: key.is_number,
            current_value: head.value(&key.name).map(str::to_string),
            default_value: key.default_value,
            environment_name: environment_name(prefix.iter().chain([&key.name])),
        };

        match resolver.resolve(&leaf)? {
            Resolution::Omit => {
                tracing::debug!(variable = %leaf.environment_name, "omitted");
                head.remove(&key.name);
            }
            Resolution::Value(value) => {
                tracing::debug!(variable = %leaf.environment_name, "resolved");
                head.set_value(&key.name, value.clone());
                self.environment.insert(leaf.environment_name, value);
            }
        }
        Ok(())
    }
}
