use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tagcheck_tree::DataNode;

use crate::error::{Result, SchemaError};
use crate::failure::Failure;
use crate::rules::RuleModel;

/// A caller-supplied check named by a schema `checkBy` hook.
///
/// Receives the node as it appears in the document and its path; returns a
/// failure to report verbatim, or `None` to pass.
pub type CheckFn = dyn Fn(&DataNode, &str) -> Option<Failure> + Send + Sync;

/// Name-keyed registry of custom validators.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: HashMap<String, Arc<CheckFn>>,
}

impl CheckRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check under `name`, replacing any earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn(&DataNode, &str) -> Option<Failure> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(name = %name, "registered custom validator");
        self.checks.insert(name, Arc::new(check));
    }

    pub fn get(&self, name: &str) -> Option<&CheckFn> {
        self.checks.get(name).map(|check| check.as_ref())
    }

    /// Check if a validator is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Fail on the first `checkBy` hook in `model` with no registered check.
    pub fn ensure_covers(&self, model: &RuleModel) -> Result<()> {
        match model.checks().iter().find(|hook| !self.contains(&hook.name)) {
            Some(hook) => Err(SchemaError::UnregisteredCheck {
                name: hook.name.clone(),
                path: hook.path.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("names", &self.names())
            .finish()
    }
}
