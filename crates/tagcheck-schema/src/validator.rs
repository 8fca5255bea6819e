use tagcheck_tree::{DataNode, Document, MarkupError};

use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::failure::Failure;
use crate::registry::CheckRegistry;
use crate::rules::RuleModel;
use crate::traverser::Traverser;

/// A compiled schema plus the configuration and custom checks it runs with.
///
/// Validation takes `&self` and keeps no per-call state, so one validator can
/// serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Validator {
    model: RuleModel,
    config: ValidatorConfig,
    checks: CheckRegistry,
}

impl Validator {
    /// Compile `schema` with the default configuration.
    pub fn new(schema: &str) -> Result<Self> {
        Self::with_config(schema, ValidatorConfig::default())
    }

    /// Compile `schema` with `config`. Schema markup is parsed under the same
    /// markup limits as documents.
    pub fn with_config(schema: &str, config: ValidatorConfig) -> Result<Self> {
        let model = RuleModel::compile_with(schema, &config.markup)?;
        tracing::debug!(
            root = model.root_name(),
            rules = model.len(),
            hooks = model.checks().len(),
            "schema compiled"
        );
        Ok(Self::from_model(model, config))
    }

    /// Wrap an already-compiled model.
    pub fn from_model(model: RuleModel, config: ValidatorConfig) -> Self {
        Self {
            model,
            config,
            checks: CheckRegistry::new(),
        }
    }

    /// Register the check a schema names in `checkBy="name"`.
    pub fn register<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn(&DataNode, &str) -> Option<Failure> + Send + Sync + 'static,
    {
        self.checks.register(name, check);
    }

    /// Validate document markup.
    ///
    /// `Ok` carries every failure found, empty for a valid document. `Err`
    /// means validation could not run at all: malformed markup, or a
    /// `checkBy` hook with nothing registered under its name.
    pub fn validate(&self, document: &str) -> Result<Vec<Failure>> {
        let document = Document::parse(document, &self.config.markup)?;
        self.validate_node(document.tree())
    }

    /// Validate raw bytes, which must be UTF-8 markup.
    pub fn validate_bytes(&self, bytes: &[u8]) -> Result<Vec<Failure>> {
        let text = std::str::from_utf8(bytes).map_err(MarkupError::from)?;
        self.validate(text)
    }

    /// Validate an already-built tree: a mapping of the root tag name to the
    /// root node, as produced by [`Document::tree`].
    pub fn validate_node(&self, tree: &DataNode) -> Result<Vec<Failure>> {
        let failures = Traverser::new(&self.config, &self.checks).traverse(tree, &self.model)?;
        tracing::debug!(failures = failures.len(), "document validated");
        Ok(failures)
    }

    pub fn model(&self) -> &RuleModel {
        &self.model
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn checks(&self) -> &CheckRegistry {
        &self.checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaError;

    const SCHEMA: &str = r#"<root><a type="integer" min="1"/><b nillable="false"/></root>"#;

    #[test]
    fn valid_document_has_no_failures() {
        let validator = Validator::new(SCHEMA).unwrap();
        assert!(validator.validate("<root><a>4</a><b>x</b></root>").unwrap().is_empty());
    }

    #[test]
    fn failures_are_collected_not_raised() {
        let validator = Validator::new(SCHEMA).unwrap();
        let failures = validator.validate("<root><a>0</a></root>").unwrap();
        assert_eq!(
            failures,
            vec![
                Failure::missing("root.b"),
                Failure::predicate("min", "root.a", 0, 1),
            ]
        );
    }

    #[test]
    fn malformed_document_is_an_error() {
        let validator = Validator::new(SCHEMA).unwrap();
        assert!(matches!(
            validator.validate("<root><a></root>"),
            Err(SchemaError::Markup(_))
        ));
        assert!(matches!(
            validator.validate_bytes(&[0x3c, 0xff, 0x3e]),
            Err(SchemaError::Markup(MarkupError::NotText(_)))
        ));
    }

    #[test]
    fn registered_check_runs() {
        let mut validator = Validator::new(r#"<root><a checkBy="odd"/></root>"#).unwrap();
        assert!(matches!(
            validator.validate("<root><a>2</a></root>"),
            Err(SchemaError::UnregisteredCheck { .. })
        ));

        validator.register("odd", |node, path| match node.as_scalar() {
            Some(value) if value.parse::<i64>().is_ok_and(|n| n % 2 == 1) => None,
            _ => Some(Failure::new("not odd", path)),
        });
        assert_eq!(validator.checks().names(), vec!["odd"]);
        assert_eq!(
            validator.validate("<root><a>2</a></root>").unwrap(),
            vec![Failure::new("not odd", "root.a")]
        );
        assert!(validator.validate("<root><a>3</a></root>").unwrap().is_empty());
    }

    #[test]
    fn validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }
}
