use tagcheck_tree::ParseOptions;

/// Controls validation behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// When false, tags the schema does not declare are reported as `unknown`.
    pub unknown_allow: bool,
    /// Tokens accepted for `type="boolean"`.
    pub boolean: Vec<String>,
    /// How data documents are parsed.
    pub markup: ParseOptions,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            unknown_allow: true,
            boolean: vec!["true".to_string(), "false".to_string()],
            markup: ParseOptions::default(),
        }
    }
}

impl ValidatorConfig {
    /// Whether `token` is one of the configured boolean spellings.
    pub fn is_boolean(&self, token: &str) -> bool {
        self.boolean.iter().any(|accepted| accepted == token)
    }
}
