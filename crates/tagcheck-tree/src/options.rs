/// Key under which element attributes are collected in data trees.
pub const DEFAULT_ATTRIBUTE_KEY: &str = ":a";

/// Key under which text mixed with child elements is kept in data trees.
pub const DEFAULT_TEXT_KEY: &str = "#text";

/// How attributes on a start tag are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    /// Every attribute must carry a quoted value.
    Strict,
    /// Valueless attributes (`<b repeatable>`) are accepted as presence flags.
    Boolean,
}

/// Configuration for markup parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum element nesting depth. `None` (the default) accepts any depth;
    /// scanning and tree building never recurse.
    pub max_depth: Option<usize>,
    /// Key for the attribute mapping of an element. `None` drops attributes.
    pub attribute_key: Option<String>,
    /// Key for text that sits next to child elements.
    pub text_key: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            attribute_key: Some(DEFAULT_ATTRIBUTE_KEY.to_string()),
            text_key: DEFAULT_TEXT_KEY.to_string(),
        }
    }
}

impl ParseOptions {
    /// Options with attributes ignored entirely.
    pub fn without_attributes() -> Self {
        Self {
            attribute_key: None,
            ..Self::default()
        }
    }
}
