use tagcheck_tree::MarkupError;

/// Fatal errors: author mistakes in the schema, the document or the caller's
/// setup. Data problems are never reported here; they come back as failures.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema or document text is empty, not text, or not well-formed.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// A schema tag declares a `type` outside the supported set.
    #[error("unsupported data type in rules at {path}: {name}")]
    UnsupportedType { path: String, name: String },

    /// A schema tag carries an attribute with a value that cannot be used.
    #[error("invalid value for '{attribute}' at {path}: {reason}")]
    InvalidAttribute {
        path: String,
        attribute: String,
        reason: String,
    },

    /// A schema tag carries an attribute the rule language does not define.
    #[error("unsupported attribute '{attribute}' at {path}")]
    UnknownAttribute { path: String, attribute: String },

    /// More than one pattern attribute on one tag, or flags without a pattern.
    #[error("ambiguous pattern declaration at {path}: {reason}")]
    AmbiguousPattern { path: String, reason: String },

    /// The pattern does not compile as a regular expression.
    #[error("invalid pattern at {path}: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },

    /// A tag with children declares a scalar type.
    #[error("rule at {path} has children but declares type '{name}'")]
    ConflictingShape { path: String, name: String },

    /// Two sibling schema tags share a name.
    #[error("duplicate rule for {path}")]
    DuplicateRule { path: String },

    /// A `checkBy` hook names a validator that was never registered.
    #[error("no custom validator registered as '{name}' (used at {path})")]
    UnregisteredCheck { name: String, path: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
