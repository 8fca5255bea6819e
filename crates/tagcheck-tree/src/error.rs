/// Errors that can occur while scanning or parsing markup.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    /// The input contained nothing but whitespace.
    #[error("empty data")]
    Empty,

    /// The input bytes are not valid UTF-8 text.
    #[error("not a valid string: {0}")]
    NotText(#[from] std::str::Utf8Error),

    /// The underlying reader rejected the markup.
    #[error("{message}:{line}")]
    Malformed { line: usize, message: String },

    /// A second top-level element was found after the root closed.
    #[error("multiple root elements:{line}")]
    MultipleRoots { line: usize },

    /// The input contained no element at all.
    #[error("no root element")]
    NoRoot,

    /// The input ended while an element was still open.
    #[error("unclosed tag '{name}':{line}")]
    Unclosed { name: String, line: usize },

    /// Character data appeared before or after the root element.
    #[error("text outside the root element:{line}")]
    TextOutsideRoot { line: usize },

    /// Element nesting exceeded the configured maximum depth.
    #[error("nesting deeper than {max} elements:{line}")]
    TooDeep { line: usize, max: usize },
}

impl MarkupError {
    /// The 1-based source line the error was detected on, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Malformed { line, .. }
            | Self::MultipleRoots { line }
            | Self::Unclosed { line, .. }
            | Self::TextOutsideRoot { line }
            | Self::TooDeep { line, .. } => Some(*line),
            Self::Empty | Self::NotText(_) | Self::NoRoot => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MarkupError>;
