use std::fmt;
use std::io;
use std::path::Path;

use tagcheck_schema::SchemaError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
/// A document was malformed or broke the schema.
pub const DATA_INVALID: i32 = 60;
/// Bad arguments or an unusable schema.
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(path: &Path, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{}: {err}", path.display()))
}

/// Anything wrong with the schema file is a configuration problem.
pub fn schema_error(path: &Path, err: SchemaError) -> CliError {
    CliError::new(USAGE, format!("schema {}: {err}", path.display()))
}
