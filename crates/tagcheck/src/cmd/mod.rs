use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use tagcheck_schema::ValidatorConfig;
use tagcheck_tree::ParseOptions;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, USAGE};
use crate::output::OutputFormat;

pub mod check;
pub mod rules;
pub mod validate;
pub mod version;

/// Default cap on the size of any file read.
pub const DEFAULT_MAX_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate documents against a schema.
    Validate(ValidateArgs),
    /// Check documents for well-formedness only.
    Check(CheckArgs),
    /// Print the compiled rules of a schema.
    Rules(RulesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Rules(args) => rules::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Limits applied to every file read and parsed.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Maximum element nesting depth. Unbounded unless set.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
    /// Maximum file size (e.g. 65536, 512KiB, 16MiB).
    #[arg(long, value_name = "SIZE", default_value = "16MiB", value_parser = parse_size)]
    pub max_size: u64,
}

impl InputArgs {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
            ..ParseOptions::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file.
    #[arg(long, short = 's', value_name = "FILE", env = "TAGCHECK_SCHEMA")]
    pub schema: PathBuf,
    /// Documents to validate.
    #[arg(required = true, value_name = "DOC")]
    pub documents: Vec<PathBuf>,
    /// Report tags the schema does not declare.
    #[arg(long)]
    pub deny_unknown: bool,
    /// Accepted boolean spellings (comma-separated). Default: true,false.
    #[arg(long, value_delimiter = ',', value_name = "TOKENS")]
    pub boolean: Option<Vec<String>>,
    #[command(flatten)]
    pub input: InputArgs,
}

impl ValidateArgs {
    pub fn config(&self) -> ValidatorConfig {
        let defaults = ValidatorConfig::default();
        ValidatorConfig {
            unknown_allow: !self.deny_unknown,
            boolean: self.boolean.clone().unwrap_or(defaults.boolean),
            markup: self.input.parse_options(),
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Documents to check.
    #[arg(required = true, value_name = "FILE")]
    pub documents: Vec<PathBuf>,
    /// Reject attributes written without a value.
    #[arg(long)]
    pub strict_attributes: bool,
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Schema file.
    #[arg(long, short = 's', value_name = "FILE", env = "TAGCHECK_SCHEMA")]
    pub schema: PathBuf,
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read a whole file, refusing anything larger than `max_size` bytes.
pub fn read_bounded(path: &Path, max_size: u64) -> CliResult<Vec<u8>> {
    let file = File::open(path).map_err(|err| io_error(path, err))?;
    let mut bytes = Vec::new();
    file.take(max_size.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|err| io_error(path, err))?;

    if bytes.len() as u64 > max_size {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{}: larger than {max_size} bytes", path.display()),
        ));
    }
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read input");
    Ok(bytes)
}

/// Read a schema file as text. Every problem with it is a usage error.
pub fn read_schema(path: &Path, max_size: u64) -> CliResult<String> {
    let bytes = read_bounded(path, max_size).map_err(|err| match err.code {
        DATA_INVALID => CliError::new(USAGE, format!("schema {}", err.message)),
        _ => err,
    })?;
    String::from_utf8(bytes).map_err(|err| {
        CliError::new(
            USAGE,
            format!("schema {}: not a valid string: {err}", path.display()),
        )
    })
}

fn parse_size(input: &str) -> Result<u64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("size must not be empty".to_string());
    }

    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid size value: {input}"))?;
    let scale: u64 = match unit.trim() {
        "" | "B" => 1,
        "K" | "KB" | "KiB" => 1024,
        "M" | "MB" | "MiB" => 1024 * 1024,
        "G" | "GB" | "GiB" => 1024 * 1024 * 1024,
        other => return Err(format!("unsupported size unit: {other}")),
    };

    match value.checked_mul(scale) {
        Some(0) => Err("size must be greater than zero".to_string()),
        Some(bytes) => Ok(bytes),
        None => Err(format!("size too large: {input}")),
    }
}
