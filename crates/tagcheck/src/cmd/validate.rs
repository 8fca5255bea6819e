use tagcheck_schema::{SchemaError, Validator};

use crate::cmd::{read_bounded, read_schema, ValidateArgs};
use crate::exit::{schema_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_reports, DocumentReport, OutputFormat};

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = read_schema(&args.schema, args.input.max_size)?;
    let validator = Validator::with_config(&schema, args.config())
        .map_err(|err| schema_error(&args.schema, err))?;

    // The binary has no way to supply custom validators.
    if let Some(hook) = validator.model().checks().first() {
        return Err(CliError::new(
            USAGE,
            format!(
                "schema {}: checkBy=\"{}\" at {} needs a custom validator; use the library API",
                args.schema.display(),
                hook.name,
                hook.path
            ),
        ));
    }

    let mut reports = Vec::with_capacity(args.documents.len());
    for path in &args.documents {
        let name = path.display().to_string();
        let report = match read_bounded(path, args.input.max_size) {
            Ok(bytes) => match validator.validate_bytes(&bytes) {
                Ok(failures) => DocumentReport::checked(name, failures),
                Err(SchemaError::Markup(err)) => DocumentReport::rejected(name, err.to_string()),
                Err(err) => return Err(schema_error(&args.schema, err)),
            },
            Err(err) if err.code == DATA_INVALID => DocumentReport::rejected(name, err.message),
            Err(err) => return Err(err),
        };
        tracing::info!(
            document = %report.document,
            valid = report.valid,
            failures = report.failures.len(),
            "validated"
        );
        reports.push(report);
    }

    print_reports(&reports, format);

    if reports.iter().all(|report| report.valid) {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}
