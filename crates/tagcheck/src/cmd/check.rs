use serde::Serialize;
use tagcheck_tree::{check_well_formed, AttributeMode, MarkupError};

use crate::cmd::{read_bounded, CheckArgs};
use crate::exit::{CliResult, DATA_INVALID, SUCCESS};
use crate::output::{new_table, print_json_lines, OutputFormat};

#[derive(Debug, Serialize)]
struct CheckOutput {
    document: String,
    well_formed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
}

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let options = args.input.parse_options();
    let mode = if args.strict_attributes {
        AttributeMode::Strict
    } else {
        AttributeMode::Boolean
    };
    let mut results = Vec::with_capacity(args.documents.len());

    for path in &args.documents {
        let document = path.display().to_string();
        let bytes = match read_bounded(path, args.input.max_size) {
            Ok(bytes) => bytes,
            Err(err) if err.code == DATA_INVALID => {
                results.push(CheckOutput {
                    document,
                    well_formed: false,
                    error: Some(err.message),
                    line: None,
                });
                continue;
            }
            Err(err) => return Err(err),
        };

        let outcome = std::str::from_utf8(&bytes)
            .map_err(MarkupError::from)
            .and_then(|text| check_well_formed(text, mode, &options));
        results.push(match outcome {
            Ok(()) => CheckOutput {
                document,
                well_formed: true,
                error: None,
                line: None,
            },
            Err(err) => CheckOutput {
                document,
                well_formed: false,
                line: err.line(),
                error: Some(err.to_string()),
            },
        });
    }

    print_results(&results, format);

    if results.iter().all(|result| result.well_formed) {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

fn print_results(results: &[CheckOutput], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json_lines(results),
        OutputFormat::Table => {
            let mut table = new_table(vec!["DOCUMENT", "STATUS", "LINE", "ERROR"]);
            for result in results {
                table.add_row(vec![
                    result.document.clone(),
                    status(result).to_string(),
                    result.line.map(|l| l.to_string()).unwrap_or_default(),
                    result.error.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for result in results {
                match &result.error {
                    Some(error) => println!("{}: {error}", result.document),
                    None => println!("{}: ok", result.document),
                }
            }
        }
        OutputFormat::Raw => {
            for result in results {
                println!("{}\t{}", result.document, status(result));
            }
        }
    }
}

fn status(result: &CheckOutput) -> &'static str {
    if result.well_formed {
        "ok"
    } else {
        "malformed"
    }
}
