use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use tagcheck_schema::Failure;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Outcome of validating one document.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub valid: bool,
    /// Why the document could not be validated at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub failures: Vec<Failure>,
}

impl DocumentReport {
    pub fn checked(document: impl Into<String>, failures: Vec<Failure>) -> Self {
        Self {
            document: document.into(),
            valid: failures.is_empty(),
            error: None,
            failures,
        }
    }

    pub fn rejected(document: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            valid: false,
            error: Some(error.into()),
            failures: Vec::new(),
        }
    }
}

/// One JSON object per line.
pub fn print_json_lines<T: Serialize>(items: &[T]) {
    for item in items {
        println!(
            "{}",
            serde_json::to_string(item).unwrap_or_else(|_| "{}".to_string())
        );
    }
}

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn print_reports(reports: &[DocumentReport], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json_lines(reports),
        OutputFormat::Table => {
            let mut table = new_table(vec!["DOCUMENT", "CODE", "PATH", "ACTUAL", "EXPECTED"]);
            for report in reports {
                if let Some(error) = &report.error {
                    table.add_row(vec![
                        report.document.clone(),
                        "error".to_string(),
                        String::new(),
                        error.clone(),
                        String::new(),
                    ]);
                } else if report.valid {
                    table.add_row(vec![
                        report.document.clone(),
                        "ok".to_string(),
                        String::new(),
                        String::new(),
                        String::new(),
                    ]);
                }
                for failure in &report.failures {
                    table.add_row(vec![
                        report.document.clone(),
                        failure.code.clone(),
                        failure.path.clone(),
                        cell(failure.actual.as_ref(), failure.value.as_deref()),
                        cell(failure.expected.as_ref(), None),
                    ]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for report in reports {
                match (&report.error, report.failures.len()) {
                    (Some(error), _) => println!("{}: error: {error}", report.document),
                    (None, 0) => println!("{}: ok", report.document),
                    (None, count) => {
                        println!("{}: {count} failure(s)", report.document);
                        for failure in &report.failures {
                            println!("  {failure}");
                        }
                    }
                }
            }
        }
        OutputFormat::Raw => {
            for report in reports {
                for failure in &report.failures {
                    println!("{}\t{}\t{}", report.document, failure.path, failure.code);
                }
            }
        }
    }
}

fn cell(value: Option<&Value>, fallback: Option<&str>) -> String {
    match (value, fallback) {
        (Some(Value::String(text)), _) => text.clone(),
        (Some(other), _) => other.to_string(),
        (None, Some(text)) => text.to_string(),
        (None, None) => String::new(),
    }
}
