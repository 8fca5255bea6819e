use serde::Serialize;
use tagcheck_schema::RuleModel;

use crate::cmd::{read_schema, RulesArgs};
use crate::exit::{schema_error, CliResult, SUCCESS};
use crate::output::{new_table, print_json_lines, OutputFormat};

#[derive(Debug, Serialize)]
struct RuleOutput {
    path: String,
    #[serde(rename = "type")]
    kind: &'static str,
    required: bool,
    constraints: Vec<String>,
}

pub fn run(args: RulesArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = read_schema(&args.schema, args.input.max_size)?;
    let model = RuleModel::compile_with(&schema, &args.input.parse_options())
        .map_err(|err| schema_error(&args.schema, err))?;

    let rules: Vec<RuleOutput> = model
        .walk()
        .into_iter()
        .map(|(path, node)| RuleOutput {
            path,
            kind: node.kind().name(),
            required: node.is_required(),
            constraints: node.constraints().describe(),
        })
        .collect();

    print_rules(&rules, format);
    Ok(SUCCESS)
}

fn print_rules(rules: &[RuleOutput], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json_lines(rules),
        OutputFormat::Table => {
            let mut table = new_table(vec!["PATH", "TYPE", "REQUIRED", "CONSTRAINTS"]);
            for rule in rules {
                table.add_row(vec![
                    rule.path.clone(),
                    rule.kind.to_string(),
                    rule.required.to_string(),
                    rule.constraints.join(" "),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for rule in rules {
                let depth = rule.path.matches('.').count();
                let name = rule.path.rsplit('.').next().unwrap_or(&rule.path);
                println!(
                    "{:indent$}{name}: {} {}",
                    "",
                    rule.kind,
                    rule.constraints.join(" "),
                    indent = depth * 2
                );
            }
        }
        OutputFormat::Raw => {
            for rule in rules {
                println!("{}", rule.path);
            }
        }
    }
}
