//! Output formatting for command trees, page records and run reports.

use cmdtree_core::{OptionSpec, SubcommandSpec, TreePackage};
use serde::Serialize;

use crate::parser::PageRecord;
use crate::report::DiscoveryReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
}

/// Formats a tree package in the requested output format.
pub fn format_tree(package: &TreePackage, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Markdown => Ok(tree_to_markdown(package)),
        _ => serialize(package, format),
    }
}

/// Formats a run report in the requested output format.
pub fn format_report(report: &DiscoveryReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
        _ => serialize(report, format),
    }
}

/// Formats the records read from one page. Markdown is rendered as JSON.
pub fn format_page_record(page: &PageRecord, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Yaml => serialize(page, OutputFormat::Yaml),
        _ => serialize(page, OutputFormat::Json),
    }
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        _ => serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {e}")),
    }
}

fn tree_to_markdown(package: &TreePackage) -> String {
    let root = &package.root;
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", root.name));
    if !root.description.is_empty() {
        out.push_str(&format!("{}\n\n", root.description));
    }
    if let Some(ref source) = package.source_url {
        out.push_str(&format!("**Source:** {source}\n\n"));
    }
    out.push_str(&format!("**Generated:** {}\n\n", package.generated_at));

    if let Some(ref options) = root.options {
        out.push_str("## Global Options\n\n");
        out.push_str("| Option | Value | Description |\n");
        out.push_str("|--------|-------|-------------|\n");
        for option in options {
            out.push_str(&format!(
                "| `{}` | {} | {} |\n",
                option.names.join("`, `"),
                option_value(option),
                option.description.replace('\n', " ")
            ));
        }
        out.push('\n');
    }

    if !root.subcommands.is_empty() {
        out.push_str("## Commands\n\n");
        for sub in &root.subcommands {
            push_outline(&mut out, sub, 0);
        }
    }

    out
}

fn push_outline(out: &mut String, node: &SubcommandSpec, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{indent}- `{}`", node.name));
    if !node.description.is_empty() {
        out.push_str(&format!(" {}", node.description.replace('\n', " ")));
    }
    out.push('\n');

    for option in node.options.iter().flatten() {
        out.push_str(&format!(
            "{indent}  - option `{}` {}\n",
            option.names.join("`, `"),
            option_value(option)
        ));
    }
    for arg in node.args.iter().flatten() {
        out.push_str(&format!("{indent}  - arg `{}`\n", arg.name));
    }
    for sub in &node.subcommands {
        push_outline(out, sub, depth + 1);
    }
}

fn option_value(option: &OptionSpec) -> String {
    match option.args {
        None => "flag".to_string(),
        Some(ref arg) => match arg.suggestions {
            Some(ref values) => format!("<{}> ({})", arg.name, values.join(", ")),
            None => format!("<{}>", arg.name),
        },
    }
}

fn report_to_markdown(report: &DiscoveryReport) -> String {
    let mut out = String::new();

    out.push_str("# Discovery Report\n\n");
    out.push_str(&format!("- **Index:** {}\n", report.index_url));
    out.push_str(&format!("- **Generated:** {}\n", report.generated_at));
    out.push_str(&format!("- **Base commands:** {}\n", report.base_commands.len()));
    out.push_str(&format!("- **Failed:** {}\n\n", report.failures.len()));

    out.push_str("| Command | Status | Pages | Skipped | Commands | Failure |\n");
    out.push_str("|---------|--------|-------|---------|----------|---------|\n");
    for entry in &report.base_commands {
        let failure = entry
            .failure_code
            .map(|code| code.to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "| `{}` | {:?} | {} | {} | {} | {failure} |\n",
            entry.command, entry.status, entry.pages_read, entry.pages_skipped, entry.commands_extracted
        ));
    }

    let warnings: Vec<String> = report
        .base_commands
        .iter()
        .flat_map(|entry| {
            entry
                .warnings
                .iter()
                .map(move |w| format!("{}: {w}", entry.command))
        })
        .collect();
    if !warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for w in &warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}
