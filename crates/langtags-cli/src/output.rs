//! Text and JSON rendering of tag reports.

use std::fmt::Write as _;

use colored::Colorize;
use serde::Serialize;

use langtags_core::DiagnosticLevel;

use crate::report::TagReport;

#[derive(Debug, Serialize)]
struct Summary {
    checked: usize,
    valid: usize,
    invalid: usize,
    advisories: usize,
}

impl Summary {
    fn of(reports: &[TagReport]) -> Self {
        let valid = reports.iter().filter(|r| r.valid).count();
        Self {
            checked: reports.len(),
            valid,
            invalid: reports.len() - valid,
            advisories: reports.iter().map(|r| r.advisories.len()).sum(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    version: &'static str,
    registry_date: Option<String>,
    results: &'a [TagReport],
    summary: Summary,
}

pub fn format_json(reports: &[TagReport], registry_date: Option<String>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput {
        version: env!("CARGO_PKG_VERSION"),
        registry_date,
        results: reports,
        summary: Summary::of(reports),
    })
}

pub fn format_text(reports: &[TagReport]) -> String {
    let mut out = String::new();

    for report in reports {
        if report.valid {
            let shown = report.tag.as_deref().unwrap_or(&report.input);
            let _ = writeln!(out, "{} {}", "✓".green().bold(), shown.bold());
        } else {
            let _ = writeln!(out, "{} {}", "✗".red().bold(), report.input.as_str().bold());
        }

        let width = report
            .components
            .iter()
            .map(|c| c.subtag.len())
            .max()
            .unwrap_or(0);
        for component in &report.components {
            let slot = format!("{:<12}", component.slot);
            let _ = write!(out, "    {}{:<width$}", slot.as_str().dimmed(), component.subtag);
            if let Some(description) = &component.description {
                let _ = write!(out, "  {}", description);
            }
            if component.deprecated.is_some() {
                let _ = write!(out, " {}", "(deprecated)".yellow());
            }
            out.push('\n');
        }

        if let Some(error) = &report.error {
            let _ = writeln!(out, "  {}: {}", error.kind.red().bold(), error.message);
        }

        for diag in &report.advisories {
            let level = match diag.level {
                DiagnosticLevel::Warning => "warning".yellow().bold(),
                DiagnosticLevel::Info => "info".cyan().bold(),
            };
            let _ = writeln!(out, "  {}[{}]: {}", level, diag.rule, diag.message);
            if let Some(suggestion) = &diag.suggestion {
                let _ = writeln!(out, "    {} {}", "help:".cyan(), suggestion);
            }
        }
    }

    let summary = Summary::of(reports);
    let _ = writeln!(
        out,
        "\nChecked {} {}: {} valid, {} invalid",
        summary.checked,
        if summary.checked == 1 { "tag" } else { "tags" },
        summary.valid.to_string().as_str().green(),
        summary.invalid.to_string().as_str().red(),
    );

    out
}
