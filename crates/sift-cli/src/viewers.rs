//! Console views for rules and results.

use crate::console::{format_table, Console};
use anyhow::Result;
use clap::ValueEnum;
use sift_core::Rule;
use sift_pipeline::formats::{location, FormatContext};
use sift_pipeline::{recombine, EngineBatch, OutputFormat};

/// How to show rules or results on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewKind {
    Table,
    Detail,
}

const RULE_COLUMNS: [&str; 5] = ["#", "Name", "Engine", "Severity", "Tag"];

/// Shows a rule listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViewer {
    Table,
    Detail,
    Noop,
}

impl RuleViewer {
    /// Table by default; nothing when the listing goes to a file.
    pub fn choose(view: Option<ViewKind>, has_output_file: bool) -> Self {
        match view {
            Some(ViewKind::Table) => RuleViewer::Table,
            Some(ViewKind::Detail) => RuleViewer::Detail,
            None if has_output_file => RuleViewer::Noop,
            None => RuleViewer::Table,
        }
    }

    pub fn view(self, console: &dyn Console, rules: &[&Rule]) {
        if self == RuleViewer::Noop {
            return;
        }
        if rules.is_empty() {
            console.out("Found 0 rules.");
            return;
        }
        console.out(&format!("Found {} rule(s):", rules.len()));

        match self {
            RuleViewer::Table => {
                let columns: Vec<String> = RULE_COLUMNS.iter().map(|c| c.to_string()).collect();
                let rows: Vec<Vec<String>> = rules
                    .iter()
                    .enumerate()
                    .map(|(i, rule)| {
                        vec![
                            (i + 1).to_string(),
                            rule.name.clone(),
                            rule.engine.clone(),
                            rule.severity.display_name().to_string(),
                            rule.tags.join(", "),
                        ]
                    })
                    .collect();
                for line in format_table(&columns, &rows) {
                    console.out(&line);
                }
            }
            RuleViewer::Detail => {
                for (i, rule) in rules.iter().enumerate() {
                    console.out(&rule_detail(i + 1, rule));
                }
            }
            RuleViewer::Noop => {}
        }
    }
}

fn rule_detail(index: usize, rule: &Rule) -> String {
    let mut lines = vec![
        format!("=== {}. {}", index, rule.name),
        format!("    Severity: {}", rule.severity.detailed()),
        format!("    Engine: {}", rule.engine),
        format!("    Tags: {}", rule.tags.join(", ")),
    ];
    if !rule.resource_urls.is_empty() {
        lines.push("    Resources:".to_string());
        lines.extend(rule.resource_urls.iter().map(|url| format!("        {}", url)));
    }
    lines.push(format!("    Description: {}", rule.description));
    lines.join("\n")
}

/// Shows run results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsViewer {
    Table,
    Detail,
    Noop,
}

impl ResultsViewer {
    /// Table by default; nothing when results go to files.
    pub fn choose(view: Option<ViewKind>, has_output_files: bool) -> Self {
        match view {
            Some(ViewKind::Table) => ResultsViewer::Table,
            Some(ViewKind::Detail) => ResultsViewer::Detail,
            None if has_output_files => ResultsViewer::Noop,
            None => ResultsViewer::Table,
        }
    }

    pub fn view(self, console: &dyn Console, batches: &[EngineBatch]) -> Result<()> {
        match self {
            ResultsViewer::Noop => Ok(()),
            ResultsViewer::Table => {
                let results = recombine(batches, OutputFormat::Table, &FormatContext::default())?;
                let (columns, rows) = results.as_table()?;
                if rows.is_empty() {
                    return Ok(());
                }
                for line in format_table(columns, rows) {
                    console.out(&line);
                }
                Ok(())
            }
            ResultsViewer::Detail => {
                let violations = batches.iter().flat_map(|b| b.violations.iter());
                for (i, v) in violations.enumerate() {
                    let mut lines = vec![
                        format!("=== {}. {}", i + 1, v.rule),
                        format!("    Severity: {}", v.severity.detailed()),
                        format!("    Engine: {}", v.engine),
                        format!("    Location: {}", location(v)),
                        format!("    Message: {}", v.message),
                    ];
                    if let Some(url) = &v.url {
                        lines.push(format!("    Resource: {}", url));
                    }
                    console.out(&lines.join("\n"));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::SpyConsole;
    use sift_core::{Severity, Violation};

    fn rule(name: &str, severity: Severity) -> Rule {
        Rule {
            name: name.to_string(),
            engine: "apex".to_string(),
            severity,
            tags: vec!["Recommended".to_string(), "Performance".to_string()],
            categories: vec![],
            rulesets: vec![],
            languages: vec!["apex".to_string()],
            description: "Avoid SOQL queries inside loops".to_string(),
            resource_urls: vec!["https://example.com/soql".to_string()],
            is_pilot: false,
            default_enabled: true,
        }
    }

    #[test]
    fn test_rule_table_columns() {
        let console = SpyConsole::new();
        let soql = rule("SoqlInLoop", Severity::High);
        RuleViewer::Table.view(&console, &[&soql]);

        let out = console.out_lines();
        assert_eq!(out[0], "Found 1 rule(s):");
        assert!(out[1].starts_with("#  Name"));
        assert!(out[3].contains("SoqlInLoop"));
        assert!(out[3].contains("High"));
        assert!(out[3].contains("Recommended, Performance"));
    }

    #[test]
    fn test_rule_detail_block() {
        let console = SpyConsole::new();
        let soql = rule("SoqlInLoop", Severity::High);
        RuleViewer::Detail.view(&console, &[&soql]);

        let detail = console.stdout();
        assert!(detail.contains("=== 1. SoqlInLoop"));
        assert!(detail.contains("    Severity: 2 (High)"));
        assert!(detail.contains("    Engine: apex"));
        assert!(detail.contains("        https://example.com/soql"));
    }

    #[test]
    fn test_output_file_defaults_to_noop() {
        assert_eq!(RuleViewer::choose(None, true), RuleViewer::Noop);
        assert_eq!(RuleViewer::choose(Some(ViewKind::Detail), true), RuleViewer::Detail);
        assert_eq!(ResultsViewer::choose(None, false), ResultsViewer::Table);
        assert_eq!(ResultsViewer::choose(None, true), ResultsViewer::Noop);
    }

    #[test]
    fn test_results_detail_numbers_violations() {
        let console = SpyConsole::new();
        let batches = vec![EngineBatch {
            engine: "javascript".to_string(),
            violations: vec![Violation {
                rule: "NoEval".to_string(),
                engine: "javascript".to_string(),
                severity: Severity::Critical,
                file: "web/app.js".to_string(),
                line: Some(7),
                column: Some(3),
                end_line: None,
                end_column: None,
                message: "eval() is dangerous".to_string(),
                category: None,
                url: None,
            }],
        }];
        ResultsViewer::Detail.view(&console, &batches).unwrap();

        let out = console.stdout();
        assert!(out.contains("=== 1. NoEval"));
        assert!(out.contains("    Severity: 1 (Critical)"));
        assert!(out.contains("    Message: eval() is dangerous"));
    }
}
