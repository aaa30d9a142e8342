//! Writers for result, rule and config output files.

use crate::console::Console;
use crate::UsageError;
use anyhow::{Context, Result};
use sift_core::{Error, EventHub, Rule};
use sift_fs::FileSystem;
use sift_pipeline::formats::{escape_csv_field, FormatContext};
use sift_pipeline::{recombine, EngineBatch, OutputFormat};
use std::path::{Path, PathBuf};

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

async fn write_file<F: FileSystem>(fs: &F, path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs.write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Writes the run results to every requested output file.
#[derive(Debug, Clone, Default)]
pub struct CompositeResultsWriter {
    outputs: Vec<(PathBuf, OutputFormat)>,
}

impl CompositeResultsWriter {
    /// Infer each file's format from its extension.
    ///
    /// A table `requested` format cannot go to a file. Any other requested
    /// format that disagrees with a file's extension is reported and the
    /// extension wins.
    pub fn from_paths(
        paths: &[PathBuf],
        requested: Option<OutputFormat>,
        events: &EventHub,
    ) -> sift_core::Result<Self> {
        let mut outputs = Vec::with_capacity(paths.len());

        for path in paths {
            if requested == Some(OutputFormat::Table) {
                return Err(Error::TableToFile { path: path.clone() });
            }
            let inferred = OutputFormat::from_path(path)?;
            if let Some(format) = requested.filter(|f| *f != inferred) {
                events.warn(
                    "sift",
                    format!(
                        "Output file {} will be written as {} rather than the requested {}",
                        path.display(),
                        inferred,
                        format
                    ),
                );
            }
            outputs.push((path.clone(), inferred));
        }

        Ok(Self { outputs })
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn outputs(&self) -> &[(PathBuf, OutputFormat)] {
        &self.outputs
    }

    pub async fn write<F: FileSystem>(
        &self,
        fs: &F,
        batches: &[EngineBatch],
        ctx: &FormatContext,
    ) -> Result<()> {
        for (path, format) in &self.outputs {
            let results = recombine(batches, *format, ctx)?;
            write_file(fs, path, results.as_text()?).await?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RulesFileFormat {
    Json,
    Csv,
}

/// Writes the listed rules as JSON or CSV.
#[derive(Debug, Clone)]
pub struct RulesWriter {
    path: PathBuf,
    format: RulesFileFormat,
}

const RULES_CSV_HEADER: &str =
    "Name,Engine,Severity,Tags,Categories,Rulesets,Languages,Description,Resources";

impl RulesWriter {
    pub fn from_path(path: &Path) -> std::result::Result<Self, UsageError> {
        let format = match extension(path).as_str() {
            "json" => RulesFileFormat::Json,
            "csv" => RulesFileFormat::Csv,
            _ => return Err(UsageError::UnsupportedRulesOutput(path.display().to_string())),
        };
        Ok(Self {
            path: path.to_path_buf(),
            format,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, rules: &[&Rule]) -> Result<String> {
        match self.format {
            RulesFileFormat::Json => {
                Ok(serde_json::to_string_pretty(rules).context("Failed to encode rules")?)
            }
            RulesFileFormat::Csv => {
                let mut out = String::from(RULES_CSV_HEADER);
                out.push('\n');
                for rule in rules {
                    let row = [
                        escape_csv_field(&rule.name),
                        escape_csv_field(&rule.engine),
                        rule.severity.value().to_string(),
                        escape_csv_field(&rule.tags.join(",")),
                        escape_csv_field(&rule.categories.join(",")),
                        escape_csv_field(&rule.rulesets.join(",")),
                        escape_csv_field(&rule.languages.join(",")),
                        escape_csv_field(&rule.description),
                        escape_csv_field(&rule.resource_urls.join(",")),
                    ];
                    out.push_str(&row.join(","));
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }

    pub async fn write<F: FileSystem>(&self, fs: &F, rules: &[&Rule]) -> Result<()> {
        write_file(fs, &self.path, &self.render(rules)?).await
    }
}

/// Writes the effective config as YAML, asking before replacing a file.
#[derive(Debug, Clone)]
pub struct ConfigWriter {
    path: PathBuf,
    overwrite: bool,
}

impl ConfigWriter {
    pub fn from_path(path: &Path, overwrite: bool) -> std::result::Result<Self, UsageError> {
        match extension(path).as_str() {
            "yaml" | "yml" => Ok(Self {
                path: path.to_path_buf(),
                overwrite,
            }),
            _ => Err(UsageError::UnsupportedConfigOutput(path.display().to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write<F: FileSystem>(
        &self,
        fs: &F,
        console: &dyn Console,
        yaml: &str,
    ) -> Result<()> {
        let exists = fs
            .exists(&self.path)
            .await
            .with_context(|| format!("Failed to check {}", self.path.display()))?;
        if exists
            && !self.overwrite
            && !console.confirm(&format!("{} already exists. Overwrite it?", self.path.display()))
        {
            return Err(UsageError::WouldOverwrite(self.path.display().to_string()).into());
        }
        write_file(fs, &self.path, yaml).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::SpyConsole;
    use sift_core::{EventLevel, EventLog, Severity, Violation};
    use sift_fs::NativeFileSystem;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn batches() -> Vec<EngineBatch> {
        vec![EngineBatch {
            engine: "apex".to_string(),
            violations: vec![Violation {
                rule: "SoqlInLoop".to_string(),
                engine: "apex".to_string(),
                severity: Severity::High,
                file: "src/A.cls".to_string(),
                line: Some(4),
                column: Some(9),
                end_line: Some(4),
                end_column: Some(20),
                message: "Avoid SOQL queries inside loops".to_string(),
                category: Some("Performance".to_string()),
                url: None,
            }],
        }]
    }

    #[test]
    fn test_table_format_with_output_file_is_rejected() {
        let events = EventHub::new();
        let err = CompositeResultsWriter::from_paths(
            &[PathBuf::from("out.json")],
            Some(OutputFormat::Table),
            &events,
        )
        .unwrap_err();
        assert!(matches!(err, Error::TableToFile { .. }));
    }

    #[test]
    fn test_mismatched_format_warns_and_keeps_extension() {
        let events = EventHub::new();
        let log = Arc::new(EventLog::new());
        events.attach(log.clone());

        let writer = CompositeResultsWriter::from_paths(
            &[PathBuf::from("out.sarif")],
            Some(OutputFormat::Json),
            &events,
        )
        .unwrap();
        assert_eq!(writer.outputs()[0].1, OutputFormat::Sarif);
        assert_eq!(log.count(EventLevel::Warning), 1);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let events = EventHub::new();
        let err = CompositeResultsWriter::from_paths(&[PathBuf::from("out.txt")], None, &events)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOutputFile { .. }));
    }

    #[tokio::test]
    async fn test_writes_every_output_file() {
        let dir = TempDir::new().unwrap();
        let fs = NativeFileSystem::new(dir.path()).unwrap();
        let events = EventHub::new();
        let writer = CompositeResultsWriter::from_paths(
            &[PathBuf::from("reports/out.csv"), PathBuf::from("out.xml")],
            None,
            &events,
        )
        .unwrap();

        writer
            .write(&fs, &batches(), &FormatContext::default())
            .await
            .unwrap();

        let csv = std::fs::read_to_string(dir.path().join("reports/out.csv")).unwrap();
        assert!(csv.contains("SoqlInLoop"));
        let xml = std::fs::read_to_string(dir.path().join("out.xml")).unwrap();
        roxmltree::Document::parse(&xml).unwrap();
    }

    #[test]
    fn test_rules_writer_accepts_json_and_csv_only() {
        assert!(RulesWriter::from_path(Path::new("rules.JSON")).is_ok());
        assert!(RulesWriter::from_path(Path::new("rules.csv")).is_ok());
        assert!(matches!(
            RulesWriter::from_path(Path::new("rules.xml")),
            Err(UsageError::UnsupportedRulesOutput(_))
        ));
    }

    #[test]
    fn test_rules_csv_quotes_joined_tags() {
        let rule = Rule {
            name: "NoEval".to_string(),
            engine: "javascript".to_string(),
            severity: Severity::Critical,
            tags: vec!["Recommended".to_string(), "Security".to_string()],
            categories: vec!["Security".to_string()],
            rulesets: vec![],
            languages: vec!["javascript".to_string()],
            description: "Disallow eval()".to_string(),
            resource_urls: vec![],
            is_pilot: false,
            default_enabled: true,
        };
        let writer = RulesWriter::from_path(Path::new("rules.csv")).unwrap();
        let csv = writer.render(&[&rule]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], RULES_CSV_HEADER);
        assert_eq!(
            lines[1],
            "NoEval,javascript,1,\"Recommended,Security\",Security,,javascript,Disallow eval(),"
        );
    }

    #[tokio::test]
    async fn test_config_writer_refuses_overwrite_without_consent() {
        let dir = TempDir::new().unwrap();
        let fs = NativeFileSystem::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("sift.yaml"), "old").unwrap();

        let writer = ConfigWriter::from_path(Path::new("sift.yaml"), false).unwrap();
        let err = writer
            .write(&fs, &SpyConsole::new(), "new")
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<UsageError>().is_some());
        assert_eq!(std::fs::read_to_string(dir.path().join("sift.yaml")).unwrap(), "old");

        writer
            .write(&fs, &SpyConsole::agreeing(), "new")
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("sift.yaml")).unwrap(), "new");
    }

    #[test]
    fn test_config_writer_requires_yaml() {
        assert!(ConfigWriter::from_path(Path::new("c.yml"), false).is_ok());
        assert!(matches!(
            ConfigWriter::from_path(Path::new("c.json"), false),
            Err(UsageError::UnsupportedConfigOutput(_))
        ));
    }
}
