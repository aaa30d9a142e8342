//! Integration tests for the pattern engine against real files.

use sift_core::{
    EventHub, EventLevel, EventLog, Rule, RuleEngine, RuleTarget, RunContext, Severity,
};
use sift_engine_pattern::PatternEngine;
use sift_fs::NativeFileSystem;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const CUSTOM_RULES: &str = r#"
[[rules]]
name = "NoTodo"
severity = 5
description = "Resolve TODO comments"
pattern = "TODO"
categories = ["Housekeeping"]
default_enabled = false

[[rules]]
name = "BrokenRegex"
pattern = "(unclosed"
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn engine(dir: &TempDir) -> PatternEngine<NativeFileSystem> {
    let fs = Arc::new(NativeFileSystem::new(dir.path()).unwrap());
    PatternEngine::new("javascript", fs)
        .with_builtin("javascript")
        .with_target_patterns(vec!["**/*.js".to_string()])
}

async fn rule_named(engine: &PatternEngine<NativeFileSystem>, name: &str) -> Rule {
    let catalog = engine.catalog().await.unwrap();
    let descriptor = catalog
        .rules
        .into_iter()
        .find(|r| r.name == name)
        .unwrap();
    Rule::from_descriptor(engine.name(), descriptor).unwrap()
}

fn file_target(path: &str) -> RuleTarget {
    RuleTarget {
        target: path.to_string(),
        is_directory: false,
        paths: vec![path.to_string()],
    }
}

#[tokio::test]
async fn test_catalog_from_builtin_pack() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(&temp_dir);
    engine.init(&EventHub::new()).await.unwrap();

    let catalog = engine.catalog().await.unwrap();
    assert!(catalog.rules.iter().any(|r| r.name == "no-eval"));
    let security = catalog
        .categories
        .iter()
        .find(|g| g.name == "Security")
        .unwrap();
    assert_eq!(security.engine, "javascript");
    assert!(security.paths.contains(&"no-eval".to_string()));
    assert!(engine.version().contains('+'));
}

#[tokio::test]
async fn test_run_reports_positions() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "web/app.js",
        "const a = 1;\nconst b = eval(input);\n",
    );
    let engine = engine(&temp_dir);
    let events = EventHub::new();
    engine.init(&events).await.unwrap();

    let rules = vec![rule_named(&engine, "no-eval").await];
    let targets = vec![file_target("web/app.js")];
    let violations = engine
        .run(RunContext {
            groups: &[],
            rules: &rules,
            targets: &targets,
            events: &events,
        })
        .await
        .unwrap();

    assert_eq!(violations.len(), 1);
    let v = &violations[0];
    assert_eq!(v.rule, "no-eval");
    assert_eq!(v.engine, "javascript");
    assert_eq!(v.severity, Severity::Critical);
    assert_eq!(v.file, "web/app.js");
    assert_eq!((v.line, v.column), (Some(2), Some(11)));
    assert_eq!(v.category.as_deref(), Some("Security"));
}

#[tokio::test]
async fn test_unreadable_file_is_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "ok.js", "eval(x)\n");
    fs::write(temp_dir.path().join("binary.js"), [0xff, 0xfe, 0x00]).unwrap();

    let engine = engine(&temp_dir);
    let events = EventHub::new();
    let log = Arc::new(EventLog::new());
    events.attach(log.clone());
    engine.init(&events).await.unwrap();

    let rules = vec![rule_named(&engine, "no-eval").await];
    let targets = vec![file_target("binary.js"), file_target("ok.js")];
    let violations = engine
        .run(RunContext {
            groups: &[],
            rules: &rules,
            targets: &targets,
            events: &events,
        })
        .await
        .unwrap();

    assert_eq!(violations.len(), 1);
    assert_eq!(log.count(EventLevel::Warning), 1);
    assert!(log.messages(EventLevel::Warning)[0].contains("binary.js"));
}

#[tokio::test]
async fn test_unknown_rule_rejects_run() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(&temp_dir);
    let events = EventHub::new();
    engine.init(&events).await.unwrap();

    let mut rule = rule_named(&engine, "no-eval").await;
    rule.name = "not-a-rule".to_string();
    let rules = vec![rule];
    let result = engine
        .run(RunContext {
            groups: &[],
            rules: &rules,
            targets: &[],
            events: &events,
        })
        .await;

    assert!(matches!(result, Err(sift_core::Error::EngineFailed { .. })));
}

#[tokio::test]
async fn test_custom_rules_extend_pack_and_bad_regex_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "rules/custom.toml", CUSTOM_RULES);
    write(temp_dir.path(), "src/a.js", "// TODO: tidy\n");

    let fs = Arc::new(NativeFileSystem::new(temp_dir.path()).unwrap());
    let engine = PatternEngine::new("javascript", fs)
        .with_builtin("javascript")
        .with_custom_paths(vec![temp_dir.path().join("rules/custom.toml")]);
    let events = EventHub::new();
    let log = Arc::new(EventLog::new());
    events.attach(log.clone());
    engine.init(&events).await.unwrap();

    assert_eq!(log.count(EventLevel::Error), 1);
    assert!(log.messages(EventLevel::Error)[0].contains("BrokenRegex"));

    let catalog = engine.catalog().await.unwrap();
    assert!(catalog.rules.iter().any(|r| r.name == "NoTodo" && !r.default_enabled));
    assert!(!catalog.rules.iter().any(|r| r.name == "BrokenRegex"));

    // A directory target (degraded mode) is walked by the engine.
    let rules = vec![rule_named(&engine, "NoTodo").await];
    let targets = vec![RuleTarget {
        target: "src".to_string(),
        is_directory: true,
        paths: vec![".".to_string()],
    }];
    let violations = engine
        .run(RunContext {
            groups: &[],
            rules: &rules,
            targets: &targets,
            events: &events,
        })
        .await
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].file, "src/a.js");
}

#[tokio::test]
async fn test_version_tracks_custom_rules() {
    let temp_dir = TempDir::new().unwrap();
    let rules_path = temp_dir.path().join("custom.toml");
    fs::write(&rules_path, CUSTOM_RULES).unwrap();

    let build = || {
        let fs = Arc::new(NativeFileSystem::new(temp_dir.path()).unwrap());
        PatternEngine::new("apex", fs)
            .with_builtin("apex")
            .with_custom_paths(vec![rules_path.clone()])
    };

    let first = build();
    first.init(&EventHub::new()).await.unwrap();
    let second = build();
    second.init(&EventHub::new()).await.unwrap();
    assert_eq!(first.version(), second.version());

    fs::write(&rules_path, format!("{}\n# edited\n", CUSTOM_RULES)).unwrap();
    let third = build();
    third.init(&EventHub::new()).await.unwrap();
    assert_ne!(first.version(), third.version());
}

#[tokio::test]
async fn test_unknown_builtin_fails_init() {
    let temp_dir = TempDir::new().unwrap();
    let fs = Arc::new(NativeFileSystem::new(temp_dir.path()).unwrap());
    let engine = PatternEngine::new("pmd", fs).with_builtin("pmd");
    assert!(engine.init(&EventHub::new()).await.is_err());
}
