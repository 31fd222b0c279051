mod support;

use await_clippy::config;
use await_clippy::level::Level;
use await_clippy::report::ReportingGate;
use await_clippy::rule::{RuleRegistry, RuleSettings};
use await_clippy::AnalysisEngine;
use support::*;

const CONFIG: &str = r#"
analyze_generated = true

[rules]
disabled = []
awaitable_alternative = "error"
"#;

#[test]
fn config_is_discovered_upward_from_nested_dirs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg_path = dir.path().join("await-clippy.toml");
    std::fs::write(&cfg_path, CONFIG).expect("write config");

    let nested = dir.path().join("src").join("deep");
    std::fs::create_dir_all(&nested).expect("create nested dirs");

    let found = config::find_config_file(&nested).expect("config should be found");
    assert_eq!(found, cfg_path);
}

#[test]
fn explicit_path_skips_discovery() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg_path = dir.path().join("custom.toml");
    std::fs::write(&cfg_path, CONFIG).expect("write config");

    let elsewhere = tempfile::tempdir().expect("tempdir");
    let (path, cfg) = config::load_config(Some(&cfg_path), elsewhere.path())
        .expect("config should load")
        .expect("explicit path should be used");
    assert_eq!(path, cfg_path);
    assert!(cfg.analyze_generated);
}

#[test]
fn levels_and_flags_are_parsed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg_path = dir.path().join("await-clippy.toml");
    std::fs::write(
        &cfg_path,
        r#"
[rules]
disabled = ["awaitable_alternative"]
awaitable_alternative = "warn"
"#,
    )
    .expect("write config");

    let cfg = config::load_config_file(&cfg_path).expect("config should load");
    assert!(!cfg.analyze_generated);
    assert_eq!(cfg.rules.disabled, ["awaitable_alternative"]);
    assert_eq!(
        cfg.rules.levels.get("awaitable_alternative"),
        Some(&Level::Warn)
    );
}

#[test]
fn config_can_promote_rule_to_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg_path = dir.path().join("await-clippy.toml");
    std::fs::write(&cfg_path, CONFIG).expect("write config");
    let cfg = config::load_config_file(&cfg_path).expect("config should load");

    let empty: Vec<String> = Vec::new();
    let registry = RuleRegistry::default_rules_filtered(&empty, &empty, &cfg.rules.disabled)
        .expect("registry");
    let settings = RuleSettings::default()
        .with_config_levels(cfg.rules.levels)
        .disable(cfg.rules.disabled);
    let engine = AnalysisEngine::new(registry, ReportingGate::new(settings));

    let mut comp = queryable_compilation();
    let tree = call_in_async_method("Count");
    comp.add_tree(&tree);

    let diags = engine.analyze(&comp, &tree).expect("analysis should succeed");
    assert!(
        diags
            .iter()
            .any(|d| d.rule.name == "awaitable_alternative" && d.level == Level::Error),
        "got: {diags:#?}"
    );
}

#[test]
fn config_can_disable_rule() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg_path = dir.path().join("await-clippy.toml");
    std::fs::write(
        &cfg_path,
        r#"
[rules]
disabled = ["awaitable_alternative"]
"#,
    )
    .expect("write config");
    let cfg = config::load_config_file(&cfg_path).expect("config should load");

    let settings = RuleSettings::default()
        .with_config_levels(cfg.rules.levels)
        .disable(cfg.rules.disabled);
    let engine = AnalysisEngine::new(
        RuleRegistry::default_rules(),
        ReportingGate::new(settings),
    );

    let mut comp = queryable_compilation();
    let tree = call_in_async_method("Count");
    comp.add_tree(&tree);

    let diags = engine.analyze(&comp, &tree).expect("analysis should succeed");
    assert!(!diags.iter().any(|d| d.rule.name == "awaitable_alternative"));
}
