use await_clippy::AnalysisEngine;
use await_clippy::cli::{AnalyzeArgs, Args, Command, OutputFormat};
use await_clippy::config;
use await_clippy::diagnostics::Diagnostic;
use await_clippy::fixture;
use await_clippy::level::Level;
use await_clippy::report::ReportingGate;
use await_clippy::rule::{RuleRegistry, RuleSettings};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    await_clippy::telemetry::init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Some(Command::ListRules) => {
            list_rules();
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Explain { rule }) => {
            explain_rule(&rule)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Analyze(analyze)) => analyze_command(analyze),
        None => analyze_command(args.analyze),
    }
}

fn list_rules() {
    let registry = RuleRegistry::default_rules();
    let mut rules: Vec<_> = registry.descriptors().collect();
    rules.sort_by_key(|d| d.name);

    for d in rules {
        println!("{}\t{}\t{}", d.name, d.category.as_str(), d.description);
    }
}

fn explain_rule(rule: &str) -> anyhow::Result<()> {
    let registry = RuleRegistry::default_rules();
    let Some(d) = registry.find_descriptor(rule) else {
        anyhow::bail!("unknown rule: {rule}");
    };

    println!("name: {}", d.name);
    println!("category: {}", d.category.as_str());
    println!("description: {}", d.description);
    let mut sources = Vec::new();
    if d.scope.main {
        sources.push("main");
    }
    if d.scope.test {
        sources.push("test");
    }
    if d.scope.generated {
        sources.push("generated");
    }
    println!("sources: {}", sources.join(", "));
    Ok(())
}

fn analyze_command(args: AnalyzeArgs) -> anyhow::Result<ExitCode> {
    if args.paths.is_empty() {
        anyhow::bail!("no fixture files given");
    }

    let start_dir = infer_start_dir(&args)?;
    let loaded_cfg = config::load_config(args.config.as_deref(), &start_dir)?;

    let (disabled, settings, analyze_generated) = match loaded_cfg.as_ref() {
        Some((_path, cfg)) => (
            cfg.rules.disabled.clone(),
            RuleSettings::default()
                .with_config_levels(cfg.rules.levels.clone())
                .disable(cfg.rules.disabled.clone()),
            // CLI flag takes precedence over config
            args.analyze_generated || cfg.analyze_generated,
        ),
        None => (Vec::new(), RuleSettings::default(), args.analyze_generated),
    };

    let registry = RuleRegistry::default_rules_filtered(&args.only, &args.skip, &disabled)?;
    let gate = ReportingGate::new(settings).analyze_generated(analyze_generated);
    let engine = AnalysisEngine::new(registry, gate);

    let mut all: Vec<Diagnostic> = Vec::new();
    for path in &args.paths {
        let loaded = fixture::load_fixture_file(path)?;
        for tree in &loaded.trees {
            all.extend(engine.analyze(&loaded.compilation, tree)?);
        }
    }

    all.sort_by(|a, b| {
        (a.location.file.as_str(), a.location.span, a.rule.name)
            .cmp(&(b.location.file.as_str(), b.location.span, b.rule.name))
    });

    let has_error = all.iter().any(|d| d.level == Level::Error);

    match args.format {
        OutputFormat::Pretty => {
            for d in &all {
                println!(
                    "{}:{}:{}: {}: {}: {}",
                    d.location.file,
                    d.location.span.start.line,
                    d.location.span.start.column,
                    d.level.as_str(),
                    d.rule.name,
                    d.message
                );
            }
            println!("{} diagnostics", all.len());
        }
        OutputFormat::Json => {
            let out: Vec<JsonDiagnostic> = all.iter().map(JsonDiagnostic::from).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    if has_error || (args.deny_warnings && !all.is_empty()) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    file: String,
    line: usize,
    column: usize,
    level: String,
    rule: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternative: Option<String>,
}

impl From<&Diagnostic> for JsonDiagnostic {
    fn from(d: &Diagnostic) -> Self {
        Self {
            file: d.location.file.clone(),
            line: d.location.span.start.line,
            column: d.location.span.start.column,
            level: d.level.as_str().to_string(),
            rule: d.rule.name.to_string(),
            message: d.message.clone(),
            alternative: d.properties.get("alternative").cloned(),
        }
    }
}

fn infer_start_dir(args: &AnalyzeArgs) -> anyhow::Result<PathBuf> {
    let base = if let Some(p) = args.paths.first() {
        p.clone()
    } else {
        std::env::current_dir()?
    };

    let base = if base.is_file() {
        base.parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        base
    };

    Ok(base)
}
