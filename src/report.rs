//! The reporting gate between raw findings and surfaced diagnostics.
//!
//! Rules hand every finding to [`ReportingGate::process`]; the gate alone
//! decides whether it becomes a [`Diagnostic`] and where the diagnostic goes.

use crate::diagnostics::{Diagnostic, Finding, format_message};
use crate::error::{Error, Result};
use crate::location::LocationMapper;
use crate::rule::RuleSettings;
use crate::semantic::SemanticModel;
use crate::syntax::{SourceKind, SyntaxTree};

/// Where accepted diagnostics are delivered. Exactly one destination exists
/// per gate, so a host can never wire two delivery paths at once.
pub enum ReportChannel {
    /// Collect into the result vector returned by the engine.
    Direct,
    /// Hand each diagnostic to a host callback instead of collecting it.
    External(Box<dyn Fn(&Diagnostic) + Send + Sync>),
    /// Collect, but only diagnostics the predicate accepts.
    LegacyPredicate(Box<dyn Fn(&Diagnostic) -> bool + Send + Sync>),
}

impl std::fmt::Debug for ReportChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReportChannel::Direct => "Direct",
            ReportChannel::External(_) => "External",
            ReportChannel::LegacyPredicate(_) => "LegacyPredicate",
        };
        f.write_str(name)
    }
}

/// Filters findings and turns the survivors into diagnostics.
#[derive(Debug)]
pub struct ReportingGate {
    settings: RuleSettings,
    channel: ReportChannel,
    analyze_generated: bool,
}

impl Default for ReportingGate {
    fn default() -> Self {
        Self::new(RuleSettings::default())
    }
}

impl ReportingGate {
    #[must_use]
    pub fn new(settings: RuleSettings) -> Self {
        Self {
            settings,
            channel: ReportChannel::Direct,
            analyze_generated: false,
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: ReportChannel) -> Self {
        self.channel = channel;
        self
    }

    #[must_use]
    pub fn analyze_generated(mut self, enabled: bool) -> Self {
        self.analyze_generated = enabled;
        self
    }

    /// Run one finding through the gate.
    ///
    /// Dropped findings leave `out` untouched. Accepted findings become
    /// diagnostics delivered through the configured channel; only the
    /// `Direct` and passing `LegacyPredicate` cases append to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContractViolation`] when the finding's tree is not a
    /// source unit of `model`'s compilation.
    pub fn process(
        &self,
        model: &dyn SemanticModel,
        tree: &SyntaxTree,
        finding: Finding,
        out: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        if tree.is_generated() && !self.analyze_generated {
            return Ok(());
        }

        let scope = finding.rule.scope;
        let in_scope = if tree.is_generated() {
            scope.generated
        } else {
            match tree.source_kind() {
                SourceKind::Main => scope.main,
                SourceKind::Test => scope.test,
            }
        };
        if !in_scope {
            return Ok(());
        }

        let level = self.settings.level_for(finding.rule.name);
        if level == crate::level::Level::Allow {
            return Ok(());
        }

        if !model.contains_tree(tree) {
            #[cfg(feature = "telemetry")]
            tracing::error!(
                file = tree.file(),
                rule = finding.rule.name,
                "finding reported against a tree outside the compilation"
            );
            return Err(Error::contract(format!(
                "tree '{}' is not part of the analyzed compilation",
                tree.file()
            )));
        }

        let location = LocationMapper::map_if_generated(tree, &finding.location);

        let mut properties = std::collections::BTreeMap::new();
        if let Some(alt) = &finding.alternative {
            properties.insert("alternative".to_string(), alt.clone());
        }

        let diagnostic = Diagnostic {
            rule: finding.rule,
            level,
            location,
            additional_locations: Vec::new(),
            message: format_message(finding.rule.message, &finding.args),
            properties,
        };

        match &self.channel {
            ReportChannel::Direct => out.push(diagnostic),
            ReportChannel::External(callback) => callback(&diagnostic),
            ReportChannel::LegacyPredicate(filter) => {
                if filter(&diagnostic) {
                    out.push(diagnostic);
                }
            }
        }
        Ok(())
    }
}
