use crate::CancellationToken;
use crate::diagnostics::Finding;
use crate::error::Result;
use crate::level::Level;
use crate::semantic::SemanticModel;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use anyhow::anyhow;
use std::collections::{HashMap, HashSet};

/// High-level categories used to group rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleCategory {
    Reliability,
    Performance,
    Style,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Reliability => "reliability",
            RuleCategory::Performance => "performance",
            RuleCategory::Style => "style",
        }
    }
}

/// Which source classifications a rule applies to. The reporting gate drops
/// findings whose tree classification falls outside this scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleScope {
    pub main: bool,
    pub test: bool,
    pub generated: bool,
}

impl RuleScope {
    pub const fn main_only() -> Self {
        Self {
            main: true,
            test: false,
            generated: false,
        }
    }

    pub const fn main_and_test() -> Self {
        Self {
            main: true,
            test: true,
            generated: false,
        }
    }

    pub const fn all_sources() -> Self {
        Self {
            main: true,
            test: true,
            generated: true,
        }
    }
}

/// Static metadata describing a rule.
#[derive(Debug)]
pub struct RuleDescriptor {
    pub name: &'static str,
    pub category: RuleCategory,
    /// Message template with `{0}`-style positional placeholders.
    pub message: &'static str,
    pub description: &'static str,
    pub scope: RuleScope,
}

/// A single rule that can inspect nodes of the kinds it registers for.
pub trait Rule: Send + Sync {
    fn descriptor(&self) -> &'static RuleDescriptor;

    /// The closed set of node kinds this rule wants to see.
    fn node_kinds(&self) -> &'static [NodeKind];

    /// Inspect one node. At most one finding per node.
    fn check(
        &self,
        model: &dyn SemanticModel,
        tree: &SyntaxTree,
        node: NodeId,
        cancel: &CancellationToken,
    ) -> Result<Option<Finding>>;
}

/// Per-rule configuration derived from `await-clippy.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSettings {
    levels: HashMap<String, Level>,
}

impl RuleSettings {
    #[must_use]
    pub fn with_config_levels(mut self, levels: HashMap<String, Level>) -> Self {
        self.levels.extend(levels);
        self
    }

    #[must_use]
    pub fn disable(mut self, disabled: impl IntoIterator<Item = String>) -> Self {
        for name in disabled {
            self.levels.insert(name, Level::Allow);
        }
        self
    }

    pub fn level_for(&self, rule_name: &str) -> Level {
        self.levels.get(rule_name).copied().unwrap_or_default()
    }
}

/// Registry dispatching node kinds to the rules registered for them.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    by_kind: HashMap<NodeKind, Vec<usize>>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| r.descriptor().name)
                    .collect::<Vec<_>>(),
            )
            .field("by_kind", &self.by_kind)
            .finish()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            by_kind: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.push(Box::new(rule));
        self
    }

    fn push(&mut self, rule: Box<dyn Rule>) {
        let idx = self.rules.len();
        for kind in rule.node_kinds() {
            self.by_kind.entry(*kind).or_default().push(idx);
        }
        self.rules.push(rule);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(Box::as_ref)
    }

    /// Rules registered for `kind`, in registration order.
    pub fn rules_for(&self, kind: NodeKind) -> impl Iterator<Item = &dyn Rule> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .map(|idx| self.rules[*idx].as_ref())
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static RuleDescriptor> + '_ {
        self.rules.iter().map(|r| r.descriptor())
    }

    pub fn find_descriptor(&self, name: &str) -> Option<&'static RuleDescriptor> {
        self.descriptors().find(|d| d.name == name)
    }

    #[must_use = "registry should be used to create an engine"]
    pub fn default_rules() -> Self {
        Self::new().with_rule(crate::rules::AwaitableAlternativeRule)
    }

    /// Filter the default rule set.
    ///
    /// # Errors
    ///
    /// Returns an error if any rule name in `only`, `skip`, or `disabled` is
    /// unknown.
    pub fn default_rules_filtered(
        only: &[String],
        skip: &[String],
        disabled: &[String],
    ) -> Result<Self> {
        let all = Self::default_rules();
        let known: HashSet<&str> = all.descriptors().map(|d| d.name).collect();

        for n in only.iter().chain(skip.iter()).chain(disabled.iter()) {
            if !known.contains(n.as_str()) {
                return Err(anyhow!("unknown rule: {n}").into());
            }
        }

        let only_set: Option<HashSet<&str>> = if only.is_empty() {
            None
        } else {
            Some(only.iter().map(String::as_str).collect())
        };
        let skip_set: HashSet<&str> = skip
            .iter()
            .chain(disabled.iter())
            .map(String::as_str)
            .collect();

        let mut reg = Self::new();
        for rule in all.rules {
            let name = rule.descriptor().name;
            if let Some(ref only) = only_set
                && !only.contains(name)
            {
                continue;
            }
            if skip_set.contains(name) {
                continue;
            }
            reg.push(rule);
        }
        Ok(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rule_names_are_rejected() {
        let err = RuleRegistry::default_rules_filtered(&["nope".to_string()], &[], &[])
            .expect_err("unknown rule should error");
        assert!(err.to_string().contains("unknown rule: nope"));
    }

    #[test]
    fn skip_removes_the_rule() {
        let reg = RuleRegistry::default_rules_filtered(
            &[],
            &["awaitable_alternative".to_string()],
            &[],
        )
        .expect("known rule name");
        assert_eq!(reg.rules().count(), 0);
    }

    #[test]
    fn settings_default_to_warn() {
        let settings = RuleSettings::default();
        assert_eq!(settings.level_for("awaitable_alternative"), Level::Warn);
    }

    #[test]
    fn disable_forces_allow() {
        let settings = RuleSettings::default().disable(["awaitable_alternative".to_string()]);
        assert_eq!(settings.level_for("awaitable_alternative"), Level::Allow);
    }
}
