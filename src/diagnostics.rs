use crate::level::Level;
use crate::location::Location;
use crate::rule::RuleDescriptor;
use std::collections::BTreeMap;

/// Raw finding produced by a rule. Immutable; consumed exactly once by the
/// reporting gate, which decides whether it becomes a [`Diagnostic`].
#[derive(Debug, Clone)]
#[must_use]
pub struct Finding {
    pub rule: &'static RuleDescriptor,
    pub location: Location,
    /// Positional arguments for the rule's message template.
    pub args: Vec<String>,
    /// Suggested replacement symbol name, when the rule found one.
    pub alternative: Option<String>,
}

/// A surfaced diagnostic, ready for a reporting channel.
#[derive(Debug, Clone)]
#[must_use]
pub struct Diagnostic {
    pub rule: &'static RuleDescriptor,
    pub level: Level,
    pub location: Location,
    pub additional_locations: Vec<Location>,
    pub message: String,
    pub properties: BTreeMap<String, String>,
}

/// Expand `{0}`, `{1}`, ... placeholders in a message template.
pub(crate) fn format_message(template: &str, args: &[String]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{i}}}"), arg);
    }
    out
}
