//! Rule engine that finds synchronous calls with a verified awaitable
//! alternative.
//!
//! The crate exposes an [`AnalysisEngine`] over a host-provided
//! [`semantic::SemanticModel`] and immutable [`syntax::SyntaxTree`] values.
//! Rules emit findings; the [`report::ReportingGate`] decides which become
//! diagnostics and where they are delivered. The canonical rule suggests
//! `FooAsync` for a synchronous `Foo()` call in asynchronous code, but only
//! after a speculative rewrite of the call proves the suggestion binds.

pub mod candidates;
pub mod cli;
pub mod config;
pub mod containers;
pub mod diagnostics;
pub mod error;
pub mod fixture;
pub mod level;
pub mod location;
pub mod report;
pub mod rule;
pub mod rules;
pub mod semantic;
pub mod symbols;
pub mod syntax;
pub mod telemetry;
pub mod verifier;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::diagnostics::Diagnostic;
use crate::error::{Error, Result};
use crate::report::ReportingGate;
use crate::rule::RuleRegistry;
use crate::semantic::SemanticModel;
use crate::syntax::SyntaxTree;

/// Cooperative cancellation token shared between a host and an analysis.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Engine orchestrates analysis by walking trees and running registered rules,
/// routing every finding through the reporting gate.
pub struct AnalysisEngine {
    registry: RuleRegistry,
    gate: ReportingGate,
}

impl AnalysisEngine {
    pub fn new(registry: RuleRegistry, gate: ReportingGate) -> Self {
        Self { registry, gate }
    }

    /// Analyze one tree of `model`'s compilation and return the diagnostics
    /// accepted by the gate, in tree preorder.
    pub fn analyze(
        &self,
        model: &dyn SemanticModel,
        tree: &SyntaxTree,
    ) -> Result<Vec<Diagnostic>> {
        self.analyze_with(model, tree, &CancellationToken::new())
    }

    /// Like [`AnalysisEngine::analyze`], observing `cancel` per node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when the token fires, and propagates gate
    /// contract violations.
    pub fn analyze_with(
        &self,
        model: &dyn SemanticModel,
        tree: &SyntaxTree,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>> {
        instrument_block!("analyze", {
            let mut out = Vec::new();
            let mut stack = vec![tree.root()];
            while let Some(node) = stack.pop() {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }

                let kind = tree.kind(node);
                // A non-async function body cannot suspend; skip it wholesale
                // unless something inside opens an async scope of its own.
                if kind.is_function_like()
                    && !tree.is_async(node)
                    && !tree.subtree_has_async(node)
                {
                    continue;
                }

                for rule in self.registry.rules_for(kind) {
                    if let Some(finding) = rule.check(model, tree, node, cancel)? {
                        self.gate.process(model, tree, finding, &mut out)?;
                    }
                }

                for child in tree.children(node).iter().rev() {
                    stack.push(*child);
                }
            }
            Ok(out)
        })
    }
}

/// Construct an [`AnalysisEngine`] with all built-in rules and a direct
/// reporting channel.
#[must_use]
pub fn create_default_engine() -> AnalysisEngine {
    AnalysisEngine::new(RuleRegistry::default_rules(), ReportingGate::default())
}
