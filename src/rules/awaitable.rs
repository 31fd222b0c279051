//! Flag synchronous calls inside asynchronous code when a verified awaitable
//! alternative exists.

use crate::CancellationToken;
use crate::candidates::find_candidates;
use crate::diagnostics::Finding;
use crate::error::Result;
use crate::rule::{Rule, RuleCategory, RuleDescriptor, RuleScope};
use crate::semantic::SemanticModel;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use crate::verifier::verify;

pub struct AwaitableAlternativeRule;

static AWAITABLE_ALTERNATIVE: RuleDescriptor = RuleDescriptor {
    name: "awaitable_alternative",
    category: RuleCategory::Reliability,
    message: "Await '{0}' instead of calling '{1}' synchronously",
    description: "Synchronous calls in asynchronous code block the execution context when an \
                  awaitable counterpart is available",
    scope: RuleScope::main_and_test(),
};

impl Rule for AwaitableAlternativeRule {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &AWAITABLE_ALTERNATIVE
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Invocation]
    }

    fn check(
        &self,
        model: &dyn SemanticModel,
        tree: &SyntaxTree,
        node: NodeId,
        cancel: &CancellationToken,
    ) -> Result<Option<Finding>> {
        // The scope can flip inside nested non-async lambdas even when the
        // surrounding code block was eligible.
        if !tree.scope_is_eligible(node) {
            return Ok(None);
        }
        // Already handled correctly; nothing to fix.
        if tree.already_awaited(node) {
            return Ok(None);
        }

        let Some(resolved) = model.resolve_invocation(tree, node).method() else {
            return Ok(None);
        };
        if model.is_awaitable(resolved) {
            return Ok(None);
        }
        let Some(declaring) = model.symbol(resolved).containing_type() else {
            return Ok(None);
        };

        let invoked_type = tree
            .invocation_receiver(node)
            .and_then(|recv| {
                model
                    .type_reference(tree, recv)
                    .or_else(|| model.type_of(tree, recv))
            })
            .unwrap_or(declaring);

        let name = model.symbol(resolved).name().to_string();
        let wanted = format!("{name}Async");

        for candidate in find_candidates(
            model,
            &wanted,
            invoked_type,
            declaring,
            model.container_index(),
        ) {
            if !model.is_awaitable(candidate) {
                continue;
            }
            if verify(model, tree, node, candidate, cancel)? {
                let alternative = model.symbol(candidate).name().to_string();
                let location = tree
                    .invoked_name_node(node)
                    .map_or_else(|| tree.location(node), |n| tree.location(n));
                return Ok(Some(Finding {
                    rule: self.descriptor(),
                    location,
                    args: vec![alternative.clone(), name],
                    alternative: Some(alternative),
                }));
            }
        }

        Ok(None)
    }
}
