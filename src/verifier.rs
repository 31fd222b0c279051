//! Speculative rewrite verification.
//!
//! A name match alone is not enough to suggest a replacement: once the call
//! is renamed and awaited, overload and extension-method resolution can land
//! somewhere else entirely. The only sound check is to build the hypothetical
//! rewritten tree and ask the oracle what the call binds to there. The real
//! tree is never touched.

use crate::CancellationToken;
use crate::error::{Error, Result};
use crate::semantic::{Resolution, SemanticModel};
use crate::symbols::SymbolId;
use crate::syntax::{Marker, NodeId, SyntaxTree};

/// Whether replacing `invocation`'s name with `candidate`'s and awaiting the
/// rewrite root still resolves to exactly `candidate` (or to a reduced form
/// of it).
///
/// Any other outcome (ambiguity, a different overload, no resolution)
/// rejects the candidate. Rejection is not an error.
///
/// The caller is responsible for the "already awaited" short-circuit; that is
/// a property of the finding, not of the rewrite.
pub fn verify(
    model: &dyn SemanticModel,
    tree: &SyntaxTree,
    invocation: NodeId,
    candidate: SymbolId,
    cancel: &CancellationToken,
) -> Result<bool> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let rewrite_root = tree.rewrite_root(invocation);
    let marker = Marker::fresh();
    let name = model.symbol(candidate).name().to_string();

    let Some(speculative) = tree.speculate_await(invocation, rewrite_root, &name, marker) else {
        return Ok(false);
    };
    let Some(marked) = speculative.annotated(marker) else {
        return Ok(false);
    };

    match model.speculative_resolve(&speculative, marked) {
        Resolution::Method(resolved) => {
            Ok(resolved == candidate || model.symbol(resolved).reduced_from() == Some(candidate))
        }
        Resolution::Ambiguous | Resolution::None => Ok(false),
    }
}
