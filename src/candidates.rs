//! Candidate discovery for replacement symbols.
//!
//! Given the name to look for and the types involved in the original call,
//! enumerate every method that could plausibly stand in for it. The verifier
//! decides which candidates actually survive; this module's only contract is
//! the deterministic search-domain order, because the rule reports the first
//! candidate that verifies.

use crate::containers::SymbolContainerIndex;
use crate::semantic::SemanticModel;
use crate::symbols::SymbolId;
use itertools::Itertools;

/// Methods named `name` found across the candidate search domain:
/// the invoked type and its base types in order, then the containers the
/// index registers for the declaring type, then the declaring type itself.
pub fn find_candidates(
    model: &dyn SemanticModel,
    name: &str,
    invoked_type: SymbolId,
    declaring_type: SymbolId,
    index: &SymbolContainerIndex,
) -> Vec<SymbolId> {
    let mut domain: Vec<SymbolId> = Vec::new();
    domain.push(invoked_type);
    domain.extend(model.base_types(invoked_type));
    domain.extend(index.containers_for(declaring_type).iter().copied());
    domain.push(declaring_type);

    let mut out: Vec<SymbolId> = Vec::new();
    for ty in domain.into_iter().unique() {
        for member in model.members_named(ty, name) {
            if model.symbol(member).is_method() && !out.contains(&member) {
                out.push(member);
            }
        }
    }
    out
}
