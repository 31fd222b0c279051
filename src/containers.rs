//! Index from well-known base types to the container types hosting their
//! awaitable extension-method alternatives.
//!
//! Built once per compilation and read-only afterwards, so it can be shared
//! across concurrent analyses without locking.

use crate::symbols::SymbolId;
use std::collections::HashMap;

/// Well-known (base type, extension container) pairs resolved against every
/// compilation. Pairs whose types the compilation does not reference are
/// silently omitted.
pub const WELL_KNOWN_PAIRS: &[(&str, &str)] = &[
    ("IQueryable", "EntityFrameworkQueryableExtensions"),
    ("IQueryable", "RelationalQueryableExtensions"),
    ("DbSet", "EntityFrameworkQueryableExtensions"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolContainerIndex {
    map: HashMap<SymbolId, Vec<SymbolId>>,
}

impl SymbolContainerIndex {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve `pairs` through `resolve` and index every pair where both
    /// sides resolve. Insertion order under each key is preserved; that order
    /// is the candidate-search determinism contract downstream.
    pub fn build<'p>(
        pairs: impl IntoIterator<Item = (&'p str, &'p str)>,
        mut resolve: impl FnMut(&str) -> Option<SymbolId>,
    ) -> Self {
        let mut map: HashMap<SymbolId, Vec<SymbolId>> = HashMap::new();
        for (base, container) in pairs {
            let (Some(base), Some(container)) = (resolve(base), resolve(container)) else {
                continue;
            };
            map.entry(base).or_default().push(container);
        }
        Self { map }
    }

    /// Container types registered for `base`, in insertion order. Empty for
    /// unknown keys.
    pub fn containers_for(&self, base: SymbolId) -> &[SymbolId] {
        self.map.get(&base).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(known: &[(&str, u32)]) -> impl FnMut(&str) -> Option<SymbolId> + use<> {
        let known: Vec<(String, SymbolId)> = known
            .iter()
            .map(|(n, id)| (n.to_string(), SymbolId(*id)))
            .collect();
        move |name| {
            known
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, id)| *id)
        }
    }

    #[test]
    fn unresolved_pairs_are_omitted_without_error() {
        let pairs = [("IQueryable", "EfExtensions"), ("IQueryable", "Missing")];
        let index = SymbolContainerIndex::build(
            pairs.iter().copied(),
            resolver(&[("IQueryable", 0), ("EfExtensions", 1)]),
        );
        assert_eq!(index.containers_for(SymbolId(0)), &[SymbolId(1)]);
    }

    #[test]
    fn multiple_containers_keep_insertion_order() {
        let pairs = [("Q", "B"), ("Q", "A")];
        let index = SymbolContainerIndex::build(
            pairs.iter().copied(),
            resolver(&[("Q", 0), ("A", 1), ("B", 2)]),
        );
        assert_eq!(index.containers_for(SymbolId(0)), &[SymbolId(2), SymbolId(1)]);
    }

    #[test]
    fn unknown_key_yields_empty_slice() {
        let index = SymbolContainerIndex::empty();
        assert!(index.containers_for(SymbolId(7)).is_empty());
    }

    #[test]
    fn building_twice_yields_equal_indices() {
        let pairs = [("Q", "A"), ("Q", "B"), ("R", "A")];
        let known = [("Q", 0), ("R", 1), ("A", 2), ("B", 3)];
        let a = SymbolContainerIndex::build(pairs.iter().copied(), resolver(&known));
        let b = SymbolContainerIndex::build(pairs.iter().copied(), resolver(&known));
        assert_eq!(a, b);
    }
}
