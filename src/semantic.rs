//! The resolution oracle seam and the in-crate compilation model behind it.
//!
//! [`SemanticModel`] is the capability surface the engine consumes: symbol
//! access, type lookup, member/base-type queries, invocation resolution and
//! the speculative variant used by the rewrite verifier. [`Compilation`] is
//! the crate's own implementation over fixture data; a host with a real
//! compiler can substitute its own model behind the same trait.

use crate::containers::SymbolContainerIndex;
use crate::symbols::{Symbol, SymbolId};
use crate::syntax::{NodeId, NodeKind, SyntaxTree, TreeId};
use std::collections::{HashMap, HashSet};

/// Outcome of resolving an invocation-shaped expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Resolution landed on exactly one method.
    Method(SymbolId),
    /// More than one applicable method; the call is ambiguous.
    Ambiguous,
    /// Nothing applicable. Not an error; treated as "no match".
    None,
}

impl Resolution {
    pub fn method(self) -> Option<SymbolId> {
        match self {
            Resolution::Method(id) => Some(id),
            _ => None,
        }
    }
}

/// Host-provided semantic analysis surface.
///
/// All operations are pure reads over immutable state; implementations must
/// be shareable across concurrent analyses.
pub trait SemanticModel: Send + Sync {
    fn symbol(&self, id: SymbolId) -> &Symbol;

    /// Resolve a type by its well-known name.
    fn type_by_name(&self, name: &str) -> Option<SymbolId>;

    /// Base types of `ty`, nearest first.
    fn base_types(&self, ty: SymbolId) -> Vec<SymbolId>;

    /// Members of `ty` (the type itself, not its bases) matching `name`, in
    /// declaration order.
    fn members_named(&self, ty: SymbolId, name: &str) -> Vec<SymbolId>;

    /// Whether awaiting a call to `method` is well-formed, i.e. its return
    /// type is task-like.
    fn is_awaitable(&self, method: SymbolId) -> bool;

    /// Static type of an expression node, when the model can compute one.
    fn type_of(&self, tree: &SyntaxTree, node: NodeId) -> Option<SymbolId>;

    /// The type a node names directly (a static-call receiver), as opposed to
    /// the type of a value it evaluates to.
    fn type_reference(&self, tree: &SyntaxTree, node: NodeId) -> Option<SymbolId>;

    /// Resolve the method an invocation binds to.
    fn resolve_invocation(&self, tree: &SyntaxTree, invocation: NodeId) -> Resolution;

    /// Resolve an invocation inside a hypothetical tree produced by
    /// [`SyntaxTree::speculate_await`]. The tree is not (and must not be)
    /// registered with the compilation.
    fn speculative_resolve(&self, tree: &SyntaxTree, invocation: NodeId) -> Resolution;

    /// Whether `tree` is a source unit of the current compilation.
    fn contains_tree(&self, tree: &SyntaxTree) -> bool;

    /// The per-compilation container index, built once at compilation start.
    fn container_index(&self) -> &SymbolContainerIndex;
}

/// In-memory compilation: symbol tables plus a small deterministic overload
/// resolver. Read-only once built.
#[derive(Debug)]
pub struct Compilation {
    symbols: Vec<Symbol>,
    types_by_name: HashMap<String, SymbolId>,
    members: HashMap<SymbolId, Vec<SymbolId>>,
    /// Static extension definition -> its reduced (instance-style) form.
    reduced: HashMap<SymbolId, SymbolId>,
    /// Extension containers whose methods are importable at call sites.
    extension_scope: Vec<SymbolId>,
    /// Identifier bindings visible to the resolver.
    locals: HashMap<String, SymbolId>,
    trees: HashSet<TreeId>,
    index: SymbolContainerIndex,
}

impl Compilation {
    pub fn builder() -> CompilationBuilder {
        CompilationBuilder::default()
    }

    /// Register `tree` as a member source unit of this compilation.
    pub fn add_tree(&mut self, tree: &SyntaxTree) {
        self.trees.insert(tree.id());
    }

    fn assignable(&self, from: SymbolId, to: SymbolId) -> bool {
        if from == to {
            return true;
        }
        self.base_types(from).contains(&to)
    }

    /// `None` argument types are unknown to the model (e.g. literals of an
    /// unregistered type) and match any parameter.
    fn params_match(&self, params: &[SymbolId], args: &[Option<SymbolId>]) -> bool {
        params.len() == args.len()
            && params
                .iter()
                .zip(args)
                .all(|(p, a)| a.is_none_or(|a| self.assignable(a, *p)))
    }

    fn members_with_bases(&self, ty: SymbolId, name: &str) -> Vec<SymbolId> {
        let mut out = self.members_named(ty, name);
        for base in self.base_types(ty) {
            out.extend(self.members_named(base, name));
        }
        out
    }

    fn arg_types(&self, tree: &SyntaxTree, invocation: NodeId) -> Vec<Option<SymbolId>> {
        tree.invocation_args(invocation)
            .iter()
            .map(|a| self.type_of(tree, *a))
            .collect()
    }

    fn resolve_static_call(
        &self,
        ty: SymbolId,
        name: &str,
        args: &[Option<SymbolId>],
    ) -> Resolution {
        let applicable: Vec<SymbolId> = self
            .members_with_bases(ty, name)
            .into_iter()
            .filter(|m| self.params_match(self.symbol(*m).params(), args))
            .collect();
        match applicable.as_slice() {
            [] => Resolution::None,
            [only] => Resolution::Method(*only),
            _ => Resolution::Ambiguous,
        }
    }

    fn resolve_member_call(
        &self,
        recv_ty: SymbolId,
        name: &str,
        args: &[Option<SymbolId>],
    ) -> Resolution {
        // Instance members shadow extension methods; extensions are only
        // considered when no instance member applies.
        let instance: Vec<SymbolId> = self
            .members_with_bases(recv_ty, name)
            .into_iter()
            .filter(|m| {
                let sym = self.symbol(*m);
                !sym.is_extension() && self.params_match(sym.params(), args)
            })
            .collect();
        match instance.as_slice() {
            [only] => return Resolution::Method(*only),
            [_, ..] => return Resolution::Ambiguous,
            [] => {}
        }

        let mut extensions = Vec::new();
        for container in &self.extension_scope {
            for m in self.members_named(*container, name) {
                let sym = self.symbol(m);
                if !sym.is_extension() {
                    continue;
                }
                let Some((receiver_param, rest)) = sym.params().split_first() else {
                    continue;
                };
                if self.assignable(recv_ty, *receiver_param) && self.params_match(rest, args) {
                    // Member syntax binds the reduced form.
                    if let Some(reduced) = self.reduced.get(&m) {
                        extensions.push(*reduced);
                    }
                }
            }
        }
        match extensions.as_slice() {
            [] => Resolution::None,
            [only] => Resolution::Method(*only),
            _ => Resolution::Ambiguous,
        }
    }
}

impl SemanticModel for Compilation {
    fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    fn type_by_name(&self, name: &str) -> Option<SymbolId> {
        self.types_by_name.get(name).copied()
    }

    fn base_types(&self, ty: SymbolId) -> Vec<SymbolId> {
        let mut out = Vec::new();
        let mut cur = self.symbol(ty).base_type();
        while let Some(base) = cur {
            out.push(base);
            cur = self.symbol(base).base_type();
        }
        out
    }

    fn members_named(&self, ty: SymbolId, name: &str) -> Vec<SymbolId> {
        self.members
            .get(&ty)
            .into_iter()
            .flatten()
            .copied()
            .filter(|m| self.symbol(*m).name() == name)
            .collect()
    }

    fn is_awaitable(&self, method: SymbolId) -> bool {
        self.symbol(method)
            .return_type()
            .is_some_and(|t| self.symbol(t).is_awaitable_type())
    }

    fn type_of(&self, tree: &SyntaxTree, node: NodeId) -> Option<SymbolId> {
        match tree.kind(node) {
            NodeKind::Identifier => {
                let text = tree.text(node)?;
                if let Some(ty) = self.locals.get(text) {
                    return Some(*ty);
                }
                // Integer literals type as `int` when the compilation
                // registers it; other literals stay unknown.
                if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
                    return self.type_by_name("int");
                }
                None
            }
            NodeKind::Invocation => {
                let method = self.resolve_invocation(tree, node).method()?;
                self.symbol(method).return_type()
            }
            NodeKind::Await => {
                let inner = tree.children(node).first().copied()?;
                let ty = self.type_of(tree, inner)?;
                self.symbol(ty).awaited_result()
            }
            NodeKind::Parenthesized | NodeKind::NullForgiving | NodeKind::Argument => {
                let inner = tree.children(node).first().copied()?;
                self.type_of(tree, inner)
            }
            NodeKind::ConditionalAccess => {
                let value = tree.children(node).get(1).copied()?;
                self.type_of(tree, value)
            }
            _ => None,
        }
    }

    fn type_reference(&self, tree: &SyntaxTree, node: NodeId) -> Option<SymbolId> {
        if tree.kind(node) != NodeKind::Identifier {
            return None;
        }
        let text = tree.text(node)?;
        if self.locals.contains_key(text) {
            return None;
        }
        self.type_by_name(text)
    }

    fn resolve_invocation(&self, tree: &SyntaxTree, invocation: NodeId) -> Resolution {
        if tree.kind(invocation) != NodeKind::Invocation {
            return Resolution::None;
        }
        let Some(name_node) = tree.invoked_name_node(invocation) else {
            return Resolution::None;
        };
        let Some(name) = tree.text(name_node) else {
            return Resolution::None;
        };
        let args = self.arg_types(tree, invocation);

        let Some(receiver) = tree.invocation_receiver(invocation) else {
            return Resolution::None;
        };
        if let Some(ty) = self.type_reference(tree, receiver) {
            return self.resolve_static_call(ty, name, &args);
        }
        match self.type_of(tree, receiver) {
            Some(recv_ty) => self.resolve_member_call(recv_ty, name, &args),
            None => Resolution::None,
        }
    }

    fn speculative_resolve(&self, tree: &SyntaxTree, invocation: NodeId) -> Resolution {
        // Same resolver, run against a hypothetical tree. Nothing here may
        // depend on the tree being a compilation member.
        self.resolve_invocation(tree, invocation)
    }

    fn contains_tree(&self, tree: &SyntaxTree) -> bool {
        self.trees.contains(&tree.id())
    }

    fn container_index(&self) -> &SymbolContainerIndex {
        &self.index
    }
}

/// Assembles a [`Compilation`]: declare types and methods, then `build` to
/// freeze the tables and resolve the well-known container pairs.
#[derive(Default)]
pub struct CompilationBuilder {
    symbols: Vec<Symbol>,
    types_by_name: HashMap<String, SymbolId>,
    members: HashMap<SymbolId, Vec<SymbolId>>,
    reduced: HashMap<SymbolId, SymbolId>,
    extension_scope: Vec<SymbolId>,
    locals: HashMap<String, SymbolId>,
    pairs: Vec<(String, String)>,
}

impl CompilationBuilder {
    fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn add_type(&mut self, name: &str, base: Option<SymbolId>) -> SymbolId {
        let id = self.push(Symbol::new_type(name, base));
        self.types_by_name.insert(name.to_string(), id);
        id
    }

    /// Declare a task-like type; awaiting a value of it yields `result`.
    pub fn add_awaitable_type(&mut self, name: &str, result: Option<SymbolId>) -> SymbolId {
        let id = self.push(Symbol::new_awaitable_type(name, result));
        self.types_by_name.insert(name.to_string(), id);
        id
    }

    pub fn add_method(
        &mut self,
        containing: SymbolId,
        name: &str,
        params: &[SymbolId],
        returns: Option<SymbolId>,
    ) -> SymbolId {
        let id = self.push(Symbol::new_method(
            name,
            containing,
            params.to_vec(),
            returns,
            false,
            None,
        ));
        self.members.entry(containing).or_default().push(id);
        id
    }

    /// Declare a static extension method on `container`. `params` includes
    /// the receiver as its first element. A reduced counterpart (what member
    /// syntax binds to) is created alongside; its declaring type is the
    /// receiver type.
    pub fn add_extension_method(
        &mut self,
        container: SymbolId,
        name: &str,
        params: &[SymbolId],
        returns: Option<SymbolId>,
    ) -> SymbolId {
        assert!(
            !params.is_empty(),
            "extension method needs a receiver parameter"
        );
        let stat = self.push(Symbol::new_method(
            name,
            container,
            params.to_vec(),
            returns,
            true,
            None,
        ));
        self.members.entry(container).or_default().push(stat);

        let reduced = self.push(Symbol::new_method(
            name,
            params[0],
            params[1..].to_vec(),
            returns,
            true,
            Some(stat),
        ));
        self.reduced.insert(stat, reduced);
        stat
    }

    /// Bring `container`'s extension methods into call-site scope.
    pub fn import_extensions(&mut self, container: SymbolId) {
        if !self.extension_scope.contains(&container) {
            self.extension_scope.push(container);
        }
    }

    pub fn declare_local(&mut self, name: &str, ty: SymbolId) {
        self.locals.insert(name.to_string(), ty);
    }

    /// Register a (base type, container type) pair for the container index.
    pub fn well_known_pair(&mut self, base: &str, container: &str) {
        self.pairs.push((base.to_string(), container.to_string()));
    }

    /// Register the crate's default well-known pairs.
    pub fn default_well_known(&mut self) {
        for (base, container) in crate::containers::WELL_KNOWN_PAIRS {
            self.well_known_pair(base, container);
        }
    }

    #[must_use]
    pub fn build(self) -> Compilation {
        let index = SymbolContainerIndex::build(
            self.pairs.iter().map(|(b, c)| (b.as_str(), c.as_str())),
            |name| self.types_by_name.get(name).copied(),
        );
        Compilation {
            symbols: self.symbols,
            types_by_name: self.types_by_name,
            members: self.members,
            reduced: self.reduced,
            extension_scope: self.extension_scope,
            locals: self.locals,
            trees: HashSet::new(),
            index,
        }
    }
}
