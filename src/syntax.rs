//! Immutable syntax trees and the speculative rewrite primitives.
//!
//! Trees are arena-backed values handed to the engine by the host (here, the
//! fixture loader). A tree is never mutated after [`TreeBuilder::build`];
//! "rewriting" clones the arena into a fresh [`SyntaxTree`] value and the
//! replaced node is relocated afterwards through a marker annotation kept in
//! a side map, never through a mutable node field.

use crate::location::{Location, Span};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle to a node within one [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a tree value. Every built (or speculatively rewritten) tree
/// gets a fresh id; compilation membership is tracked against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Marker used to relocate a node inside a speculatively rewritten tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker(u64);

impl Marker {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Closed set of node kinds the engine dispatches over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    CompilationUnit,
    Method,
    Lambda,
    LocalFunction,
    Block,
    Invocation,
    MemberAccess,
    ConditionalAccess,
    NullForgiving,
    Parenthesized,
    Await,
    Identifier,
    Argument,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit => "compilation_unit",
            NodeKind::Method => "method",
            NodeKind::Lambda => "lambda",
            NodeKind::LocalFunction => "local_function",
            NodeKind::Block => "block",
            NodeKind::Invocation => "invocation",
            NodeKind::MemberAccess => "member_access",
            NodeKind::ConditionalAccess => "conditional_access",
            NodeKind::NullForgiving => "null_forgiving",
            NodeKind::Parenthesized => "parenthesized",
            NodeKind::Await => "await",
            NodeKind::Identifier => "identifier",
            NodeKind::Argument => "argument",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let kind = match text {
            "compilation_unit" => NodeKind::CompilationUnit,
            "method" => NodeKind::Method,
            "lambda" => NodeKind::Lambda,
            "local_function" => NodeKind::LocalFunction,
            "block" => NodeKind::Block,
            "invocation" => NodeKind::Invocation,
            "member_access" => NodeKind::MemberAccess,
            "conditional_access" => NodeKind::ConditionalAccess,
            "null_forgiving" => NodeKind::NullForgiving,
            "parenthesized" => NodeKind::Parenthesized,
            "await" => NodeKind::Await,
            "identifier" => NodeKind::Identifier,
            "argument" => NodeKind::Argument,
            _ => return None,
        };
        Some(kind)
    }

    /// Function-like kinds open a new execution scope.
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            NodeKind::Method | NodeKind::Lambda | NodeKind::LocalFunction
        )
    }

    /// Wrapper kinds an `await` rewrite has to stay outside of.
    fn is_await_wrapper(&self) -> bool {
        matches!(
            self,
            NodeKind::MemberAccess
                | NodeKind::ConditionalAccess
                | NodeKind::NullForgiving
                | NodeKind::Parenthesized
        )
    }
}

/// Classification of a source unit for scope filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Main,
    Test,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Main => "main",
            SourceKind::Test => "test",
        }
    }
}

/// Line mapping from a generated region back to original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRegion {
    pub generated_start_line: usize,
    pub generated_end_line: usize,
    pub original_file: String,
    pub original_start_line: usize,
}

/// Metadata attached to trees that are generated output of another source
/// format. `regions` may be empty when the generator emitted no mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedInfo {
    pub regions: Vec<MappedRegion>,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    text: Option<String>,
    is_async: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Immutable syntax tree for one compilation unit.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    id: TreeId,
    file: String,
    source_kind: SourceKind,
    generated: Option<GeneratedInfo>,
    nodes: Vec<NodeData>,
    root: NodeId,
    annotations: HashMap<Marker, NodeId>,
}

impl SyntaxTree {
    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn is_generated(&self) -> bool {
        self.generated.is_some()
    }

    pub fn generated(&self) -> Option<&GeneratedInfo> {
        self.generated.as_ref()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.index()].kind
    }

    pub fn span(&self, node: NodeId) -> Span {
        self.nodes[node.index()].span
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.index()].text.as_deref()
    }

    pub fn is_async(&self, node: NodeId) -> bool {
        self.nodes[node.index()].is_async
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    pub fn location(&self, node: NodeId) -> Location {
        Location {
            file: self.file.clone(),
            span: self.span(node),
        }
    }

    /// Preorder traversal of `node` and everything below it.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![node],
        }
    }

    /// Node tagged with `marker` by a speculative rewrite, if any.
    pub fn annotated(&self, marker: Marker) -> Option<NodeId> {
        self.annotations.get(&marker).copied()
    }

    /// The expression an inserted `await` would have to wrap: the outermost
    /// chain of member-access, conditional-access, null-forgiving and
    /// parenthesization wrappers around `node`.
    pub fn rewrite_root(&self, node: NodeId) -> NodeId {
        let mut cur = node;
        while let Some(parent) = self.parent(cur) {
            if !self.kind(parent).is_await_wrapper() {
                break;
            }
            cur = parent;
        }
        cur
    }

    /// Whether the invocation's rewrite root already sits under an `await`.
    pub fn already_awaited(&self, invocation: NodeId) -> bool {
        let root = self.rewrite_root(invocation);
        self.parent(root)
            .is_some_and(|p| self.kind(p) == NodeKind::Await)
    }

    /// Nearest enclosing function-like ancestor, if any.
    pub fn enclosing_function(&self, node: NodeId) -> Option<NodeId> {
        let mut cur = self.parent(node);
        while let Some(id) = cur {
            if self.kind(id).is_function_like() {
                return Some(id);
            }
            cur = self.parent(id);
        }
        None
    }

    /// Whether the scope at `node` supports suspension: the nearest enclosing
    /// function is asynchronous, or the node sits directly in the compilation
    /// unit (top-level code is implicitly eligible).
    pub fn scope_is_eligible(&self, node: NodeId) -> bool {
        match self.enclosing_function(node) {
            Some(func) => self.is_async(func),
            None => true,
        }
    }

    /// Whether any function-like node at or below `node` is asynchronous.
    pub fn subtree_has_async(&self, node: NodeId) -> bool {
        self.descendants(node)
            .any(|n| self.kind(n).is_function_like() && self.is_async(n))
    }

    /// The name token being invoked: the callee identifier itself, or the
    /// member name of a member-access callee.
    pub fn invoked_name_node(&self, invocation: NodeId) -> Option<NodeId> {
        let callee = self.children(invocation).first().copied()?;
        match self.kind(callee) {
            NodeKind::Identifier => Some(callee),
            NodeKind::MemberAccess => {
                let name = self.children(callee).get(1).copied()?;
                (self.kind(name) == NodeKind::Identifier).then_some(name)
            }
            _ => None,
        }
    }

    /// Receiver expression of an invocation: the member-access receiver, or
    /// the conditional-access receiver for `x?.Name()` shapes.
    pub fn invocation_receiver(&self, invocation: NodeId) -> Option<NodeId> {
        let callee = self.children(invocation).first().copied()?;
        match self.kind(callee) {
            NodeKind::MemberAccess => self.children(callee).first().copied(),
            NodeKind::Identifier => {
                let parent = self.parent(invocation)?;
                if self.kind(parent) == NodeKind::ConditionalAccess
                    && self.children(parent).get(1).copied() == Some(invocation)
                {
                    self.children(parent).first().copied()
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Argument nodes of an invocation (everything after the callee).
    pub fn invocation_args(&self, invocation: NodeId) -> &[NodeId] {
        let children = self.children(invocation);
        if children.is_empty() {
            children
        } else {
            &children[1..]
        }
    }

    /// Build the hypothetical tree a speculative resolution probe runs on.
    ///
    /// The result is a throwaway value: the invoked name token is replaced
    /// with `new_name`, `rewrite_root` is wrapped in an `await` node, and the
    /// invocation is tagged with `marker` so the caller can find it again in
    /// the copy. The receiver tree is left untouched and the rewritten tree
    /// gets a fresh [`TreeId`], so it is never mistaken for a compilation
    /// member.
    ///
    /// Returns `None` when the invocation has no name token to replace.
    pub fn speculate_await(
        &self,
        invocation: NodeId,
        rewrite_root: NodeId,
        new_name: &str,
        marker: Marker,
    ) -> Option<SyntaxTree> {
        let name_node = self.invoked_name_node(invocation)?;

        let mut nodes = self.nodes.clone();
        nodes[name_node.index()].text = Some(new_name.to_string());

        let await_id = NodeId(nodes.len() as u32);
        let old_parent = nodes[rewrite_root.index()].parent;
        nodes.push(NodeData {
            kind: NodeKind::Await,
            span: nodes[rewrite_root.index()].span,
            text: None,
            is_async: false,
            parent: old_parent,
            children: vec![rewrite_root],
        });
        nodes[rewrite_root.index()].parent = Some(await_id);

        let mut root = self.root;
        match old_parent {
            Some(parent) => {
                for slot in nodes[parent.index()].children.iter_mut() {
                    if *slot == rewrite_root {
                        *slot = await_id;
                    }
                }
            }
            None => root = await_id,
        }

        let mut annotations = HashMap::new();
        annotations.insert(marker, invocation);

        Some(SyntaxTree {
            id: TreeId::fresh(),
            file: self.file.clone(),
            source_kind: self.source_kind,
            generated: self.generated.clone(),
            nodes,
            root,
            annotations,
        })
    }
}

/// Preorder iterator over a subtree.
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        for child in self.tree.children(node).iter().rev() {
            self.stack.push(*child);
        }
        Some(node)
    }
}

/// Assembles a [`SyntaxTree`] bottom-up. Children are created before their
/// parents; parent links are fixed up in [`TreeBuilder::build`].
pub struct TreeBuilder {
    file: String,
    source_kind: SourceKind,
    generated: Option<GeneratedInfo>,
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            source_kind: SourceKind::Main,
            generated: None,
            nodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn source_kind(mut self, kind: SourceKind) -> Self {
        self.source_kind = kind;
        self
    }

    #[must_use]
    pub fn generated(mut self, info: GeneratedInfo) -> Self {
        self.generated = Some(info);
        self
    }

    pub fn node(&mut self, kind: NodeKind, span: Span, children: &[NodeId]) -> NodeId {
        self.push(NodeData {
            kind,
            span,
            text: None,
            is_async: false,
            parent: None,
            children: children.to_vec(),
        })
    }

    pub fn identifier(&mut self, text: impl Into<String>, span: Span) -> NodeId {
        self.push(NodeData {
            kind: NodeKind::Identifier,
            span,
            text: Some(text.into()),
            is_async: false,
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn function(
        &mut self,
        kind: NodeKind,
        is_async: bool,
        span: Span,
        children: &[NodeId],
    ) -> NodeId {
        debug_assert!(kind.is_function_like());
        self.push(NodeData {
            kind,
            span,
            text: None,
            is_async,
            parent: None,
            children: children.to_vec(),
        })
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    #[must_use]
    pub fn build(mut self, root: NodeId) -> SyntaxTree {
        // Fix up parent links from the recorded child lists.
        let links: Vec<(NodeId, Vec<NodeId>)> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n.children.clone()))
            .collect();
        for (parent, children) in links {
            for child in children {
                self.nodes[child.index()].parent = Some(parent);
            }
        }
        self.nodes[root.index()].parent = None;

        SyntaxTree {
            id: TreeId::fresh(),
            file: self.file,
            source_kind: self.source_kind,
            generated: self.generated,
            nodes: self.nodes,
            root,
            annotations: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::top()
    }

    /// `async method { block { invocation(member_access(q, Count)) } }`
    fn simple_call_tree(is_async: bool) -> (SyntaxTree, NodeId) {
        let mut b = TreeBuilder::new("main.cs");
        let recv = b.identifier("q", sp());
        let name = b.identifier("Count", sp());
        let access = b.node(NodeKind::MemberAccess, sp(), &[recv, name]);
        let call = b.node(NodeKind::Invocation, sp(), &[access]);
        let block = b.node(NodeKind::Block, sp(), &[call]);
        let method = b.function(NodeKind::Method, is_async, sp(), &[block]);
        let unit = b.node(NodeKind::CompilationUnit, sp(), &[method]);
        (b.build(unit), call)
    }

    #[test]
    fn parent_links_are_fixed_up() {
        let (tree, call) = simple_call_tree(true);
        let block = tree.parent(call).expect("call should have a parent");
        assert_eq!(tree.kind(block), NodeKind::Block);
        assert!(tree.parent(tree.root()).is_none());
    }

    #[test]
    fn rewrite_root_stops_at_non_wrapper() {
        let (tree, call) = simple_call_tree(true);
        // The invocation's parent is a block, so the invocation is its own
        // rewrite root.
        assert_eq!(tree.rewrite_root(call), call);
    }

    #[test]
    fn rewrite_root_climbs_wrappers() {
        let mut b = TreeBuilder::new("main.cs");
        let recv = b.identifier("q", sp());
        let name = b.identifier("Count", sp());
        let access = b.node(NodeKind::MemberAccess, sp(), &[recv, name]);
        let call = b.node(NodeKind::Invocation, sp(), &[access]);
        let paren = b.node(NodeKind::Parenthesized, sp(), &[call]);
        let bang = b.node(NodeKind::NullForgiving, sp(), &[paren]);
        let block = b.node(NodeKind::Block, sp(), &[bang]);
        let method = b.function(NodeKind::Method, true, sp(), &[block]);
        let unit = b.node(NodeKind::CompilationUnit, sp(), &[method]);
        let tree = b.build(unit);

        assert_eq!(tree.rewrite_root(call), bang);
    }

    #[test]
    fn already_awaited_detects_wrapping_await() {
        let mut b = TreeBuilder::new("main.cs");
        let recv = b.identifier("q", sp());
        let name = b.identifier("CountAsync", sp());
        let access = b.node(NodeKind::MemberAccess, sp(), &[recv, name]);
        let call = b.node(NodeKind::Invocation, sp(), &[access]);
        let awaited = b.node(NodeKind::Await, sp(), &[call]);
        let block = b.node(NodeKind::Block, sp(), &[awaited]);
        let method = b.function(NodeKind::Method, true, sp(), &[block]);
        let unit = b.node(NodeKind::CompilationUnit, sp(), &[method]);
        let tree = b.build(unit);

        assert!(tree.already_awaited(call));
    }

    #[test]
    fn scope_eligibility_tracks_nearest_function() {
        let mut b = TreeBuilder::new("main.cs");
        let recv = b.identifier("q", sp());
        let name = b.identifier("Count", sp());
        let access = b.node(NodeKind::MemberAccess, sp(), &[recv, name]);
        let call = b.node(NodeKind::Invocation, sp(), &[access]);
        let lambda = b.function(NodeKind::Lambda, false, sp(), &[call]);
        let block = b.node(NodeKind::Block, sp(), &[lambda]);
        let method = b.function(NodeKind::Method, true, sp(), &[block]);
        let unit = b.node(NodeKind::CompilationUnit, sp(), &[method]);
        let tree = b.build(unit);

        // Call sits in a non-async lambda nested inside an async method.
        assert!(!tree.scope_is_eligible(call));
        assert!(tree.scope_is_eligible(lambda));
    }

    #[test]
    fn top_level_code_is_implicitly_eligible() {
        let mut b = TreeBuilder::new("script.cs");
        let name = b.identifier("Run", sp());
        let call = b.node(NodeKind::Invocation, sp(), &[name]);
        let unit = b.node(NodeKind::CompilationUnit, sp(), &[call]);
        let tree = b.build(unit);

        assert!(tree.scope_is_eligible(call));
    }

    #[test]
    fn speculate_await_leaves_the_original_untouched() {
        let (tree, call) = simple_call_tree(true);
        let marker = Marker::fresh();
        let root = tree.rewrite_root(call);
        let spec = tree
            .speculate_await(call, root, "CountAsync", marker)
            .expect("call has a name token");

        // Original still reads "Count" and carries no annotations.
        let name = tree.invoked_name_node(call).unwrap();
        assert_eq!(tree.text(name), Some("Count"));
        assert!(tree.annotated(marker).is_none());

        // Copy reads "CountAsync", is awaited, and the marker relocates the
        // invocation.
        let marked = spec.annotated(marker).expect("marker should be present");
        let spec_name = spec.invoked_name_node(marked).unwrap();
        assert_eq!(spec.text(spec_name), Some("CountAsync"));
        assert!(spec.already_awaited(marked));
        assert_ne!(spec.id(), tree.id());
    }

    #[test]
    fn speculate_await_can_replace_the_root() {
        let mut b = TreeBuilder::new("script.cs");
        let name = b.identifier("Run", sp());
        let call = b.node(NodeKind::Invocation, sp(), &[name]);
        let tree = b.build(call);

        let marker = Marker::fresh();
        let spec = tree
            .speculate_await(call, call, "RunAsync", marker)
            .expect("call has a name token");
        assert_eq!(spec.kind(spec.root()), NodeKind::Await);
        assert!(spec.already_awaited(spec.annotated(marker).unwrap()));
    }

    #[test]
    fn conditional_access_receiver_is_found() {
        let mut b = TreeBuilder::new("main.cs");
        let recv = b.identifier("q", sp());
        let name = b.identifier("Count", sp());
        let call = b.node(NodeKind::Invocation, sp(), &[name]);
        let cond = b.node(NodeKind::ConditionalAccess, sp(), &[recv, call]);
        let block = b.node(NodeKind::Block, sp(), &[cond]);
        let method = b.function(NodeKind::Method, true, sp(), &[block]);
        let unit = b.node(NodeKind::CompilationUnit, sp(), &[method]);
        let tree = b.build(unit);

        assert_eq!(tree.invocation_receiver(call), Some(recv));
        assert_eq!(tree.rewrite_root(call), cond);
    }
}
