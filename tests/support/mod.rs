#![allow(dead_code)]

use await_clippy::location::Span;
use await_clippy::semantic::Compilation;
use await_clippy::syntax::{NodeKind, SourceKind, SyntaxTree, TreeBuilder};

/// Compilation modeling the queryable scenario: `Enumerable.Count` as the
/// synchronous extension, `EfExtensions.CountAsync` as the awaitable one,
/// both importable, with a local `q` of type `IQueryable`.
pub fn queryable_compilation() -> Compilation {
    let mut b = Compilation::builder();
    let int = b.add_type("int", None);
    let queryable = b.add_type("IQueryable", None);
    let task_int = b.add_awaitable_type("Task_int", Some(int));

    let enumerable = b.add_type("Enumerable", None);
    b.add_method(enumerable, "Range", &[int, int], Some(queryable));
    b.add_extension_method(enumerable, "Count", &[queryable], Some(int));
    let ef = b.add_type("EfExtensions", None);
    b.add_extension_method(ef, "CountAsync", &[queryable], Some(task_int));

    b.import_extensions(enumerable);
    b.import_extensions(ef);
    b.declare_local("q", queryable);
    b.well_known_pair("IQueryable", "EfExtensions");
    b.build()
}

/// Compilation where the receiver type declares both `Foo` and a synchronous
/// instance `FooAsync` that shadows the awaitable extension of the same name.
pub fn shadowed_compilation() -> Compilation {
    let mut b = Compilation::builder();
    let int = b.add_type("int", None);
    let task_int = b.add_awaitable_type("Task_int", Some(int));
    let widget = b.add_type("Widget", None);
    b.add_method(widget, "Foo", &[], Some(int));
    b.add_method(widget, "FooAsync", &[], Some(int));

    let helpers = b.add_type("Helpers", None);
    b.add_extension_method(helpers, "FooAsync", &[widget], Some(task_int));
    b.import_extensions(helpers);
    b.declare_local("q", widget);
    b.well_known_pair("Widget", "Helpers");
    b.build()
}

fn name_span() -> Span {
    Span::new(3, 11, 3, 16)
}

/// `q.<name>()` inside a method; `is_async` controls the method modifier.
pub fn call_in_method(name: &str, is_async: bool) -> SyntaxTree {
    let mut b = TreeBuilder::new("main.cs");
    let recv = b.identifier("q", Span::new(3, 9, 3, 10));
    let name = b.identifier(name, name_span());
    let access = b.node(NodeKind::MemberAccess, Span::new(3, 9, 3, 16), &[recv, name]);
    let call = b.node(NodeKind::Invocation, Span::new(3, 9, 3, 18), &[access]);
    let block = b.node(NodeKind::Block, Span::new(2, 1, 4, 1), &[call]);
    let method = b.function(NodeKind::Method, is_async, Span::new(1, 1, 4, 1), &[block]);
    let unit = b.node(NodeKind::CompilationUnit, Span::new(1, 1, 4, 1), &[method]);
    b.build(unit)
}

pub fn call_in_async_method(name: &str) -> SyntaxTree {
    call_in_method(name, true)
}

/// `await q.<name>()` inside an async method.
pub fn awaited_call_in_async_method(name: &str) -> SyntaxTree {
    let mut b = TreeBuilder::new("main.cs");
    let recv = b.identifier("q", Span::new(3, 15, 3, 16));
    let name = b.identifier(name, Span::new(3, 17, 3, 22));
    let access = b.node(NodeKind::MemberAccess, Span::new(3, 15, 3, 22), &[recv, name]);
    let call = b.node(NodeKind::Invocation, Span::new(3, 15, 3, 24), &[access]);
    let awaited = b.node(NodeKind::Await, Span::new(3, 9, 3, 24), &[call]);
    let block = b.node(NodeKind::Block, Span::new(2, 1, 4, 1), &[awaited]);
    let method = b.function(NodeKind::Method, true, Span::new(1, 1, 4, 1), &[block]);
    let unit = b.node(NodeKind::CompilationUnit, Span::new(1, 1, 4, 1), &[method]);
    b.build(unit)
}

/// `q.<name>()` inside a non-async lambda nested in an async method.
pub fn call_in_nested_lambda(name: &str) -> SyntaxTree {
    let mut b = TreeBuilder::new("main.cs");
    let recv = b.identifier("q", Span::new(3, 20, 3, 21));
    let name = b.identifier(name, Span::new(3, 22, 3, 27));
    let access = b.node(NodeKind::MemberAccess, Span::new(3, 20, 3, 27), &[recv, name]);
    let call = b.node(NodeKind::Invocation, Span::new(3, 20, 3, 29), &[access]);
    let lambda = b.function(NodeKind::Lambda, false, Span::new(3, 14, 3, 29), &[call]);
    let block = b.node(NodeKind::Block, Span::new(2, 1, 4, 1), &[lambda]);
    let method = b.function(NodeKind::Method, true, Span::new(1, 1, 4, 1), &[block]);
    let unit = b.node(NodeKind::CompilationUnit, Span::new(1, 1, 4, 1), &[method]);
    b.build(unit)
}

/// `q.<name>()` inside an async lambda nested in a non-async method.
pub fn call_in_async_lambda_in_sync_method(name: &str) -> SyntaxTree {
    let mut b = TreeBuilder::new("main.cs");
    let recv = b.identifier("q", Span::new(3, 26, 3, 27));
    let name = b.identifier(name, Span::new(3, 28, 3, 33));
    let access = b.node(NodeKind::MemberAccess, Span::new(3, 26, 3, 33), &[recv, name]);
    let call = b.node(NodeKind::Invocation, Span::new(3, 26, 3, 35), &[access]);
    let lambda = b.function(NodeKind::Lambda, true, Span::new(3, 14, 3, 35), &[call]);
    let block = b.node(NodeKind::Block, Span::new(2, 1, 4, 1), &[lambda]);
    let method = b.function(NodeKind::Method, false, Span::new(1, 1, 4, 1), &[block]);
    let unit = b.node(NodeKind::CompilationUnit, Span::new(1, 1, 4, 1), &[method]);
    b.build(unit)
}

/// `Enumerable.Range(0, 1).Count()` inside an async method. The outer call's
/// receiver is itself an invocation through a static type reference.
pub fn chained_static_receiver_tree() -> SyntaxTree {
    let mut b = TreeBuilder::new("main.cs");
    let ty = b.identifier("Enumerable", Span::new(3, 9, 3, 19));
    let range_name = b.identifier("Range", Span::new(3, 20, 3, 25));
    let range_access = b.node(NodeKind::MemberAccess, Span::new(3, 9, 3, 25), &[ty, range_name]);
    let zero = b.identifier("0", Span::new(3, 26, 3, 27));
    let one = b.identifier("1", Span::new(3, 29, 3, 30));
    let range_call = b.node(
        NodeKind::Invocation,
        Span::new(3, 9, 3, 31),
        &[range_access, zero, one],
    );
    let count_name = b.identifier("Count", Span::new(3, 32, 3, 37));
    let count_access = b.node(
        NodeKind::MemberAccess,
        Span::new(3, 9, 3, 37),
        &[range_call, count_name],
    );
    let count_call = b.node(NodeKind::Invocation, Span::new(3, 9, 3, 39), &[count_access]);
    let block = b.node(NodeKind::Block, Span::new(2, 1, 4, 1), &[count_call]);
    let method = b.function(NodeKind::Method, true, Span::new(1, 1, 4, 1), &[block]);
    let unit = b.node(NodeKind::CompilationUnit, Span::new(1, 1, 4, 1), &[method]);
    b.build(unit)
}

/// A tree whose source kind is `Test`.
pub fn call_in_async_method_in_tests(name: &str) -> SyntaxTree {
    let mut b = TreeBuilder::new("main_tests.cs");
    let recv = b.identifier("q", Span::new(3, 9, 3, 10));
    let name = b.identifier(name, name_span());
    let access = b.node(NodeKind::MemberAccess, Span::new(3, 9, 3, 16), &[recv, name]);
    let call = b.node(NodeKind::Invocation, Span::new(3, 9, 3, 18), &[access]);
    let block = b.node(NodeKind::Block, Span::new(2, 1, 4, 1), &[call]);
    let method = b.function(NodeKind::Method, true, Span::new(1, 1, 4, 1), &[block]);
    let unit = b.node(NodeKind::CompilationUnit, Span::new(1, 1, 4, 1), &[method]);
    b.source_kind(SourceKind::Test).build(unit)
}
