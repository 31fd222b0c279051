//! JSON fixtures describing a compilation and its syntax trees.
//!
//! A fixture stands in for the host runtime: it declares the symbol tables a
//! real compiler would provide and the tree shapes the engine walks. The CLI
//! and the integration tests both load compilations from this format.
//!
//! Declaration order matters: a type's base and a method's signature types
//! must be declared before they are referenced.

use crate::error::{Error, Result};
use crate::location::Span;
use crate::semantic::Compilation;
use crate::symbols::SymbolId;
use crate::syntax::{
    GeneratedInfo, MappedRegion, NodeId, NodeKind, SourceKind, SyntaxTree, TreeBuilder,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub types: Vec<TypeSpec>,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
    #[serde(default)]
    pub extension_imports: Vec<String>,
    #[serde(default)]
    pub locals: HashMap<String, String>,
    /// Explicit (base, container) pairs. Absent means the crate defaults.
    #[serde(default)]
    pub well_known: Option<Vec<(String, String)>>,
    #[serde(default)]
    pub trees: Vec<TreeSpec>,
}

#[derive(Debug, Deserialize)]
pub struct TypeSpec {
    pub name: String,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub awaitable: bool,
    /// Result type an `await` yields, for awaitable types.
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    pub containing: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub returns: Option<String>,
    /// Static extension method; `params[0]` is the receiver.
    #[serde(default)]
    pub extension: bool,
}

#[derive(Debug, Deserialize)]
pub struct TreeSpec {
    pub file: String,
    #[serde(default)]
    pub kind: SourceKindSpec,
    #[serde(default)]
    pub generated: Option<GeneratedSpec>,
    pub root: NodeSpec,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKindSpec {
    #[default]
    Main,
    Test,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedSpec {
    #[serde(default)]
    pub regions: Vec<RegionSpec>,
}

#[derive(Debug, Deserialize)]
pub struct RegionSpec {
    pub generated_start_line: usize,
    pub generated_end_line: usize,
    pub original_file: String,
    pub original_start_line: usize,
}

#[derive(Debug, Deserialize)]
pub struct NodeSpec {
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "async")]
    pub is_async: bool,
    /// `[start_line, start_column, end_line, end_column]`, 1-based.
    #[serde(default)]
    pub span: Option<[usize; 4]>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// A fixture materialized into engine inputs. Trees are already registered
/// as compilation members.
#[derive(Debug)]
pub struct LoadedFixture {
    pub compilation: Compilation,
    pub trees: Vec<SyntaxTree>,
}

pub fn load_fixture_file(path: &Path) -> Result<LoadedFixture> {
    let raw = std::fs::read_to_string(path)?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .map_err(|e| Error::fixture(format!("{}: {e}", path.display())))?;
    build_fixture(&fixture)
}

pub fn build_fixture(fixture: &Fixture) -> Result<LoadedFixture> {
    let mut builder = Compilation::builder();
    let mut types: HashMap<&str, SymbolId> = HashMap::new();

    let lookup = |types: &HashMap<&str, SymbolId>, name: &str| -> Result<SymbolId> {
        types
            .get(name)
            .copied()
            .ok_or_else(|| Error::fixture(format!("unknown type '{name}'")))
    };

    for ty in &fixture.types {
        let base = ty
            .base
            .as_deref()
            .map(|b| lookup(&types, b))
            .transpose()?;
        let result = ty
            .result
            .as_deref()
            .map(|r| lookup(&types, r))
            .transpose()?;
        let id = if ty.awaitable {
            builder.add_awaitable_type(&ty.name, result)
        } else {
            if ty.result.is_some() {
                return Err(Error::fixture(format!(
                    "type '{}' declares a result but is not awaitable",
                    ty.name
                )));
            }
            builder.add_type(&ty.name, base)
        };
        types.insert(ty.name.as_str(), id);
    }

    for m in &fixture.methods {
        let containing = lookup(&types, &m.containing)?;
        let params = m
            .params
            .iter()
            .map(|p| lookup(&types, p))
            .collect::<Result<Vec<_>>>()?;
        let returns = m
            .returns
            .as_deref()
            .map(|r| lookup(&types, r))
            .transpose()?;
        if m.extension {
            if params.is_empty() {
                return Err(Error::fixture(format!(
                    "extension method '{}' needs a receiver parameter",
                    m.name
                )));
            }
            builder.add_extension_method(containing, &m.name, &params, returns);
        } else {
            builder.add_method(containing, &m.name, &params, returns);
        }
    }

    for container in &fixture.extension_imports {
        let id = lookup(&types, container)?;
        builder.import_extensions(id);
    }

    for (name, ty) in &fixture.locals {
        let id = lookup(&types, ty)?;
        builder.declare_local(name, id);
    }

    match &fixture.well_known {
        Some(pairs) => {
            for (base, container) in pairs {
                builder.well_known_pair(base, container);
            }
        }
        None => builder.default_well_known(),
    }

    let mut compilation = builder.build();
    let mut trees = Vec::with_capacity(fixture.trees.len());
    for spec in &fixture.trees {
        let tree = build_tree(spec)?;
        compilation.add_tree(&tree);
        trees.push(tree);
    }

    Ok(LoadedFixture { compilation, trees })
}

fn build_tree(spec: &TreeSpec) -> Result<SyntaxTree> {
    let mut builder = TreeBuilder::new(&spec.file).source_kind(match spec.kind {
        SourceKindSpec::Main => SourceKind::Main,
        SourceKindSpec::Test => SourceKind::Test,
    });
    if let Some(generated) = &spec.generated {
        builder = builder.generated(GeneratedInfo {
            regions: generated
                .regions
                .iter()
                .map(|r| MappedRegion {
                    generated_start_line: r.generated_start_line,
                    generated_end_line: r.generated_end_line,
                    original_file: r.original_file.clone(),
                    original_start_line: r.original_start_line,
                })
                .collect(),
        });
    }
    let root = build_node(&mut builder, &spec.root)?;
    Ok(builder.build(root))
}

fn build_node(builder: &mut TreeBuilder, spec: &NodeSpec) -> Result<NodeId> {
    let kind = NodeKind::parse(&spec.kind)
        .ok_or_else(|| Error::fixture(format!("unknown node kind '{}'", spec.kind)))?;
    let span = spec
        .span
        .map_or_else(Span::top, |[l1, c1, l2, c2]| Span::new(l1, c1, l2, c2));

    let children = spec
        .children
        .iter()
        .map(|c| build_node(builder, c))
        .collect::<Result<Vec<_>>>()?;

    let id = match kind {
        NodeKind::Identifier => {
            let Some(text) = &spec.text else {
                return Err(Error::fixture("identifier node without text".to_string()));
            };
            builder.identifier(text, span)
        }
        _ if kind.is_function_like() => builder.function(kind, spec.is_async, span, &children),
        _ => builder.node(kind, span, &children),
    };
    Ok(id)
}
