//! Symbol handles and the minimal symbol data the engine queries.
//!
//! Symbols are owned by the resolution oracle (the [`crate::semantic`]
//! module). The engine never constructs symbols itself; it only compares
//! identities and reads the few relations it needs: declaring type, base
//! type, parameter/return types and the extension-method reduction origin.

/// Opaque identity handle for a resolved program entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) enum SymbolDetail {
    Type {
        base: Option<SymbolId>,
        /// True for task-like types that a suspension point can consume.
        awaitable: bool,
        /// Result type produced by awaiting a value of this type.
        awaited_result: Option<SymbolId>,
    },
    Method {
        containing: SymbolId,
        params: Vec<SymbolId>,
        returns: Option<SymbolId>,
        /// Static extension form (receiver is the first parameter).
        extension: bool,
        /// For a reduced extension method, the static definition it was
        /// reduced from.
        reduced_from: Option<SymbolId>,
    },
}

/// A resolved program entity: a type or a method.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    pub(crate) detail: SymbolDetail,
}

impl Symbol {
    pub(crate) fn new_type(name: impl Into<String>, base: Option<SymbolId>) -> Self {
        Self {
            name: name.into(),
            detail: SymbolDetail::Type {
                base,
                awaitable: false,
                awaited_result: None,
            },
        }
    }

    pub(crate) fn new_awaitable_type(
        name: impl Into<String>,
        awaited_result: Option<SymbolId>,
    ) -> Self {
        Self {
            name: name.into(),
            detail: SymbolDetail::Type {
                base: None,
                awaitable: true,
                awaited_result,
            },
        }
    }

    pub(crate) fn new_method(
        name: impl Into<String>,
        containing: SymbolId,
        params: Vec<SymbolId>,
        returns: Option<SymbolId>,
        extension: bool,
        reduced_from: Option<SymbolId>,
    ) -> Self {
        Self {
            name: name.into(),
            detail: SymbolDetail::Method {
                containing,
                params,
                returns,
                extension,
                reduced_from,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_method(&self) -> bool {
        matches!(self.detail, SymbolDetail::Method { .. })
    }

    /// Declaring type for methods; `None` for types.
    ///
    /// A reduced extension method reports the receiver type it was reduced
    /// onto, mirroring how the host oracle presents instance-style extension
    /// calls.
    pub fn containing_type(&self) -> Option<SymbolId> {
        match self.detail {
            SymbolDetail::Method { containing, .. } => Some(containing),
            SymbolDetail::Type { .. } => None,
        }
    }

    pub fn base_type(&self) -> Option<SymbolId> {
        match self.detail {
            SymbolDetail::Type { base, .. } => base,
            SymbolDetail::Method { .. } => None,
        }
    }

    pub fn params(&self) -> &[SymbolId] {
        match &self.detail {
            SymbolDetail::Method { params, .. } => params,
            SymbolDetail::Type { .. } => &[],
        }
    }

    pub fn return_type(&self) -> Option<SymbolId> {
        match self.detail {
            SymbolDetail::Method { returns, .. } => returns,
            SymbolDetail::Type { .. } => None,
        }
    }

    pub fn is_extension(&self) -> bool {
        matches!(
            self.detail,
            SymbolDetail::Method {
                extension: true,
                ..
            }
        )
    }

    /// The unbound origin of a reduced extension method, if any.
    pub fn reduced_from(&self) -> Option<SymbolId> {
        match self.detail {
            SymbolDetail::Method { reduced_from, .. } => reduced_from,
            SymbolDetail::Type { .. } => None,
        }
    }

    pub(crate) fn is_awaitable_type(&self) -> bool {
        matches!(
            self.detail,
            SymbolDetail::Type {
                awaitable: true,
                ..
            }
        )
    }

    pub(crate) fn awaited_result(&self) -> Option<SymbolId> {
        match self.detail {
            SymbolDetail::Type { awaited_result, .. } => awaited_result,
            SymbolDetail::Method { .. } => None,
        }
    }
}
