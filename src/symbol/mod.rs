//! Per-file symbol tables: the Symbol record, import/export info, the scope
//! manager, and the builder that assembles them (C1).

mod builder;
mod scope;

pub use builder::{SymbolTable, SymbolTableBuilder};
pub use scope::{Scope, ScopeManager};

use crate::types::{Location, LocalSymbolId, SymbolKind};

/// One extracted declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub id: LocalSymbolId,
    pub name: String,
    /// `.`-separated for members (`Class.method`); namespace prefixes use
    /// the source language's own separator where unavoidable (PHP `\`).
    pub fully_qualified_name: Option<String>,
    pub kind: SymbolKind,
    pub location: Location,
    pub scope: Scope,
    pub is_exported: bool,
    pub r#type: Option<String>,
    pub value: Option<String>,
    pub signature: Option<String>,
    pub flags: Vec<SymbolFlag>,
}

impl Symbol {
    pub fn new(
        id: LocalSymbolId,
        name: impl Into<String>,
        kind: SymbolKind,
        location: Location,
        scope: Scope,
        is_exported: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            fully_qualified_name: None,
            kind,
            location,
            scope,
            is_exported,
            r#type: None,
            value: None,
            signature: None,
            flags: Vec::new(),
        }
    }

    pub fn with_flag(mut self, flag: SymbolFlag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_fqn(mut self, fqn: impl Into<String>) -> Self {
        self.fully_qualified_name = Some(fqn.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.r#type = Some(ty.into());
        self
    }
}

/// One import statement/spec, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    pub location: Location,
    pub import_path: String,
    pub alias: Option<String>,
    pub imported_names: Vec<String>,
    pub is_namespace: bool,
    pub is_default: bool,
    pub source_path: Option<String>,
}

impl ImportInfo {
    pub fn new(location: Location, import_path: impl Into<String>) -> Self {
        Self {
            location,
            import_path: import_path.into(),
            alias: None,
            imported_names: Vec::new(),
            is_namespace: false,
            is_default: false,
            source_path: None,
        }
    }
}

/// One export, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInfo {
    pub local_name: String,
    pub exported_name: String,
    pub is_default: bool,
    pub is_re_export: bool,
    pub source_path: Option<String>,
}

impl ExportInfo {
    pub fn new(local_name: impl Into<String>, exported_name: impl Into<String>) -> Self {
        let exported_name = exported_name.into();
        Self {
            local_name: local_name.into(),
            exported_name,
            is_default: false,
            is_re_export: false,
            source_path: None,
        }
    }
}

/// Metadata recorded alongside some symbols that doesn't fit the shared
/// record (e.g. Python dunder names).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolFlag {
    Dunder,
}
