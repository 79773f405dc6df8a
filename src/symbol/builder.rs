//! Assembles a [`SymbolTable`] from a single extraction pass.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::parsing::Language;
use crate::types::{FileId, Location, LocalSymbolId, SymbolCounter, SymbolKind};

use super::{ExportInfo, ImportInfo, Scope, Symbol};

/// Per-file collection of symbols, imports, and exports (spec §3).
#[derive(Debug, Clone)]
pub struct SymbolTable {
    pub file_id: FileId,
    pub language: Language,
    pub symbols: BTreeMap<LocalSymbolId, Symbol>,
    pub symbols_by_name: HashMap<String, HashSet<LocalSymbolId>>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
}

impl SymbolTable {
    pub fn symbol(&self, id: LocalSymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    pub fn symbols_named(&self, name: &str) -> impl Iterator<Item = &Symbol> {
        self.symbols_by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.symbols.get(id))
    }

    pub fn exported_symbol_named(&self, name: &str) -> Option<&Symbol> {
        self.symbols_named(name).find(|s| s.is_exported)
    }
}

/// `AddImport`/`AddExport`/`AddSymbol`/`Build` — C1's builder half.
pub struct SymbolTableBuilder {
    file_id: FileId,
    language: Language,
    counter: SymbolCounter,
    symbols: BTreeMap<LocalSymbolId, Symbol>,
    symbols_by_name: HashMap<String, HashSet<LocalSymbolId>>,
    imports: Vec<ImportInfo>,
    exports: Vec<ExportInfo>,
}

impl SymbolTableBuilder {
    pub fn new(file_id: FileId, language: Language) -> Self {
        Self {
            file_id,
            language,
            counter: SymbolCounter::new(),
            symbols: BTreeMap::new(),
            symbols_by_name: HashMap::new(),
            imports: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn add_import(&mut self, info: ImportInfo) {
        self.imports.push(info);
    }

    pub fn add_export(&mut self, info: ExportInfo) {
        self.exports.push(info);
    }

    /// Allocates the next [`LocalSymbolId`], indexes `name`, and returns the
    /// id so the caller can enrich `type`/`value`/`signature` afterwards.
    pub fn add_symbol(
        &mut self,
        name: impl Into<String>,
        kind: SymbolKind,
        location: Location,
        scope: Scope,
        is_exported: bool,
    ) -> LocalSymbolId {
        let id = self.counter.next();
        let name = name.into();
        self.symbols_by_name.entry(name.clone()).or_default().insert(id);
        self.symbols
            .insert(id, Symbol::new(id, name, kind, location, scope, is_exported));
        id
    }

    pub fn symbol_mut(&mut self, id: LocalSymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(&id)
    }

    pub fn build(self) -> SymbolTable {
        SymbolTable {
            file_id: self.file_id,
            language: self.language,
            symbols: self.symbols,
            symbols_by_name: self.symbols_by_name,
            imports: self.imports,
            exports: self.exports,
        }
    }
}
