//! The linker engine (C5): indexes files, resolves their imports, and
//! binds imported names to the symbols that define them.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{IndexError, IndexResult};
use crate::parsing::{ExtractorRegistry, Language};
use crate::registry::FileRegistry;
use crate::resolution::{FileService, ResolutionKind, ResolutionRequest, ResolverRegistry};
use crate::symbol::SymbolTable;
use crate::types::{CompositeSymbolId, FileId, LocalSymbolId};

/// One use of a symbol from another file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolReference {
    pub from_file: FileId,
    pub imported_name: String,
}

/// `{symbol, definitionFile, references, importedBy, exportedBy,
/// isExternal, resolution}` (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolLink {
    pub symbol: CompositeSymbolId,
    pub definition_file: FileId,
    pub references: Vec<SymbolReference>,
    pub imported_by: HashSet<FileId>,
    pub exported_by: Option<FileId>,
    pub is_external: bool,
}

impl SymbolLink {
    fn new(symbol: CompositeSymbolId) -> Self {
        Self {
            symbol,
            definition_file: symbol.file,
            references: Vec::new(),
            imported_by: HashSet::new(),
            exported_by: None,
            is_external: false,
        }
    }
}

/// `{fromFile, importPath, resolvedFile, importedNames, resolution,
/// isExternal}` (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLink {
    pub from_file: FileId,
    pub import_path: String,
    pub resolved_file: Option<FileId>,
    pub imported_names: Vec<String>,
    pub resolution: ResolutionKindRecord,
    pub is_external: bool,
}

/// Serializable mirror of [`ResolutionKind`] (which itself carries no
/// serde impl since it's an internal resolver contract, not wire data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionKindRecord {
    Internal,
    File,
    Directory,
    Package,
    Builtin,
    External,
    NotFound,
    Error,
}

impl From<ResolutionKind> for ResolutionKindRecord {
    fn from(kind: ResolutionKind) -> Self {
        match kind {
            ResolutionKind::Internal => Self::Internal,
            ResolutionKind::File => Self::File,
            ResolutionKind::Directory => Self::Directory,
            ResolutionKind::Package => Self::Package,
            ResolutionKind::Builtin => Self::Builtin,
            ResolutionKind::External => Self::External,
            ResolutionKind::NotFound => Self::NotFound,
            ResolutionKind::Error => Self::Error,
        }
    }
}

/// Engine-wide counters (spec §6 statistics surface).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    pub files: usize,
    pub symbols: usize,
    pub import_links: usize,
    pub extractors: usize,
}

/// C5: owns the file registry, per-file symbol tables, and the derived
/// link graph. All mutating operations lock exclusively; queries lock
/// shared, per spec §5.
pub struct LinkerEngine {
    config: EngineConfig,
    extractors: ExtractorRegistry,
    resolvers: ResolverRegistry,
    file_service: Box<dyn FileService>,
    state: RwLock<EngineState>,
}

#[derive(Default)]
struct EngineState {
    registry: FileRegistry,
    tables: HashMap<FileId, SymbolTable>,
    paths: HashMap<FileId, PathBuf>,
    import_links: HashMap<FileId, Vec<ImportLink>>,
    symbol_links: HashMap<CompositeSymbolId, SymbolLink>,
}

impl LinkerEngine {
    pub fn new(project_root: PathBuf, file_service: Box<dyn FileService>, config: EngineConfig) -> Self {
        let resolvers = ResolverRegistry::with_defaults(project_root, file_service.as_ref());
        Self {
            config,
            extractors: ExtractorRegistry::with_defaults(),
            resolvers,
            file_service,
            state: RwLock::new(EngineState::default()),
        }
    }

    /// Parses `bytes` with the extractor matching `path`'s extension and
    /// stores the resulting [`SymbolTable`], replacing any prior table for
    /// that file.
    pub fn index_file(&self, path: &Path, bytes: &str) -> IndexResult<FileId> {
        let extractor = self.extractors.for_path(path).ok_or_else(|| IndexError::NoExtractor {
            path: path.to_path_buf(),
            extension: path.extension().map(|e| e.to_string_lossy().into_owned()),
        })?;

        let mut state = self.state.write();
        let file_id = state.registry.get_or_create(path);
        drop(state);

        let table = extractor.extract_symbols(file_id, bytes, path)?;
        debug!(
            path = %path.display(),
            language = %extractor.language(),
            symbols = table.symbols.len(),
            imports = table.imports.len(),
            exports = table.exports.len(),
            "indexed file"
        );

        let mut state = self.state.write();
        state.paths.insert(file_id, path.to_path_buf());
        state.tables.insert(file_id, table);
        Ok(file_id)
    }

    /// Resolves every file's imports and rebuilds the link graph from
    /// scratch (spec §4.5, invariant I4).
    pub fn link_symbols(&self) {
        let mut state = self.state.write();
        state.import_links.clear();
        state.symbol_links.clear();

        let file_ids: Vec<FileId> = state.tables.keys().copied().collect();
        for file_id in file_ids {
            self.link_one_file(&mut state, file_id);
        }
    }

    fn link_one_file(&self, state: &mut EngineState, file_id: FileId) {
        let Some(path) = state.paths.get(&file_id).cloned() else { return };
        let Some(table) = state.tables.get(&file_id).cloned() else { return };
        let language = table.language;

        let Some(resolver) = self.resolvers.for_language(language) else {
            warn!(%file_id, %language, "no resolver registered for language");
            return;
        };

        let mut links = Vec::with_capacity(table.imports.len());
        for import in &table.imports {
            let request = ResolutionRequest { import, from_file: file_id, from_path: &path };
            let resolution = resolver.resolve(&request, self.file_service.as_ref(), &mut state.registry);

            if resolution.kind == ResolutionKind::Error {
                warn!(%file_id, import_path = %import.import_path, message = ?resolution.message, "import resolution failed");
            }

            let link = ImportLink {
                from_file: file_id,
                import_path: import.import_path.clone(),
                resolved_file: resolution.file_id,
                imported_names: import.imported_names.clone(),
                resolution: resolution.kind.into(),
                is_external: resolution.is_external,
            };

            if let Some(target_file) = resolution.file_id {
                let target_table = state.tables.get(&target_file).cloned();
                if let Some(target_table) = target_table {
                    self.bind_import(&mut state.symbol_links, import, target_file, target_table, file_id);
                }
            }

            links.push(link);
        }

        for export in &table.exports {
            if let Some(symbol) = table.exported_symbol_named(&export.local_name) {
                let composite = CompositeSymbolId::new(file_id, symbol.id);
                state
                    .symbol_links
                    .entry(composite)
                    .or_insert_with(|| SymbolLink::new(composite))
                    .exported_by = Some(file_id);
            }
        }

        state.import_links.insert(file_id, links);
    }

    /// Appends a [`SymbolReference`] to every symbol in `target_table` bound
    /// by `import`: namespace imports bind every export, default imports
    /// bind the target's default export, named imports bind each requested
    /// name exactly (spec §4.5 cross-language binding policy).
    fn bind_import(
        &self,
        symbol_links: &mut HashMap<CompositeSymbolId, SymbolLink>,
        import: &crate::symbol::ImportInfo,
        target_file: FileId,
        target_table: SymbolTable,
        from_file: FileId,
    ) {
        let mut bind_name = |name: &str| {
            if let Some(symbol) = target_table.symbols_named(name).find(|s| s.is_exported) {
                let composite = CompositeSymbolId::new(target_file, symbol.id);
                let link = symbol_links.entry(composite).or_insert_with(|| SymbolLink::new(composite));
                link.imported_by.insert(from_file);
                link.references.push(SymbolReference { from_file, imported_name: name.to_string() });
            }
        };

        if import.is_namespace {
            for export in &target_table.exports {
                bind_name(&export.exported_name);
            }
            return;
        }

        if import.is_default {
            if let Some(default_export) = target_table.exports.iter().find(|e| e.is_default) {
                bind_name(&default_export.exported_name);
            }
            return;
        }

        for name in &import.imported_names {
            bind_name(name);
        }
    }

    pub fn get_symbol_definition(&self, id: CompositeSymbolId) -> IndexResult<crate::symbol::Symbol> {
        let state = self.state.read();
        state
            .tables
            .get(&id.file)
            .and_then(|table| table.symbol(id.local))
            .cloned()
            .ok_or(IndexError::SymbolNotFound { id })
    }

    pub fn get_symbol_references(&self, id: CompositeSymbolId) -> IndexResult<Vec<SymbolReference>> {
        let state = self.state.read();
        state
            .tables
            .get(&id.file)
            .and_then(|table| table.symbol(id.local))
            .ok_or(IndexError::SymbolNotFound { id })?;
        Ok(state.symbol_links.get(&id).map(|link| link.references.clone()).unwrap_or_default())
    }

    /// The full materialized [`SymbolLink`], including `exportedBy` and
    /// `importedBy` (spec §3's SymbolLink record).
    pub fn get_symbol_link(&self, id: CompositeSymbolId) -> IndexResult<SymbolLink> {
        let state = self.state.read();
        state.symbol_links.get(&id).cloned().ok_or(IndexError::SymbolNotFound { id })
    }

    pub fn get_file_imports(&self, file_id: FileId) -> IndexResult<Vec<ImportLink>> {
        let state = self.state.read();
        state
            .import_links
            .get(&file_id)
            .cloned()
            .ok_or(IndexError::FileNotFound { id: file_id })
    }

    pub fn get_symbols_in_file(&self, file_id: FileId) -> IndexResult<Vec<crate::symbol::Symbol>> {
        let state = self.state.read();
        state
            .tables
            .get(&file_id)
            .map(|table| table.symbols.values().cloned().collect())
            .ok_or(IndexError::FileNotFound { id: file_id })
    }

    pub fn stats(&self) -> Stats {
        let state = self.state.read();
        Stats {
            files: state.tables.len(),
            symbols: state.tables.values().map(|t| t.symbols.len()).sum(),
            import_links: state.import_links.values().map(Vec::len).sum(),
            extractors: self.extractors.languages().count(),
        }
    }

    pub fn file_id_for(&self, path: &Path) -> Option<FileId> {
        self.state.read().registry.get(path)
    }

    pub fn path_of(&self, file_id: FileId) -> Option<PathBuf> {
        self.state.read().paths.get(&file_id).cloned()
    }

    pub fn table_for(&self, file_id: FileId) -> Option<SymbolTable> {
        self.state.read().tables.get(&file_id).cloned()
    }

    pub fn remove_table(&self, file_id: FileId) -> Option<SymbolTable> {
        let mut state = self.state.write();
        state.paths.remove(&file_id);
        state.import_links.remove(&file_id);
        state.tables.remove(&file_id)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn with_state_write<R>(&self, f: impl FnOnce(&mut EngineStateView) -> R) -> R {
        let mut state = self.state.write();
        f(&mut EngineStateView(&mut state))
    }
}

/// Narrow accessor so [`crate::incremental`] can read/mutate engine state
/// without exposing `EngineState`'s fields as a public type.
pub struct EngineStateView<'a>(&'a mut EngineState);

impl EngineStateView<'_> {
    pub fn dependencies_of(&self, file_id: FileId) -> HashSet<FileId> {
        self.0
            .import_links
            .get(&file_id)
            .into_iter()
            .flatten()
            .filter_map(|link| link.resolved_file)
            .collect()
    }

    pub fn dependents_of(&self, file_id: FileId) -> HashSet<FileId> {
        self.0
            .import_links
            .iter()
            .filter(|(_, links)| links.iter().any(|l| l.resolved_file == Some(file_id)))
            .map(|(from, _)| *from)
            .collect()
    }

    pub fn symbol_names(&self, file_id: FileId) -> HashSet<String> {
        self.0
            .tables
            .get(&file_id)
            .map(|t| t.symbols.values().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn has_table(&self, file_id: FileId) -> bool {
        self.0.tables.contains_key(&file_id)
    }

    pub fn path_of(&self, file_id: FileId) -> Option<PathBuf> {
        self.0.paths.get(&file_id).cloned()
    }

    pub fn file_id_for(&mut self, path: &Path) -> FileId {
        self.0.registry.get_or_create(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::MemoryFileService;
    use std::path::PathBuf;

    fn engine() -> LinkerEngine {
        let files = MemoryFileService::new([]);
        LinkerEngine::new(PathBuf::from("/proj"), Box::new(files), EngineConfig::default())
    }

    #[test]
    fn go_main_and_utils_link() {
        let engine = engine();
        let main_src = "package main\nimport (\n\t\"fmt\"\n\t\"./utils\"\n)\nfunc main() {}\n";
        let utils_src = "package utils\nfunc Add(a, b int) int { return a + b }\nfunc Multiply(a, b int) int { return a * b }\nvar GlobalVar = 1\n";

        engine.index_file(Path::new("/proj/main.go"), main_src).unwrap();
        engine.index_file(Path::new("/proj/utils/utils.go"), utils_src).unwrap();
        engine.link_symbols();

        let stats = engine.stats();
        assert_eq!(stats.files, 2);
        assert!(stats.symbols >= 4);
        assert_eq!(stats.import_links, 2);
    }

    #[test]
    fn unknown_symbol_definition_is_not_found() {
        let engine = engine();
        let id = CompositeSymbolId::new(FileId::new(999).unwrap(), LocalSymbolId::new(1).unwrap());
        assert!(engine.get_symbol_definition(id).is_err());
    }

    #[test]
    fn missing_extension_yields_no_extractor_error() {
        let engine = engine();
        let result = engine.index_file(Path::new("README.md"), "# hi");
        assert!(matches!(result, Err(IndexError::NoExtractor { .. })));
    }
}
