//! The extractor interface every language conforms to (spec §4.2, §6).

use std::path::Path;

use crate::error::IndexResult;
use crate::parsing::Language;
use crate::symbol::SymbolTable;
use crate::types::FileId;

/// `{GetLanguage, CanHandle, ExtractSymbols}` from spec §4.2/§6.
///
/// Implementations never retain `source` past the call (spec §9 "memory
/// discipline"); only the derived [`SymbolTable`] survives.
pub trait LanguageExtractor: Send + Sync {
    fn language(&self) -> Language;

    /// Extension match, case-sensitive.
    fn can_handle(&self, path: &Path) -> bool {
        Language::from_path(path) == Some(self.language())
    }

    /// Parses `source` and extracts its symbol table. Returns
    /// `Err(IndexError::ParseFailure)` if tree-sitter cannot produce a tree.
    fn extract_symbols(&self, file_id: FileId, source: &str, path: &Path) -> IndexResult<SymbolTable>;
}
