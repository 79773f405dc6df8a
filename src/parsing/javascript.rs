//! JavaScript extractor — thin wrapper over the shared ECMAScript walk
//! (spec §4.2; TypeScript reuses the same traversal, see [`super::ecma`]).

use std::path::Path;

use crate::error::IndexResult;
use crate::parsing::{ecma, Language, LanguageExtractor};
use crate::symbol::SymbolTable;
use crate::types::FileId;

pub struct JavaScriptExtractor;

impl LanguageExtractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extract_symbols(&self, file_id: FileId, source: &str, path: &Path) -> IndexResult<SymbolTable> {
        ecma::extract(file_id, source, path, Language::JavaScript, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_js_extensions_only() {
        let ext = JavaScriptExtractor;
        assert!(ext.can_handle(Path::new("app.jsx")));
        assert!(!ext.can_handle(Path::new("app.ts")));
    }
}
