//! TypeScript extractor — the ECMAScript walk plus interfaces, type
//! aliases, and enums (spec §4.2 kind mapping notes).

use std::path::Path;

use crate::error::IndexResult;
use crate::parsing::{ecma, Language, LanguageExtractor};
use crate::symbol::SymbolTable;
use crate::types::FileId;

pub struct TypeScriptExtractor;

impl LanguageExtractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn extract_symbols(&self, file_id: FileId, source: &str, path: &Path) -> IndexResult<SymbolTable> {
        ecma::extract(file_id, source, path, Language::TypeScript, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_ts_and_dts_extensions() {
        let ext = TypeScriptExtractor;
        assert!(ext.can_handle(Path::new("app.tsx")));
        assert!(ext.can_handle(Path::new("types.d.ts")));
        assert!(!ext.can_handle(Path::new("app.js")));
    }
}
