//! Scenario 2 (spec §8): ESM default + named imports, and invariant I5
//! (a symbol present in a file's `exports` gets `exportedBy` set).

use std::fs;
use tempfile::TempDir;

use codelink::config::EngineConfig;
use codelink::linker::LinkerEngine;
use codelink::resolution::StdFileService;
use codelink::types::{CompositeSymbolId, SymbolKind};

#[test]
fn named_and_default_imports_link_across_files() {
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join("utils.js"),
        "export function formatDate(d) { return d; }\nexport function parseJSON(s) { return JSON.parse(s); }\nexport const API_URL = 'https://example.test';\n",
    )
    .unwrap();
    fs::write(project.path().join("config.js"), "export default { env: 'prod' };\n").unwrap();
    fs::write(
        project.path().join("index.js"),
        "import { formatDate, parseJSON } from './utils.js';\nimport config from './config.js';\nformatDate(parseJSON(config));\n",
    )
    .unwrap();

    let engine = LinkerEngine::new(project.path().to_path_buf(), Box::new(StdFileService::new()), EngineConfig::default());
    let utils_id = engine
        .index_file(&project.path().join("utils.js"), &fs::read_to_string(project.path().join("utils.js")).unwrap())
        .unwrap();
    engine
        .index_file(&project.path().join("config.js"), &fs::read_to_string(project.path().join("config.js")).unwrap())
        .unwrap();
    engine
        .index_file(&project.path().join("index.js"), &fs::read_to_string(project.path().join("index.js")).unwrap())
        .unwrap();
    engine.link_symbols();

    let utils_symbols = engine.get_symbols_in_file(utils_id).unwrap();
    let api_url = utils_symbols.iter().find(|s| s.name == "API_URL").unwrap();
    assert_eq!(api_url.kind, SymbolKind::Constant);

    let format_date = utils_symbols.iter().find(|s| s.name == "formatDate").unwrap();
    let composite = CompositeSymbolId::new(utils_id, format_date.id);
    let references = engine.get_symbol_references(composite).unwrap();
    assert!(references.iter().any(|r| r.imported_name == "formatDate"));

    let link = engine.get_symbol_link(composite).unwrap();
    assert_eq!(link.exported_by, Some(utils_id));
    assert!(link.imported_by.contains(&engine.file_id_for(&project.path().join("index.js")).unwrap()));
}
