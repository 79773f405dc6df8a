//! Scenario 1 (spec §8): a Go `main` package importing a sibling `utils`
//! package links both files and surfaces the `utils` declarations.

use std::fs;
use tempfile::TempDir;

use codelink::config::EngineConfig;
use codelink::linker::LinkerEngine;
use codelink::resolution::StdFileService;
use codelink::types::SymbolKind;

#[test]
fn main_and_utils_link_with_expected_stats() {
    let project = TempDir::new().unwrap();
    fs::create_dir(project.path().join("utils")).unwrap();
    fs::write(
        project.path().join("main.go"),
        "package main\nimport (\n\t\"fmt\"\n\t\"./utils\"\n)\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n",
    )
    .unwrap();
    fs::write(
        project.path().join("utils/utils.go"),
        "package utils\nfunc Add(a, b int) int { return a + b }\nfunc Multiply(a, b int) int { return a * b }\nvar GlobalVar = 1\n",
    )
    .unwrap();

    let engine = LinkerEngine::new(project.path().to_path_buf(), Box::new(StdFileService::new()), EngineConfig::default());
    let main_id = engine.index_file(&project.path().join("main.go"), &fs::read_to_string(project.path().join("main.go")).unwrap()).unwrap();
    let utils_id = engine
        .index_file(&project.path().join("utils/utils.go"), &fs::read_to_string(project.path().join("utils/utils.go")).unwrap())
        .unwrap();
    engine.link_symbols();

    let imports = engine.get_file_imports(main_id).unwrap();
    assert_eq!(imports.len(), 2);

    let utils_symbols = engine.get_symbols_in_file(utils_id).unwrap();
    assert!(utils_symbols.iter().any(|s| s.name == "Add" && s.kind == SymbolKind::Function));
    assert!(utils_symbols.iter().any(|s| s.name == "Multiply" && s.kind == SymbolKind::Function));
    assert!(utils_symbols.iter().any(|s| s.name == "GlobalVar" && s.kind == SymbolKind::Variable));

    let stats = engine.stats();
    assert_eq!(stats.files, 2);
    assert_eq!(stats.import_links, 2);
    assert!(stats.symbols >= 4);
}
