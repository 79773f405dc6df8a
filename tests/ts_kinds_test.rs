//! Scenario 3 (spec §8): a TypeScript file mixing interface, class, and
//! type-alias declarations maps to the expected SymbolKinds.

use std::fs;
use tempfile::TempDir;

use codelink::config::EngineConfig;
use codelink::linker::LinkerEngine;
use codelink::resolution::StdFileService;
use codelink::types::SymbolKind;

#[test]
fn interface_class_and_type_alias_map_to_expected_kinds() {
    let project = TempDir::new().unwrap();
    let source = r#"
export interface User {
    id: number;
    name: string;
}

export class UserService {
    constructor(private user: User) {}
}

export type UserRole = "admin" | "member";
"#;
    fs::write(project.path().join("types.ts"), source).unwrap();

    let engine = LinkerEngine::new(project.path().to_path_buf(), Box::new(StdFileService::new()), EngineConfig::default());
    let file_id = engine.index_file(&project.path().join("types.ts"), source).unwrap();
    engine.link_symbols();

    let symbols = engine.get_symbols_in_file(file_id).unwrap();
    assert_eq!(symbols.iter().find(|s| s.name == "User").unwrap().kind, SymbolKind::Interface);
    assert_eq!(symbols.iter().find(|s| s.name == "UserService").unwrap().kind, SymbolKind::Class);
    assert_eq!(symbols.iter().find(|s| s.name == "UserRole").unwrap().kind, SymbolKind::Type);
    let constructor = symbols
        .iter()
        .find(|s| s.fully_qualified_name.as_deref() == Some("UserService.constructor"))
        .expect("constructor recorded as a method");
    assert_eq!(constructor.kind, SymbolKind::Method);
}
