//! Scenario 6 (spec §8): a `composer.json` PSR-4 mapping resolves a `use`
//! import to its backing project file.

use std::fs;
use tempfile::TempDir;

use codelink::config::EngineConfig;
use codelink::linker::{LinkerEngine, ResolutionKindRecord};
use codelink::resolution::StdFileService;

#[test]
fn psr4_mapping_resolves_use_declaration_to_project_file() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("composer.json"), r#"{"autoload": {"psr-4": {"App\\": "src/"}}}"#).unwrap();
    fs::create_dir_all(project.path().join("src/Models")).unwrap();
    fs::write(project.path().join("src/Models/User.php"), "<?php\nnamespace App\\Models;\nclass User {}\n").unwrap();
    fs::write(project.path().join("index.php"), "<?php\nuse App\\Models\\User;\n").unwrap();

    let engine = LinkerEngine::new(project.path().to_path_buf(), Box::new(StdFileService::new()), EngineConfig::default());
    let file_id = engine
        .index_file(&project.path().join("index.php"), &fs::read_to_string(project.path().join("index.php")).unwrap())
        .unwrap();
    engine.link_symbols();

    let imports = engine.get_file_imports(file_id).unwrap();
    let import = imports.iter().find(|l| l.import_path.contains("User")).expect("use declaration recorded");
    assert_eq!(import.resolution, ResolutionKindRecord::Internal);
    assert!(import.resolved_file.is_some());

    let user_path = project.path().join("src/Models/User.php");
    assert_eq!(engine.file_id_for(&user_path), import.resolved_file);
}
