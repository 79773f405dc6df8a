//! Scenario 5 (spec §8): a bare specifier resolved through `node_modules`
//! and a `package.json` `main` field is external, and marked `package`.

use std::fs;
use tempfile::TempDir;

use codelink::config::EngineConfig;
use codelink::linker::LinkerEngine;
use codelink::resolution::StdFileService;

#[test]
fn bare_specifier_resolves_through_node_modules_main_field() {
    let project = TempDir::new().unwrap();
    fs::create_dir_all(project.path().join("node_modules/lodash")).unwrap();
    fs::write(project.path().join("node_modules/lodash/package.json"), r#"{"name": "lodash", "main": "lodash.js"}"#).unwrap();
    fs::write(project.path().join("node_modules/lodash/lodash.js"), "module.exports = {};\n").unwrap();
    fs::write(project.path().join("index.js"), "import _ from 'lodash';\n").unwrap();

    let engine = LinkerEngine::new(project.path().to_path_buf(), Box::new(StdFileService::new()), EngineConfig::default());
    let file_id = engine.index_file(&project.path().join("index.js"), "import _ from 'lodash';\n").unwrap();
    engine.link_symbols();

    let imports = engine.get_file_imports(file_id).unwrap();
    let lodash = imports.iter().find(|l| l.import_path == "lodash").unwrap();
    assert!(lodash.is_external);
    assert_eq!(lodash.resolution, codelink::linker::ResolutionKindRecord::Package);
}
