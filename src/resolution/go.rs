//! Go module resolver (spec §4.3.1): fixed stdlib set, module-root
//! matching read from `go.mod`, and `./`/`../` relative fixtures.

use std::path::{Path, PathBuf};

use super::{FileService, ModuleResolver, ModuleResolution, ResolutionRequest, internal_file};
use crate::registry::FileRegistry;

const STDLIB: &[&str] = &[
    "fmt", "os", "io", "net/http", "net", "net/url", "sync", "sync/atomic", "context", "strings",
    "strconv", "errors", "time", "encoding/json", "encoding/base64", "path/filepath", "path",
    "regexp", "sort", "bytes", "bufio", "math", "math/rand", "unicode", "unicode/utf8",
    "reflect", "runtime", "log", "flag", "testing", "container/list", "container/heap",
];

pub struct GoResolver {
    project_root: PathBuf,
    module_path: Option<String>,
}

impl GoResolver {
    pub fn new(project_root: PathBuf, file_service: &dyn FileService) -> Self {
        let module_path = file_service
            .load_file(&project_root.join("go.mod"))
            .ok()
            .and_then(|content| parse_module_path(&content));
        Self { project_root, module_path }
    }

    fn is_stdlib(path: &str) -> bool {
        STDLIB.contains(&path) || STDLIB.iter().any(|&root| path == root || path.starts_with(&format!("{root}/")))
    }

    /// Searches `dir` for the first `.go` file (a Go import names a
    /// package directory, not a specific file).
    fn first_go_file(dir: &Path, file_service: &dyn FileService) -> Option<PathBuf> {
        if !file_service.is_dir(dir) {
            return None;
        }
        let mut entries = file_service.list_dir(dir);
        entries.sort();
        entries
            .into_iter()
            .find(|p| p.extension().and_then(|e| e.to_str()) == Some("go"))
    }
}

fn parse_module_path(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("module ").map(|s| s.trim().to_string()))
}

impl ModuleResolver for GoResolver {
    fn resolve(
        &self,
        request: &ResolutionRequest<'_>,
        file_service: &dyn FileService,
        registry: &mut FileRegistry,
    ) -> ModuleResolution {
        let path = request.import.import_path.as_str();

        if Self::is_stdlib(path) {
            return ModuleResolution::builtin();
        }

        if let Some(stripped) = path.strip_prefix("./").or_else(|| path.strip_prefix("../")) {
            let base = request.from_path.parent().unwrap_or_else(|| Path::new("."));
            let candidate = base.join(if path.starts_with("../") { path } else { stripped });
            if let Some(found) = Self::first_go_file(&candidate, file_service) {
                return internal_file(found, registry);
            }
            return ModuleResolution::not_found();
        }

        if let Some(module_path) = &self.module_path {
            if let Some(remainder) = path
                .strip_prefix(module_path.as_str())
                .map(|r| r.trim_start_matches('/'))
            {
                let candidate = self.project_root.join(remainder);
                if let Some(found) = Self::first_go_file(&candidate, file_service) {
                    return internal_file(found, registry);
                }
            }
        }

        ModuleResolution::external(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::file_service::MemoryFileService;
    use crate::symbol::ImportInfo;
    use crate::types::{FileId, Location};

    fn loc() -> Location {
        Location::new(FileId::new(1).unwrap(), 0, 1, 1, 0)
    }

    #[test]
    fn stdlib_import_is_builtin() {
        let service = MemoryFileService::new([]);
        let resolver = GoResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "net/http");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/main.go") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert!(resolution.is_builtin);
    }

    #[test]
    fn module_root_import_resolves_internally() {
        let service = MemoryFileService::new([
            (PathBuf::from("/proj/go.mod"), "module example.com/proj\n\ngo 1.22\n".to_string()),
            (PathBuf::from("/proj/pkg/util/util.go"), "package util".to_string()),
        ]);
        let resolver = GoResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "example.com/proj/pkg/util");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/main.go") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert_eq!(resolution.kind, super::super::ResolutionKind::Internal);
        assert!(resolution.file_id.is_some());
    }

    #[test]
    fn unknown_import_is_external() {
        let service = MemoryFileService::new([]);
        let resolver = GoResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "github.com/pkg/errors");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/main.go") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert!(resolution.is_external);
    }
}
