//! Python resolver (spec §4.3.3): builtin/stdlib sets, relative dotted
//! walk, absolute resolution against project root / PYTHONPATH-like
//! entries / venv site-packages, then a known-third-party fallback.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{FileService, ModuleResolver, ModuleResolution, ResolutionRequest, internal_file};
use crate::registry::FileRegistry;

const BUILTINS: &[&str] = &["sys", "builtins", "__future__"];

const STDLIB: &[&str] = &[
    "os", "io", "re", "json", "math", "random", "typing", "collections", "itertools",
    "functools", "pathlib", "subprocess", "threading", "asyncio", "datetime", "time", "logging",
    "unittest", "abc", "enum", "dataclasses", "copy", "inspect", "argparse", "socket", "struct",
    "hashlib", "base64", "http", "urllib", "xml", "csv", "sqlite3", "shutil", "tempfile",
    "contextlib", "warnings", "traceback", "weakref", "pickle", "queue", "multiprocessing",
];

const VENV_DIRS: &[&str] = &["venv", ".venv", "env", ".env", "virtualenv"];

pub struct PythonResolver {
    project_root: PathBuf,
    /// Known-third-party package names, seeded from `requirements.txt` /
    /// `setup.py` / `pyproject.toml` at construction time.
    known_packages: HashSet<String>,
}

impl PythonResolver {
    pub fn new(project_root: PathBuf, file_service: &dyn FileService) -> Self {
        let mut known_packages = HashSet::new();
        if let Ok(content) = file_service.load_file(&project_root.join("requirements.txt")) {
            known_packages.extend(parse_requirements_txt(&content));
        }
        if let Ok(content) = file_service.load_file(&project_root.join("pyproject.toml")) {
            known_packages.extend(parse_pyproject_dependencies(&content));
        }
        if let Ok(content) = file_service.load_file(&project_root.join("setup.py")) {
            known_packages.extend(parse_setup_py_install_requires(&content));
        }
        Self { project_root, known_packages }
    }

    fn is_stdlib(module: &str) -> bool {
        let root = module.split('.').next().unwrap_or(module);
        BUILTINS.contains(&module) || STDLIB.contains(&root)
    }

    fn pythonpath_entries(&self) -> Vec<PathBuf> {
        let mut entries = vec![self.project_root.clone()];
        for name in ["src", "lib", "modules"] {
            entries.push(self.project_root.join(name));
        }
        entries
    }

    fn venv_site_packages(&self, file_service: &dyn FileService) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for venv in VENV_DIRS {
            let lib = self.project_root.join(venv).join("lib");
            if file_service.is_dir(&lib) {
                for entry in file_service.list_dir(&lib) {
                    let site_packages = entry.join("site-packages");
                    if file_service.is_dir(&site_packages) {
                        dirs.push(site_packages);
                    }
                }
            }
            let win_site_packages = self.project_root.join(venv).join("Lib").join("site-packages");
            if file_service.is_dir(&win_site_packages) {
                dirs.push(win_site_packages);
            }
        }
        dirs
    }

    /// Walks `segments` under `root`: every non-terminal segment must be a
    /// package directory (`__init__.py`); the terminal one may be a module
    /// file or a package directory.
    fn walk_dotted(root: &Path, segments: &[&str], file_service: &dyn FileService) -> Option<PathBuf> {
        let (last, init) = segments.split_last()?;
        let mut dir = root.to_path_buf();
        for segment in init {
            dir = dir.join(segment);
            if !file_service.exists(&dir.join("__init__.py")) {
                return None;
            }
        }
        let module_file = dir.join(format!("{last}.py"));
        if file_service.exists(&module_file) {
            return Some(module_file);
        }
        let package_init = dir.join(last).join("__init__.py");
        if file_service.exists(&package_init) {
            return Some(package_init);
        }
        None
    }
}

fn parse_requirements_txt(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| {
            l.split(|c: char| "=<>!~;[ ".contains(c))
                .next()
                .unwrap_or(l)
                .to_string()
        })
        .collect()
}

fn parse_pyproject_dependencies(content: &str) -> Vec<String> {
    content
        .parse::<toml::Value>()
        .ok()
        .and_then(|value| {
            value
                .get("project")?
                .get("dependencies")?
                .as_array()
                .map(|deps| {
                    deps.iter()
                        .filter_map(|d| d.as_str())
                        .map(|s| s.split(|c: char| "=<>!~; ".contains(c)).next().unwrap_or(s).to_string())
                        .collect::<Vec<_>>()
                })
        })
        .unwrap_or_default()
}

fn parse_setup_py_install_requires(content: &str) -> Vec<String> {
    // Best-effort: install_requires is a Python list literal in source text,
    // not something worth parsing with a real Python grammar here.
    let Some(start) = content.find("install_requires") else { return Vec::new() };
    let rest = &content[start..];
    let Some(open) = rest.find('[') else { return Vec::new() };
    let Some(close) = rest[open..].find(']') else { return Vec::new() };
    rest[open + 1..open + close]
        .split(',')
        .filter_map(|entry| {
            let trimmed = entry.trim().trim_matches(|c| c == '\'' || c == '"');
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.split(|c: char| "=<>!~; ".contains(c)).next().unwrap_or(trimmed).to_string())
            }
        })
        .collect()
}

impl ModuleResolver for PythonResolver {
    fn resolve(
        &self,
        request: &ResolutionRequest<'_>,
        file_service: &dyn FileService,
        registry: &mut FileRegistry,
    ) -> ModuleResolution {
        let module = request.import.import_path.as_str();

        if PythonResolver::is_stdlib(module) {
            return ModuleResolution::builtin();
        }

        let leading_dots = module.chars().take_while(|&c| c == '.').count();
        if leading_dots > 0 {
            let remainder = &module[leading_dots..];
            let mut base = request.from_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            for _ in 0..leading_dots.saturating_sub(1) {
                base = base.parent().map(Path::to_path_buf).unwrap_or(base);
            }
            if remainder.is_empty() {
                let init = base.join("__init__.py");
                return if file_service.exists(&init) { internal_file(init, registry) } else { ModuleResolution::not_found() };
            }
            let segments: Vec<&str> = remainder.split('.').collect();
            return match Self::walk_dotted(&base, &segments, file_service) {
                Some(found) => internal_file(found, registry),
                None => ModuleResolution::not_found(),
            };
        }

        let segments: Vec<&str> = module.split('.').collect();
        for root in self.pythonpath_entries() {
            if let Some(found) = Self::walk_dotted(&root, &segments, file_service) {
                return internal_file(found, registry);
            }
        }
        for root in self.venv_site_packages(file_service) {
            if let Some(found) = Self::walk_dotted(&root, &segments, file_service) {
                return ModuleResolution::sub_kind(super::ResolutionKind::Package, registry.get_or_create(&found), found, true);
            }
        }

        let top_level = segments.first().copied().unwrap_or(module);
        if self.known_packages.iter().any(|pkg| pkg == top_level) {
            return ModuleResolution::external(None);
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
    fn stdlib_module_is_builtin() {
        let service = MemoryFileService::new([]);
        let resolver = PythonResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "os.path");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/m.py") };
        assert!(resolver.resolve(&request, &service, &mut registry).is_builtin);
    }

    #[test]
    fn relative_single_dot_resolves_sibling_module() {
        let service = MemoryFileService::new([
            (PathBuf::from("/proj/pkg/__init__.py"), String::new()),
            (PathBuf::from("/proj/pkg/models.py"), String::new()),
        ]);
        let resolver = PythonResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), ".models");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/pkg/views.py") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert_eq!(resolution.kind, super::super::ResolutionKind::Internal);
    }

    #[test]
    fn known_third_party_package_is_external() {
        let service = MemoryFileService::new([
            (PathBuf::from("/proj/requirements.txt"), "requests==2.31.0\nflask>=2.0\n".to_string()),
        ]);
        let resolver = PythonResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "requests");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/m.py") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert!(resolution.is_external);
    }

    #[test]
    fn unknown_module_is_not_found() {
        let service = MemoryFileService::new([]);
        let resolver = PythonResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "totally_unknown_thing");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/m.py") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert_eq!(resolution.kind, super::super::ResolutionKind::NotFound);
    }
}
