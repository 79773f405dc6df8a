//! JS/TS resolver (spec §4.3.2): relative/absolute/bare-specifier Node
//! resolution, shared between JavaScript and TypeScript imports.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{FileService, ModuleResolver, ModuleResolution, ResolutionKind, ResolutionRequest, internal_file};
use crate::registry::FileRegistry;

const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "json", "d.ts"];

const BUILTINS: &[&str] = &[
    "fs", "path", "http", "https", "crypto", "os", "util", "events", "stream", "child_process",
    "net", "url", "querystring", "assert", "buffer", "zlib", "readline", "cluster", "dgram",
    "dns", "tls", "vm", "worker_threads", "perf_hooks",
];

pub struct JavaScriptResolver {
    project_root: PathBuf,
}

impl JavaScriptResolver {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    fn is_builtin(specifier: &str) -> bool {
        let stripped = specifier.strip_prefix("node:").unwrap_or(specifier);
        BUILTINS.contains(&stripped)
    }

    /// Tries the exact path, then each extension, then as a directory.
    fn resolve_path(&self, candidate: &Path, file_service: &dyn FileService) -> Option<PathBuf> {
        if file_service.exists(candidate) && !file_service.is_dir(candidate) {
            return Some(candidate.to_path_buf());
        }
        for ext in EXTENSIONS {
            let with_ext = append_extension(candidate, ext);
            if file_service.exists(&with_ext) {
                return Some(with_ext);
            }
        }
        if file_service.is_dir(candidate) {
            return self.resolve_directory(candidate, file_service);
        }
        None
    }

    fn resolve_directory(&self, dir: &Path, file_service: &dyn FileService) -> Option<PathBuf> {
        let package_json = dir.join("package.json");
        if file_service.exists(&package_json) {
            if let Ok(content) = file_service.load_file(&package_json) {
                if let Some(entry) = entry_point_from_package_json(&content) {
                    let candidate = dir.join(entry);
                    if file_service.exists(&candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
        for ext in EXTENSIONS {
            let candidate = dir.join(format!("index.{ext}"));
            if file_service.exists(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Bare specifier: walk parents from the importer's directory looking
    /// for a `node_modules` directory containing the package.
    fn resolve_bare(&self, specifier: &str, from_dir: &Path, file_service: &dyn FileService) -> Option<(PathBuf, PathBuf)> {
        let (package_name, subpath) = split_package(specifier);
        let mut dir = from_dir.to_path_buf();
        loop {
            let node_modules = dir.join("node_modules");
            let package_root = node_modules.join(&package_name);
            if file_service.is_dir(&package_root) {
                let target = match subpath {
                    Some(sub) => self.resolve_path(&package_root.join(sub), file_service),
                    None => self.resolve_directory(&package_root, file_service).or_else(|| self.resolve_path(&package_root, file_service)),
                };
                return Some((package_root, target.unwrap_or_else(|| package_root.clone())));
            }
            match dir.parent() {
                Some(parent) if parent != dir => dir = parent.to_path_buf(),
                _ => return None,
            }
        }
    }
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn split_package(specifier: &str) -> (String, Option<&str>) {
    if let Some(rest) = specifier.strip_prefix('@') {
        if let Some(slash) = rest.find('/') {
            let after_scope = &rest[slash + 1..];
            return match after_scope.find('/') {
                Some(i) => (format!("@{}", &rest[..slash + 1 + i]), Some(&after_scope[i + 1..])),
                None => (format!("@{rest}"), None),
            };
        }
    }
    match specifier.find('/') {
        Some(i) => (specifier[..i].to_string(), Some(&specifier[i + 1..])),
        None => (specifier.to_string(), None),
    }
}

fn entry_point_from_package_json(content: &str) -> Option<String> {
    let value: Value = serde_json::from_str(content).ok()?;
    if let Some(exports) = value.get("exports") {
        if let Some(dot) = exports.get(".") {
            for key in ["types", "typings", "import", "default"] {
                if let Some(s) = dot.get(key).and_then(Value::as_str) {
                    return Some(s.to_string());
                }
            }
        } else if let Some(s) = exports.as_str() {
            return Some(s.to_string());
        }
    }
    if let Some(s) = value.get("types").and_then(Value::as_str) {
        return Some(s.to_string());
    }
    if let Some(s) = value.get("typings").and_then(Value::as_str) {
        return Some(s.to_string());
    }
    let is_module = value.get("type").and_then(Value::as_str) == Some("module");
    if is_module {
        if let Some(s) = value.get("module").and_then(Value::as_str) {
            return Some(s.to_string());
        }
    }
    value.get("main").and_then(Value::as_str).map(str::to_string)
}

impl ModuleResolver for JavaScriptResolver {
    fn resolve(
        &self,
        request: &ResolutionRequest<'_>,
        file_service: &dyn FileService,
        registry: &mut FileRegistry,
    ) -> ModuleResolution {
        let specifier = request.import.import_path.as_str();

        if JavaScriptResolver::is_builtin(specifier) {
            return ModuleResolution::builtin();
        }

        if let Some(rest) = specifier.strip_prefix("./").or_else(|| specifier.strip_prefix("../")) {
            let base = request.from_path.parent().unwrap_or_else(|| Path::new("."));
            let candidate = base.join(if specifier.starts_with("../") { specifier } else { rest });
            return match self.resolve_path(&candidate, file_service) {
                Some(found) => internal_file(found, registry),
                None => ModuleResolution::not_found(),
            };
        }

        if let Some(rest) = specifier.strip_prefix('/') {
            let candidate = self.project_root.join(rest);
            return match self.resolve_path(&candidate, file_service) {
                Some(found) => internal_file(found, registry),
                None => ModuleResolution::not_found(),
            };
        }

        let from_dir = request.from_path.parent().unwrap_or_else(|| Path::new("."));
        match self.resolve_bare(specifier, from_dir, file_service) {
            Some((package_root, target)) if target != package_root => {
                ModuleResolution::sub_kind(ResolutionKind::Package, registry.get_or_create(&target), target, true)
            }
            Some((package_root, _)) => ModuleResolution::external(package_root),
            None => ModuleResolution::not_found_external(),
        }
    }
}
