//! Module resolvers (C3): turn an [`ImportInfo`] into a [`ModuleResolution`]
//! against the project's files, the host language's builtins, or an
//! external/third-party verdict.

mod csharp;
mod file_service;
mod go;
mod javascript;
mod php;
mod python;

pub use csharp::CSharpResolver;
pub use file_service::{FileService, StdFileService};
pub use go::GoResolver;
pub use javascript::JavaScriptResolver;
pub use php::PhpResolver;
pub use python::PythonResolver;

#[cfg(test)]
pub use file_service::MemoryFileService;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::parsing::Language;
use crate::registry::FileRegistry;
use crate::symbol::ImportInfo;
use crate::types::FileId;

/// What kind of target an import resolved to (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    Internal,
    File,
    Directory,
    Package,
    Builtin,
    External,
    NotFound,
    Error,
}

/// Outcome of resolving one [`ImportInfo`] against a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResolution {
    pub kind: ResolutionKind,
    pub file_id: Option<FileId>,
    pub path: Option<PathBuf>,
    pub is_external: bool,
    pub is_builtin: bool,
    pub message: Option<String>,
}

impl ModuleResolution {
    pub fn internal(file_id: FileId, path: PathBuf) -> Self {
        Self {
            kind: ResolutionKind::Internal,
            file_id: Some(file_id),
            path: Some(path),
            is_external: false,
            is_builtin: false,
            message: None,
        }
    }

    /// JS/TS internal sub-kinds: the target was a file, a directory entry
    /// point, or a resolved package — still internal unless `external`.
    pub fn sub_kind(kind: ResolutionKind, file_id: FileId, path: PathBuf, external: bool) -> Self {
        Self {
            kind,
            file_id: (!external).then_some(file_id),
            path: Some(path),
            is_external: external,
            is_builtin: false,
            message: None,
        }
    }

    pub fn builtin() -> Self {
        Self {
            kind: ResolutionKind::Builtin,
            file_id: None,
            path: None,
            is_external: false,
            is_builtin: true,
            message: None,
        }
    }

    pub fn external(path: impl Into<Option<PathBuf>>) -> Self {
        Self {
            kind: ResolutionKind::External,
            file_id: None,
            path: path.into(),
            is_external: true,
            is_builtin: false,
            message: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            kind: ResolutionKind::NotFound,
            file_id: None,
            path: None,
            is_external: false,
            is_builtin: false,
            message: None,
        }
    }

    pub fn not_found_external() -> Self {
        Self {
            is_external: true,
            ..Self::not_found()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ResolutionKind::Error,
            file_id: None,
            path: None,
            is_external: false,
            is_builtin: false,
            message: Some(message.into()),
        }
    }
}

/// One request to resolve an import, scoped to the file it appeared in.
pub struct ResolutionRequest<'a> {
    pub import: &'a ImportInfo,
    pub from_file: FileId,
    pub from_path: &'a Path,
}

/// Implemented once per language; the linker dispatches by the importing
/// file's [`crate::parsing::Language`].
pub trait ModuleResolver: Send + Sync {
    fn resolve(
        &self,
        request: &ResolutionRequest<'_>,
        file_service: &dyn FileService,
        registry: &mut FileRegistry,
    ) -> ModuleResolution;
}

/// Registers a found source file with the shared [`FileRegistry`] and
/// produces an `internal` resolution for it. Shared by every resolver that
/// locates a concrete file on disk.
fn internal_file(path: PathBuf, registry: &mut FileRegistry) -> ModuleResolution {
    let file_id = registry.get_or_create(&path);
    ModuleResolution::internal(file_id, path)
}

/// Dispatch table keyed by language, mirroring [`crate::parsing::ExtractorRegistry`].
/// JavaScript and TypeScript share one [`JavaScriptResolver`] instance since
/// Node module resolution doesn't distinguish them (spec §4.3.2).
pub struct ResolverRegistry {
    resolvers: HashMap<Language, Box<dyn ModuleResolver>>,
}

impl ResolverRegistry {
    pub fn with_defaults(project_root: PathBuf, file_service: &dyn FileService) -> Self {
        let mut resolvers: HashMap<Language, Box<dyn ModuleResolver>> = HashMap::new();
        resolvers.insert(Language::Go, Box::new(GoResolver::new(project_root.clone(), file_service)));
        let ecma_resolver = std::sync::Arc::new(JavaScriptResolver::new(project_root.clone()));
        resolvers.insert(Language::JavaScript, Box::new(SharedResolver(ecma_resolver.clone())));
        resolvers.insert(Language::TypeScript, Box::new(SharedResolver(ecma_resolver)));
        resolvers.insert(Language::Python, Box::new(PythonResolver::new(project_root.clone(), file_service)));
        resolvers.insert(Language::Php, Box::new(PhpResolver::new(project_root.clone(), file_service)));
        resolvers.insert(Language::CSharp, Box::new(CSharpResolver::new(project_root, file_service)));
        Self { resolvers }
    }

    pub fn for_language(&self, language: Language) -> Option<&dyn ModuleResolver> {
        self.resolvers.get(&language).map(|b| b.as_ref())
    }
}

/// Thin `Arc` forwarder so one [`JavaScriptResolver`] can be registered
/// under both `Language::JavaScript` and `Language::TypeScript`.
struct SharedResolver(std::sync::Arc<JavaScriptResolver>);

impl ModuleResolver for SharedResolver {
    fn resolve(
        &self,
        request: &ResolutionRequest<'_>,
        file_service: &dyn FileService,
        registry: &mut FileRegistry,
    ) -> ModuleResolution {
        self.0.resolve(request, file_service, registry)
    }
}
