//! C# resolver (spec §4.3.5): built-in .NET namespace prefixes, a
//! namespace→directory search under project root/`src`/`lib`, then
//! `.csproj`-derived assembly references and a known third-party fallback.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{FileService, ModuleResolver, ModuleResolution, ResolutionRequest, internal_file};
use crate::registry::FileRegistry;

const BUILTIN_PREFIXES: &[&str] = &["System", "Microsoft", "Windows"];

const KNOWN_THIRD_PARTY: &[&str] = &["Newtonsoft", "NUnit", "Moq", "Serilog", "AutoMapper", "Dapper", "Polly", "xunit"];

pub struct CSharpResolver {
    project_root: PathBuf,
    /// namespace -> referenced assembly path, from `.csproj` parsing.
    assembly_map: HashMap<String, PathBuf>,
}

impl CSharpResolver {
    pub fn new(project_root: PathBuf, file_service: &dyn FileService) -> Self {
        let mut assembly_map = HashMap::new();
        for entry in file_service.list_dir(&project_root) {
            if entry.extension().and_then(|e| e.to_str()) == Some("csproj") {
                if let Ok(content) = file_service.load_file(&entry) {
                    parse_csproj_references(&content, &mut assembly_map);
                }
            }
        }
        Self { project_root, assembly_map }
    }

    /// `.csproj` package names are full dotted identifiers
    /// (`Newtonsoft.Json`), but an import's namespace may go deeper
    /// (`Newtonsoft.Json.Linq`). Match the longest dotted prefix of
    /// `namespace` that's a known package, not just its first segment.
    fn longest_assembly_match<'a>(map: &'a HashMap<String, PathBuf>, namespace: &str) -> Option<&'a PathBuf> {
        let segments: Vec<&str> = namespace.split('.').collect();
        for len in (1..=segments.len()).rev() {
            let prefix = segments[..len].join(".");
            if let Some(path) = map.get(&prefix) {
                return Some(path);
            }
        }
        None
    }

    fn is_builtin(namespace: &str) -> bool {
        BUILTIN_PREFIXES
            .iter()
            .any(|&prefix| namespace == prefix || namespace.starts_with(&format!("{prefix}.")))
    }

    fn search_dirs(&self, namespace: &str, file_service: &dyn FileService) -> Option<PathBuf> {
        let relative = namespace.replace('.', "/");
        for root_name in [".", "src", "lib"] {
            let dir = if root_name == "." {
                self.project_root.join(&relative)
            } else {
                self.project_root.join(root_name).join(&relative)
            };
            if !file_service.is_dir(&dir) {
                continue;
            }
            let mut entries = file_service.list_dir(&dir);
            entries.sort();
            if let Some(found) = entries.into_iter().find(|p| p.extension().and_then(|e| e.to_str()) == Some("cs")) {
                return Some(found);
            }
        }
        None
    }
}

/// `.csproj` `<PackageReference Include="Name" .../>` and
/// `<ProjectReference Include="../Other/Other.csproj" />` entries, mapped
/// under their own package/project name as a coarse namespace key.
fn parse_csproj_references(content: &str, map: &mut HashMap<String, PathBuf>) {
    for line in content.lines() {
        let trimmed = line.trim();
        for tag in ["PackageReference", "ProjectReference"] {
            if !trimmed.starts_with(&format!("<{tag}")) {
                continue;
            }
            if let Some(include) = extract_xml_attr(trimmed, "Include") {
                let name = include.rsplit(['/', '\\']).next().unwrap_or(&include);
                let name = name.trim_end_matches(".csproj");
                map.insert(name.to_string(), PathBuf::from(include.clone()));
            }
        }
    }
}

fn extract_xml_attr(tag: &str, attr: &str) -> Option<String> {
    let needle = format!("{attr}=\"");
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')? + start;
    Some(tag[start..end].to_string())
}

impl ModuleResolver for CSharpResolver {
    fn resolve(
        &self,
        request: &ResolutionRequest<'_>,
        file_service: &dyn FileService,
        registry: &mut FileRegistry,
    ) -> ModuleResolution {
        let namespace = request.import.import_path.as_str();

        if CSharpResolver::is_builtin(namespace) {
            return ModuleResolution::builtin();
        }

        if let Some(found) = self.search_dirs(namespace, file_service) {
            return internal_file(found, registry);
        }

        if let Some(assembly) = Self::longest_assembly_match(&self.assembly_map, namespace) {
            return ModuleResolution::external(assembly.clone());
        }

        let top_level = namespace.split('.').next().unwrap_or(namespace);
        if KNOWN_THIRD_PARTY.iter().any(|&pkg| pkg == top_level) {
            return ModuleResolution::external(None);
        }

        ModuleResolution::error("namespace not found")
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
    fn system_namespace_is_builtin() {
        let service = MemoryFileService::new([]);
        let resolver = CSharpResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "System.Collections.Generic");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/Program.cs") };
        assert!(resolver.resolve(&request, &service, &mut registry).is_builtin);
    }

    #[test]
    fn project_namespace_resolves_to_source_directory() {
        let service = MemoryFileService::new([
            (PathBuf::from("/proj/MyApp/Services/UserService.cs"), "namespace MyApp.Services;".to_string()),
        ]);
        let resolver = CSharpResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "MyApp.Services");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/MyApp/Program.cs") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert_eq!(resolution.kind, super::super::ResolutionKind::Internal);
    }

    #[test]
    fn known_third_party_namespace_is_external() {
        let service = MemoryFileService::new([]);
        let resolver = CSharpResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "Newtonsoft.Json");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/Program.cs") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert!(resolution.is_external);
    }

    #[test]
    fn csproj_package_reference_resolves_multi_segment_namespace() {
        let service = MemoryFileService::new([(
            PathBuf::from("/proj/App.csproj"),
            r#"<Project><ItemGroup><PackageReference Include="Newtonsoft.Json" Version="13.0.1" /></ItemGroup></Project>"#.to_string(),
        )]);
        let resolver = CSharpResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "Newtonsoft.Json.Linq");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/Program.cs") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert!(resolution.is_external);
        assert_eq!(resolution.path.as_deref(), Some(Path::new("Newtonsoft.Json")));
    }

    #[test]
    fn unresolvable_namespace_is_error() {
        let service = MemoryFileService::new([]);
        let resolver = CSharpResolver::new(PathBuf::from("/proj"), &service);
        let mut registry = FileRegistry::new();
        let import = ImportInfo::new(loc(), "Totally.Unknown.Thing");
        let request = ResolutionRequest { import: &import, from_file: FileId::new(1).unwrap(), from_path: Path::new("/proj/Program.cs") };
        let resolution = resolver.resolve(&request, &service, &mut registry);
        assert_eq!(resolution.kind, super::super::ResolutionKind::Error);
    }
}
