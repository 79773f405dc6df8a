//! Python extractor. Visibility: leading underscore → not exported;
//! dunder (`__x__`) names are exported and flagged `dunder` (spec §4.2).

use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::error::{IndexError, IndexResult};
use crate::parsing::common::{check_recursion_depth, location_of, node_text};
use crate::parsing::{Language, LanguageExtractor};
use crate::symbol::{ImportInfo, ScopeManager, SymbolFlag, SymbolTable, SymbolTableBuilder};
use crate::types::{FileId, ScopeKind, SymbolKind};

pub struct PythonExtractor;

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract_symbols(&self, file_id: FileId, source: &str, path: &Path) -> IndexResult<SymbolTable> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .expect("tree-sitter-python grammar is ABI compatible");
        let tree = parser.parse(source, None).ok_or_else(|| IndexError::ParseFailure {
            path: path.to_path_buf(),
            reason: "tree-sitter-python returned no tree".into(),
        })?;

        let mut builder = SymbolTableBuilder::new(file_id, Language::Python);
        let mut scopes = ScopeManager::new();
        walk(tree.root_node(), source, file_id, &mut builder, &mut scopes, None, &[], 0);
        Ok(builder.build())
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// `_x` → private, `__x__` → public + dunder, anything else → follows
/// enclosing scope (top-level default public, block-scoped never public).
fn visibility_of(name: &str, in_block_scope: bool) -> (bool, bool) {
    if is_dunder(name) {
        return (true, true);
    }
    if name.starts_with('_') {
        return (false, false);
    }
    (!in_block_scope, false)
}

fn decorator_names<'a>(decorated: Node, source: &'a str) -> Vec<&'a str> {
    let mut names = Vec::new();
    let mut cursor = decorated.walk();
    for child in decorated.children(&mut cursor).filter(|n| n.kind() == "decorator") {
        names.push(node_text(child, source).trim_start_matches('@').trim());
    }
    names
}

fn is_enum_class(node: Node, source: &str) -> bool {
    node.child_by_field_name("superclasses")
        .map(|n| node_text(n, source))
        .is_some_and(|text| text.contains("Enum"))
}

#[allow(clippy::too_many_arguments)]
fn walk(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    owner: Option<String>,
    decorators: &[&str],
    depth: usize,
) {
    if !check_recursion_depth(depth, node) {
        return;
    }

    match node.kind() {
        "import_statement" => extract_import(node, source, file_id, builder),
        "import_from_statement" => extract_import_from(node, source, file_id, builder),
        "decorated_definition" => {
            let names = decorator_names(node, source);
            if let Some(def) = node.child_by_field_name("definition") {
                walk(def, source, file_id, builder, scopes, owner, &names, depth + 1);
            }
        }
        "function_definition" => {
            extract_function(node, source, file_id, builder, scopes, owner.as_deref(), decorators);
        }
        "class_definition" => {
            extract_class(node, source, file_id, builder, scopes, owner.as_deref());
        }
        "expression_statement" => {
            extract_module_constant(node, source, file_id, builder, scopes);
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, file_id, builder, scopes, owner.clone(), &[], depth + 1);
            }
        }
    }
}

fn extract_function(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    owner: Option<&str>,
    decorators: &[&str],
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let in_block_scope = !matches!(scopes.current_scope().kind, ScopeKind::File | ScopeKind::Class);
    let (exported, dunder) = visibility_of(&name, in_block_scope);

    let kind = if owner.is_some() {
        if decorators.contains(&"property") {
            SymbolKind::Property
        } else {
            SymbolKind::Method
        }
    } else {
        SymbolKind::Function
    };

    let scope = scopes.current_scope().clone();
    let id = builder.add_symbol(name.clone(), kind, location_of(name_node, file_id), scope, exported);
    if let Some(owner) = owner {
        if let Some(symbol) = builder.symbol_mut(id) {
            symbol.fully_qualified_name = Some(format!("{owner}.{name}"));
        }
    }
    if dunder {
        if let Some(symbol) = builder.symbol_mut(id) {
            symbol.flags.push(SymbolFlag::Dunder);
        }
    }

    scopes.push_scope(ScopeKind::Function, Some(name.clone()), node.start_byte(), node.end_byte());
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            walk(child, source, file_id, builder, scopes, None, &[], 1);
        }
    }
    let _ = scopes.pop_scope();
}

fn extract_class(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    owner: Option<&str>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let in_block_scope = !matches!(scopes.current_scope().kind, ScopeKind::File | ScopeKind::Class);
    let (exported, _) = visibility_of(&name, in_block_scope);

    let kind = if is_enum_class(node, source) { SymbolKind::Enum } else { SymbolKind::Class };
    let scope = scopes.current_scope().clone();
    let id = builder.add_symbol(name.clone(), kind, location_of(name_node, file_id), scope, exported);
    if let Some(owner) = owner {
        if let Some(symbol) = builder.symbol_mut(id) {
            symbol.fully_qualified_name = Some(format!("{owner}.{name}"));
        }
    }

    scopes.push_scope(ScopeKind::Class, Some(name.clone()), node.start_byte(), node.end_byte());
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            walk(child, source, file_id, builder, scopes, Some(name.clone()), &[], 1);
        }
    }
    let _ = scopes.pop_scope();
}

/// `UPPER_CASE = value` at module scope → constant (spec §4.2).
fn extract_module_constant(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
) {
    if !matches!(scopes.current_scope().kind, ScopeKind::File) {
        return;
    }
    let Some(assignment) = node.child(0).filter(|n| n.kind() == "assignment") else { return };
    let Some(name_node) = assignment.child_by_field_name("left").filter(|n| n.kind() == "identifier") else { return };
    let name = node_text(name_node, source).to_string();
    if !name.chars().all(|c| c.is_uppercase() || c == '_' || c.is_ascii_digit()) || name.is_empty() {
        return;
    }
    let (exported, _) = visibility_of(&name, false);
    let scope = scopes.current_scope().clone();
    builder.add_symbol(name, SymbolKind::Constant, location_of(name_node, file_id), scope, exported);
}

fn extract_import(node: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                let path = node_text(child, source).to_string();
                builder.add_import(ImportInfo::new(location_of(node, file_id), path));
            }
            "aliased_import" => {
                let Some(name_node) = child.child_by_field_name("name") else { continue };
                let path = node_text(name_node, source).to_string();
                let mut info = ImportInfo::new(location_of(node, file_id), path);
                if let Some(alias_node) = child.child_by_field_name("alias") {
                    info.alias = Some(node_text(alias_node, source).to_string());
                }
                builder.add_import(info);
            }
            _ => {}
        }
    }
}

fn extract_import_from(node: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let Some(module_node) = node.child_by_field_name("module_name") else { return };
    let module_path = node_text(module_node, source).to_string();

    let mut imported_names = Vec::new();
    let mut is_namespace = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "wildcard_import" => is_namespace = true,
            "dotted_name" if child.id() != module_node.id() => {
                imported_names.push(node_text(child, source).to_string());
            }
            "aliased_import" => {
                let Some(name_node) = child.child_by_field_name("name") else { continue };
                let local = child
                    .child_by_field_name("alias")
                    .unwrap_or(name_node);
                imported_names.push(node_text(local, source).to_string());
            }
            _ => {}
        }
    }

    let mut info = ImportInfo::new(location_of(node, file_id), module_path);
    info.is_namespace = is_namespace;
    info.imported_names = imported_names;
    builder.add_import(info);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> FileId {
        FileId::new(1).unwrap()
    }

    #[test]
    fn extension_recognized() {
        let ext = PythonExtractor;
        assert!(ext.can_handle(Path::new("main.py")));
        assert!(ext.can_handle(Path::new("stub.pyi")));
        assert!(!ext.can_handle(Path::new("main.rb")));
    }

    #[test]
    fn leading_underscore_is_private_dunder_is_public() {
        let source = "def _helper():\n    pass\n\ndef __init__():\n    pass\n";
        let table = PythonExtractor.extract_symbols(file(), source, Path::new("m.py")).unwrap();
        assert!(!table.symbols_named("_helper").next().unwrap().is_exported);
        let dunder = table.symbols_named("__init__").next().unwrap();
        assert!(dunder.is_exported);
        assert!(dunder.flags.contains(&SymbolFlag::Dunder));
    }

    #[test]
    fn module_scope_uppercase_is_constant() {
        let source = "MAX_RETRIES = 3\nlowercase = 1\n";
        let table = PythonExtractor.extract_symbols(file(), source, Path::new("m.py")).unwrap();
        let constant = table.symbols_named("MAX_RETRIES").next().unwrap();
        assert_eq!(constant.kind, SymbolKind::Constant);
        assert!(table.symbols_named("lowercase").next().is_none());
    }

    #[test]
    fn relative_import_keeps_dots() {
        let source = "from . import models\nfrom ..pkg import helper as h\n";
        let table = PythonExtractor.extract_symbols(file(), source, Path::new("m.py")).unwrap();
        assert_eq!(table.imports[0].import_path, ".");
        assert_eq!(table.imports[1].import_path, "..pkg");
        assert_eq!(table.imports[1].imported_names, vec!["h"]);
    }

    #[test]
    fn property_decorated_method_is_property_kind() {
        let source = "class Widget:\n    @property\n    def name(self):\n        return self._name\n";
        let table = PythonExtractor.extract_symbols(file(), source, Path::new("m.py")).unwrap();
        let prop = table.symbols_named("name").next().unwrap();
        assert_eq!(prop.kind, SymbolKind::Property);
        assert_eq!(prop.fully_qualified_name.as_deref(), Some("Widget.name"));
    }
}
