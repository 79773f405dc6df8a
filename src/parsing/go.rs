//! Go extractor.
//!
//! Visibility follows the language convention directly: a declaration is
//! exported iff its first rune is uppercase (spec §4.2). Dot-imports keep
//! `"."` as their alias so the linker can treat them like a namespace import.

use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::error::{IndexError, IndexResult};
use crate::parsing::common::{check_recursion_depth, location_of, node_text, unquote};
use crate::parsing::{Language, LanguageExtractor};
use crate::symbol::{ImportInfo, ScopeManager, SymbolTable, SymbolTableBuilder};
use crate::types::{FileId, ScopeKind, SymbolKind};

pub struct GoExtractor;

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

impl LanguageExtractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn extract_symbols(&self, file_id: FileId, source: &str, path: &Path) -> IndexResult<SymbolTable> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .expect("tree-sitter-go grammar is ABI compatible");
        let tree: Tree = parser.parse(source, None).ok_or_else(|| IndexError::ParseFailure {
            path: path.to_path_buf(),
            reason: "tree-sitter-go returned no tree".into(),
        })?;

        let mut builder = SymbolTableBuilder::new(file_id, Language::Go);
        let mut scopes = ScopeManager::new();
        walk(tree.root_node(), source, file_id, &mut builder, &mut scopes, 0);
        Ok(builder.build())
    }
}

fn walk(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    depth: usize,
) {
    if !check_recursion_depth(depth, node) {
        return;
    }

    match node.kind() {
        "import_declaration" => extract_imports(node, source, file_id, builder),
        "function_declaration" => extract_function(node, source, file_id, builder, scopes),
        "method_declaration" => extract_method(node, source, file_id, builder, scopes),
        "type_declaration" => extract_types(node, source, file_id, builder, scopes),
        "const_declaration" | "var_declaration" => {
            extract_value_decl(node, source, file_id, builder, scopes, node.kind() == "const_declaration")
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, file_id, builder, scopes, depth + 1);
            }
        }
    }
}

fn extract_imports(node: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor).filter(|n| n.kind() == "import_spec_list" || n.kind() == "import_spec") {
        if spec.kind() == "import_spec_list" {
            let mut inner = spec.walk();
            for child in spec.children(&mut inner).filter(|n| n.kind() == "import_spec") {
                push_import_spec(child, source, file_id, builder);
            }
        } else {
            push_import_spec(spec, source, file_id, builder);
        }
    }
}

fn push_import_spec(spec: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let Some(path_node) = spec.child_by_field_name("path") else { return };
    let import_path = unquote(node_text(path_node, source)).to_string();
    let mut info = ImportInfo::new(location_of(spec, file_id), import_path);

    if let Some(name_node) = spec.child_by_field_name("name") {
        let alias = node_text(name_node, source).to_string();
        if alias == "." {
            info.is_namespace = true;
        }
        info.alias = Some(alias);
    }

    builder.add_import(info);
}

fn extract_function(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let exported = is_exported(&name);
    let scope = scopes.current_scope().clone();

    builder.add_symbol(name, SymbolKind::Function, location_of(name_node, file_id), scope, exported);

    scopes.push_scope(ScopeKind::Function, None, node.start_byte(), node.end_byte());
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            walk(child, source, file_id, builder, scopes, 1);
        }
    }
    let _ = scopes.pop_scope();
}

fn extract_method(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let exported = is_exported(&name);

    let receiver_type = node
        .child_by_field_name("receiver")
        .and_then(receiver_type_name)
        .map(|t| node_text(t, source).trim_start_matches('*').to_string());

    let fqn = receiver_type.as_ref().map(|owner| format!("{owner}.{name}"));
    let scope = scopes.current_scope().clone();

    let id = builder.add_symbol(name, SymbolKind::Method, location_of(name_node, file_id), scope, exported);
    if let (Some(symbol), Some(fqn)) = (builder.symbol_mut(id), fqn) {
        symbol.fully_qualified_name = Some(fqn);
    }

    scopes.push_scope(ScopeKind::Method, None, node.start_byte(), node.end_byte());
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            walk(child, source, file_id, builder, scopes, 1);
        }
    }
    let _ = scopes.pop_scope();
}

/// Walks a receiver's `parameter_list` down to its type-identifier leaf.
fn receiver_type_name(receiver: Node) -> Option<Node> {
    let mut cursor = receiver.walk();
    for param in receiver.children(&mut cursor) {
        if param.kind() == "parameter_declaration" {
            if let Some(ty) = param.child_by_field_name("type") {
                return Some(ty);
            }
        }
    }
    None
}

fn extract_types(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor).filter(|n| n.kind() == "type_spec") {
        let Some(name_node) = spec.child_by_field_name("name") else { continue };
        let name = node_text(name_node, source).to_string();
        let exported = is_exported(&name);
        let Some(ty) = spec.child_by_field_name("type") else { continue };

        let kind = match ty.kind() {
            "struct_type" => SymbolKind::Struct,
            "interface_type" => SymbolKind::Interface,
            _ => SymbolKind::Type,
        };

        let scope = scopes.current_scope().clone();
        builder.add_symbol(name.clone(), kind, location_of(name_node, file_id), scope, exported);

        match ty.kind() {
            "struct_type" => extract_struct_fields(ty, &name, source, file_id, builder, scopes),
            "interface_type" => extract_interface_methods(ty, &name, source, file_id, builder, scopes),
            _ => {}
        }
    }
}

fn extract_struct_fields(
    struct_type: Node,
    owner: &str,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
) {
    scopes.push_scope(ScopeKind::Class, Some(owner.to_string()), struct_type.start_byte(), struct_type.end_byte());
    if let Some(list) = struct_type.child_by_field_name("body").or(Some(struct_type)) {
        let mut cursor = list.walk();
        for field in list.children(&mut cursor) {
            if field.kind() != "field_declaration" {
                continue;
            }
            let mut fcursor = field.walk();
            for name_node in field.children(&mut fcursor).filter(|n| n.kind() == "field_identifier") {
                let name = node_text(name_node, source).to_string();
                let exported = is_exported(&name);
                let scope = scopes.current_scope().clone();
                let id = builder.add_symbol(name.clone(), SymbolKind::Property, location_of(name_node, file_id), scope, exported);
                if let Some(symbol) = builder.symbol_mut(id) {
                    symbol.fully_qualified_name = Some(format!("{owner}.{name}"));
                }
            }
        }
    }
    let _ = scopes.pop_scope();
}

fn extract_interface_methods(
    iface: Node,
    owner: &str,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
) {
    scopes.push_scope(ScopeKind::Class, Some(owner.to_string()), iface.start_byte(), iface.end_byte());
    let mut cursor = iface.walk();
    for spec in iface.children(&mut cursor).filter(|n| n.kind() == "method_spec" || n.kind() == "method_elem") {
        let Some(name_node) = spec.child_by_field_name("name") else { continue };
        let name = node_text(name_node, source).to_string();
        let exported = is_exported(&name);
        let scope = scopes.current_scope().clone();
        let id = builder.add_symbol(name.clone(), SymbolKind::Method, location_of(name_node, file_id), scope, exported);
        if let Some(symbol) = builder.symbol_mut(id) {
            symbol.fully_qualified_name = Some(format!("{owner}.{name}"));
        }
    }
    let _ = scopes.pop_scope();
}

fn extract_value_decl(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    is_const: bool,
) {
    let kind = if is_const { SymbolKind::Constant } else { SymbolKind::Variable };
    let spec_kind = if is_const { "const_spec" } else { "var_spec" };
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor).filter(|n| n.kind() == spec_kind) {
        let mut inner = spec.walk();
        for name_node in spec.children(&mut inner).filter(|n| n.kind() == "identifier") {
            let name = node_text(name_node, source).to_string();
            let exported = is_exported(&name);
            let scope = scopes.current_scope().clone();
            builder.add_symbol(name, kind, location_of(name_node, file_id), scope, exported);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> FileId {
        FileId::new(1).unwrap()
    }

    #[test]
    fn visibility_follows_capitalization() {
        assert!(is_exported("Add"));
        assert!(!is_exported("add"));
        assert!(is_exported("GlobalVar"));
    }

    #[test]
    fn extension_recognized() {
        let ext = GoExtractor;
        assert!(ext.can_handle(Path::new("main.go")));
        assert!(!ext.can_handle(Path::new("main.py")));
    }

    #[test]
    fn extracts_functions_and_vars_from_utils() {
        let source = r#"
package utils

func Add(a, b int) int {
	return a + b
}

func Multiply(a, b int) int {
	return a * b
}

var GlobalVar = 42
"#;
        let table = GoExtractor.extract_symbols(file(), source, Path::new("utils.go")).unwrap();
        assert!(table.exported_symbol_named("Add").is_some());
        assert!(table.exported_symbol_named("Multiply").is_some());
        assert!(table.exported_symbol_named("GlobalVar").is_some());
    }

    #[test]
    fn import_with_alias_and_dot_import() {
        let source = r#"
package main

import (
	"fmt"
	u "main/utils"
	. "main/dotted"
)
"#;
        let table = GoExtractor.extract_symbols(file(), source, Path::new("main.go")).unwrap();
        assert_eq!(table.imports.len(), 3);
        assert_eq!(table.imports[0].import_path, "fmt");
        assert_eq!(table.imports[1].alias.as_deref(), Some("u"));
        assert_eq!(table.imports[2].alias.as_deref(), Some("."));
        assert!(table.imports[2].is_namespace);
    }

    #[test]
    fn method_uses_owner_dot_member_fqn() {
        let source = r#"
package main

type Server struct {
	Addr string
}

func (s *Server) Listen() error {
	return nil
}
"#;
        let table = GoExtractor.extract_symbols(file(), source, Path::new("main.go")).unwrap();
        let method = table.symbols_named("Listen").next().unwrap();
        assert_eq!(method.fully_qualified_name.as_deref(), Some("Server.Listen"));
        let field = table.symbols_named("Addr").next().unwrap();
        assert_eq!(field.fully_qualified_name.as_deref(), Some("Server.Addr"));
    }
}
