//! Shared traversal for JavaScript and TypeScript (spec §4.2: "JS/TS
//! resolver" already treats the two as one family; the extractors mirror
//! that by sharing a walk and letting TypeScript opt into the extra
//! type-level constructs).

use std::path::Path;

use tree_sitter::Node;

use crate::error::{IndexError, IndexResult};
use crate::parsing::common::{check_recursion_depth, location_of, node_text, unquote};
use crate::parsing::Language;
use crate::symbol::{ExportInfo, ImportInfo, ScopeManager, SymbolTable, SymbolTableBuilder};
use crate::types::{FileId, ScopeKind, SymbolKind};

pub fn extract(
    file_id: FileId,
    source: &str,
    path: &Path,
    language: Language,
    type_level: bool,
) -> IndexResult<SymbolTable> {
    let mut parser = tree_sitter::Parser::new();
    let ts_language: tree_sitter::Language = if type_level {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    } else {
        tree_sitter_javascript::LANGUAGE.into()
    };
    parser
        .set_language(&ts_language)
        .expect("tree-sitter grammar is ABI compatible");
    let tree = parser.parse(source, None).ok_or_else(|| IndexError::ParseFailure {
        path: path.to_path_buf(),
        reason: "tree-sitter returned no tree".into(),
    })?;

    let mut builder = SymbolTableBuilder::new(file_id, language);
    let mut scopes = ScopeManager::new();
    let mut exported_names = std::collections::HashSet::new();
    let mut default_export: Option<String> = None;

    collect_export_clauses(tree.root_node(), source, &mut builder, &mut exported_names, &mut default_export);
    walk(
        tree.root_node(),
        source,
        file_id,
        &mut builder,
        &mut scopes,
        type_level,
        &exported_names,
        &default_export,
        0,
    );

    Ok(builder.build())
}

/// Export clauses (`export { a, b as c }`, `export default x`) name an
/// already-declared local symbol rather than wrapping its declaration, so
/// visibility for those is resolved in a pre-pass; this pass also records
/// their [`ExportInfo`] directly since the declaration site doesn't see
/// the alias.
fn collect_export_clauses(
    node: Node,
    source: &str,
    builder: &mut SymbolTableBuilder,
    exported: &mut std::collections::HashSet<String>,
    default_export: &mut Option<String>,
) {
    if node.kind() == "export_statement" {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "export_clause" => {
                    let mut ec = child.walk();
                    for specifier in child.children(&mut ec).filter(|n| n.kind() == "export_specifier") {
                        if let Some(name_node) = specifier.child_by_field_name("name") {
                            let local = node_text(name_node, source).to_string();
                            let exported_name = specifier
                                .child_by_field_name("alias")
                                .map(|n| node_text(n, source).to_string())
                                .unwrap_or_else(|| local.clone());
                            exported.insert(local.clone());
                            builder.add_export(ExportInfo::new(local, exported_name));
                        }
                    }
                }
                "identifier" => {
                    let mut has_default = false;
                    let mut dc = node.walk();
                    for sibling in node.children(&mut dc) {
                        if sibling.kind() == "default" {
                            has_default = true;
                        }
                    }
                    if has_default {
                        let local = node_text(child, source).to_string();
                        *default_export = Some(local.clone());
                        let mut export = ExportInfo::new(local, "default");
                        export.is_default = true;
                        builder.add_export(export);
                    }
                }
                _ => {}
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_export_clauses(child, source, builder, exported, default_export);
    }
}

fn is_directly_exported(node: Node) -> bool {
    node.parent().is_some_and(|p| p.kind() == "export_statement")
}

#[allow(clippy::too_many_arguments)]
fn walk(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    type_level: bool,
    exported_names: &std::collections::HashSet<String>,
    default_export: &Option<String>,
    depth: usize,
) {
    if !check_recursion_depth(depth, node) {
        return;
    }

    macro_rules! recurse_children {
        ($n:expr) => {
            let mut cursor = $n.walk();
            for child in $n.children(&mut cursor) {
                walk(child, source, file_id, builder, scopes, type_level, exported_names, default_export, depth + 1);
            }
        };
    }

    match node.kind() {
        "import_statement" => extract_import(node, source, file_id, builder),
        "export_statement" => {
            if let Some(source_node) = node.child_by_field_name("source") {
                extract_reexport(node, source_node, source, file_id, builder);
            }
            recurse_children!(node);
        }
        "function_declaration" | "generator_function_declaration" => {
            extract_function(node, source, file_id, builder, scopes, exported_names, default_export);
            if let Some(body) = node.child_by_field_name("body") {
                scopes.push_scope(ScopeKind::Function, None, node.start_byte(), node.end_byte());
                recurse_children!(body);
                let _ = scopes.pop_scope();
            }
        }
        "class_declaration" => {
            extract_class(node, source, file_id, builder, scopes, exported_names, default_export);
        }
        "lexical_declaration" | "variable_declaration" => {
            extract_variable_declaration(node, source, file_id, builder, scopes, exported_names, default_export);
        }
        "interface_declaration" if type_level => {
            extract_interface(node, source, file_id, builder, scopes, exported_names, default_export);
        }
        "type_alias_declaration" if type_level => {
            extract_type_alias(node, source, file_id, builder, scopes, exported_names, default_export);
        }
        "enum_declaration" if type_level => {
            extract_enum(node, source, file_id, builder, scopes, exported_names, default_export);
        }
        _ => {
            recurse_children!(node);
        }
    }
}

fn is_exported(name: &str, node: Node, exported_names: &std::collections::HashSet<String>, default_export: &Option<String>) -> bool {
    is_directly_exported(node) || exported_names.contains(name) || default_export.as_deref() == Some(name)
}

/// Records an [`ExportInfo`] for a declaration wrapped directly in an
/// `export` (or `export default`) statement. Named `export { x }` clauses
/// and `export default identifier;` are recorded separately in
/// [`collect_export_clauses`], which sees the alias these declare sites
/// don't.
fn push_direct_export(builder: &mut SymbolTableBuilder, node: Node, name: &str) {
    let Some(parent) = node.parent().filter(|p| p.kind() == "export_statement") else { return };
    let is_default = parent.children(&mut parent.walk()).any(|c| c.kind() == "default");
    let exported_name = if is_default { "default".to_string() } else { name.to_string() };
    let mut export = ExportInfo::new(name, exported_name);
    export.is_default = is_default;
    builder.add_export(export);
}

fn extract_function(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    exported_names: &std::collections::HashSet<String>,
    default_export: &Option<String>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let exported = is_exported(&name, node, exported_names, default_export);
    push_direct_export(builder, node, &name);
    // a block-scoped function declaration is never visible across files
    let in_block_scope = !matches!(scopes.current_scope().kind, ScopeKind::File);
    let scope = scopes.current_scope().clone();
    builder.add_symbol(
        name,
        SymbolKind::Function,
        location_of(name_node, file_id),
        scope,
        exported && !in_block_scope,
    );
}

fn extract_class(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    exported_names: &std::collections::HashSet<String>,
    default_export: &Option<String>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let exported = is_exported(&name, node, exported_names, default_export);
    push_direct_export(builder, node, &name);
    let scope = scopes.current_scope().clone();
    builder.add_symbol(name.clone(), SymbolKind::Class, location_of(name_node, file_id), scope, exported);

    scopes.push_scope(ScopeKind::Class, Some(name.clone()), node.start_byte(), node.end_byte());
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "method_definition" => extract_member(member, &name, "name", SymbolKind::Method, source, file_id, builder, scopes),
                "field_definition" | "public_field_definition" => {
                    extract_member(member, &name, "property", SymbolKind::Property, source, file_id, builder, scopes)
                }
                _ => {}
            }
        }
    }
    let _ = scopes.pop_scope();
}

fn extract_member(
    member: Node,
    owner: &str,
    name_field: &str,
    kind: SymbolKind,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
) {
    let Some(name_node) = member.child_by_field_name(name_field) else { return };
    let name = node_text(name_node, source).to_string();
    let is_private = name.starts_with('#');
    let scope = scopes.current_scope().clone();
    let id = builder.add_symbol(name.clone(), kind, location_of(name_node, file_id), scope, !is_private);
    if let Some(symbol) = builder.symbol_mut(id) {
        symbol.fully_qualified_name = Some(format!("{owner}.{name}"));
    }
}

fn extract_variable_declaration(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    exported_names: &std::collections::HashSet<String>,
    default_export: &Option<String>,
) {
    let is_const = source.get(node.byte_range()).is_some_and(|t| t.starts_with("const"));
    let in_block_scope = !matches!(scopes.current_scope().kind, ScopeKind::File);

    let mut cursor = node.walk();
    for declarator in node.children(&mut cursor).filter(|n| n.kind() == "variable_declarator") {
        let Some(name_node) = declarator.child_by_field_name("name") else { continue };
        if name_node.kind() != "identifier" {
            continue;
        }
        let name = node_text(name_node, source).to_string();
        let is_arrow = declarator
            .child_by_field_name("value")
            .is_some_and(|v| v.kind() == "arrow_function" || v.kind() == "function_expression");
        let kind = if is_arrow {
            SymbolKind::Function
        } else if is_const {
            SymbolKind::Constant
        } else {
            SymbolKind::Variable
        };
        let exported = is_exported(&name, node, exported_names, default_export) && !in_block_scope;
        if !in_block_scope {
            push_direct_export(builder, node, &name);
        }
        let scope = scopes.current_scope().clone();
        builder.add_symbol(name, kind, location_of(name_node, file_id), scope, exported);
    }
}

fn extract_interface(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    exported_names: &std::collections::HashSet<String>,
    default_export: &Option<String>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let exported = is_exported(&name, node, exported_names, default_export);
    push_direct_export(builder, node, &name);
    let scope = scopes.current_scope().clone();
    builder.add_symbol(name.clone(), SymbolKind::Interface, location_of(name_node, file_id), scope, exported);

    scopes.push_scope(ScopeKind::Class, Some(name.clone()), node.start_byte(), node.end_byte());
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            if member.kind() == "method_signature" || member.kind() == "property_signature" {
                let kind = if member.kind() == "method_signature" { SymbolKind::Method } else { SymbolKind::Property };
                extract_member(member, &name, "name", kind, source, file_id, builder, scopes);
            }
        }
    }
    let _ = scopes.pop_scope();
}

fn extract_type_alias(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    exported_names: &std::collections::HashSet<String>,
    default_export: &Option<String>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let exported = is_exported(&name, node, exported_names, default_export);
    push_direct_export(builder, node, &name);
    let scope = scopes.current_scope().clone();
    builder.add_symbol(name, SymbolKind::Type, location_of(name_node, file_id), scope, exported);
}

fn extract_enum(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    exported_names: &std::collections::HashSet<String>,
    default_export: &Option<String>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let exported = is_exported(&name, node, exported_names, default_export);
    push_direct_export(builder, node, &name);
    let scope = scopes.current_scope().clone();
    builder.add_symbol(name.clone(), SymbolKind::Enum, location_of(name_node, file_id), scope, exported);

    scopes.push_scope(ScopeKind::Class, Some(name.clone()), node.start_byte(), node.end_byte());
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor).filter(|n| n.kind() == "property_identifier" || n.kind() == "enum_assignment") {
            let name_node = if member.kind() == "enum_assignment" {
                member.child_by_field_name("name")
            } else {
                Some(member)
            };
            if let Some(name_node) = name_node {
                let member_name = node_text(name_node, source).to_string();
                let scope = scopes.current_scope().clone();
                let id = builder.add_symbol(member_name.clone(), SymbolKind::EnumMember, location_of(name_node, file_id), scope, true);
                if let Some(symbol) = builder.symbol_mut(id) {
                    symbol.fully_qualified_name = Some(format!("{name}.{member_name}"));
                }
            }
        }
    }
    let _ = scopes.pop_scope();
}

fn extract_import(node: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let Some(source_node) = node.child_by_field_name("source") else { return };
    let import_path = unquote(node_text(source_node, source)).to_string();
    let location = location_of(node, file_id);

    let Some(clause) = node.children(&mut node.walk()).find(|c| c.kind() == "import_clause") else {
        builder.add_import(ImportInfo::new(location, import_path));
        return;
    };

    let mut default_name = None;
    let mut named = Vec::new();
    let mut namespace_name = None;

    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        match child.kind() {
            "identifier" => default_name = Some(node_text(child, source).to_string()),
            "named_imports" => {
                let mut nc = child.walk();
                for specifier in child.children(&mut nc).filter(|n| n.kind() == "import_specifier") {
                    let local = specifier
                        .child_by_field_name("alias")
                        .or_else(|| specifier.child_by_field_name("name"))
                        .map(|n| node_text(n, source).to_string());
                    if let Some(local) = local {
                        named.push(local);
                    }
                }
            }
            "namespace_import" => {
                let mut nc = child.walk();
                if let Some(id) = child.children(&mut nc).find(|n| n.kind() == "identifier") {
                    namespace_name = Some(node_text(id, source).to_string());
                }
            }
            _ => {}
        }
    }

    let mut info = ImportInfo::new(location, import_path);
    if let Some(ns) = namespace_name {
        info.is_namespace = true;
        info.alias = Some(ns);
    } else if let Some(default) = default_name {
        info.is_default = true;
        info.alias = Some(default.clone());
        info.imported_names = std::iter::once(default).chain(named).collect();
    } else {
        info.imported_names = named;
    }
    builder.add_import(info);
}

fn extract_reexport(node: Node, source_node: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let import_path = unquote(node_text(source_node, source)).to_string();
    let text = node_text(node, source);
    let mut info = ImportInfo::new(location_of(node, file_id), import_path.clone());
    info.is_namespace = text.contains('*');
    builder.add_import(info);
    builder.add_export(ExportInfo {
        local_name: String::new(),
        exported_name: String::new(),
        is_default: false,
        is_re_export: true,
        source_path: Some(import_path),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> FileId {
        FileId::new(1).unwrap()
    }

    #[test]
    fn default_and_named_imports() {
        let source = r#"
import React from 'react';
import { useState, useEffect as useEff } from 'react';
import * as utils from './utils';
"#;
        let table = extract(file(), source, Path::new("x.js"), Language::JavaScript, false).unwrap();
        assert_eq!(table.imports.len(), 3);
        assert!(table.imports[0].is_default);
        assert_eq!(table.imports[0].alias.as_deref(), Some("React"));
        assert_eq!(table.imports[0].imported_names, vec!["React"]);
        assert_eq!(table.imports[1].imported_names, vec!["useState", "useEff"]);
        assert!(table.imports[2].is_namespace);
    }

    #[test]
    fn export_function_is_exported() {
        let source = "export function add(a, b) { return a + b; }\nfunction helper() {}";
        let table = extract(file(), source, Path::new("x.js"), Language::JavaScript, false).unwrap();
        assert!(table.exported_symbol_named("add").is_some());
        assert!(table.symbols_named("helper").next().unwrap().is_exported == false);
    }

    #[test]
    fn class_methods_use_owner_dot_member() {
        let source = "class Server { listen() {} }";
        let table = extract(file(), source, Path::new("x.js"), Language::JavaScript, false).unwrap();
        let method = table.symbols_named("listen").next().unwrap();
        assert_eq!(method.fully_qualified_name.as_deref(), Some("Server.listen"));
    }

    #[test]
    fn typescript_interface_and_type_alias() {
        let source = "export interface Shape { area(): number; }\nexport type Id = string;";
        let table = extract(file(), source, Path::new("x.ts"), Language::TypeScript, true).unwrap();
        assert!(table.exported_symbol_named("Shape").is_some());
        assert!(table.exported_symbol_named("Id").is_some());
        assert_eq!(table.symbol(table.exported_symbol_named("Id").unwrap().id).unwrap().kind, SymbolKind::Type);
    }

    #[test]
    fn named_export_clause_marks_already_declared_symbol() {
        let source = "function Card() {}\nexport { Card };";
        let table = extract(file(), source, Path::new("x.js"), Language::JavaScript, false).unwrap();
        assert!(table.exported_symbol_named("Card").is_some());
    }

    #[test]
    fn exports_list_covers_direct_named_and_default_forms() {
        let direct = extract(file(), "export function add(a, b) { return a + b; }", Path::new("x.js"), Language::JavaScript, false).unwrap();
        assert!(direct.exports.iter().any(|e| e.local_name == "add" && e.exported_name == "add" && !e.is_default));

        let named = extract(
            file(),
            "function formatDate(d) { return d; }\nexport { formatDate as format };",
            Path::new("x.js"),
            Language::JavaScript,
            false,
        )
        .unwrap();
        assert!(named.exports.iter().any(|e| e.local_name == "formatDate" && e.exported_name == "format"));

        let default = extract(file(), "function App() {}\nexport default App;", Path::new("x.js"), Language::JavaScript, false).unwrap();
        assert!(default.exports.iter().any(|e| e.local_name == "App" && e.is_default));
    }
}
