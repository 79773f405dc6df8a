//! C# extractor. Visibility: `public`/`internal` at declaration →
//! exported; `private`/`protected` → not; default top-level type
//! visibility is `internal` (spec §4.2).

use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::error::{IndexError, IndexResult};
use crate::parsing::common::{check_recursion_depth, location_of, node_text};
use crate::parsing::{Language, LanguageExtractor};
use crate::symbol::{ImportInfo, ScopeManager, SymbolTable, SymbolTableBuilder};
use crate::types::{FileId, ScopeKind, SymbolKind};

pub struct CSharpExtractor;

impl LanguageExtractor for CSharpExtractor {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn extract_symbols(&self, file_id: FileId, source: &str, path: &Path) -> IndexResult<SymbolTable> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .expect("tree-sitter-c-sharp grammar is ABI compatible");
        let tree = parser.parse(source, None).ok_or_else(|| IndexError::ParseFailure {
            path: path.to_path_buf(),
            reason: "tree-sitter-c-sharp returned no tree".into(),
        })?;

        let mut builder = SymbolTableBuilder::new(file_id, Language::CSharp);
        let mut scopes = ScopeManager::new();
        walk(tree.root_node(), source, file_id, &mut builder, &mut scopes, None, 0);
        Ok(builder.build())
    }
}

/// `public`/`internal` → exported, `private`/`protected` → not, default
/// (no modifier) → `internal` i.e. exported at namespace/type level.
fn visibility_of(node: Node, source: &str) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "modifier" {
            match node_text(child, source) {
                "public" | "internal" => return true,
                "private" | "protected" => return false,
                _ => {}
            }
        }
    }
    true
}

fn owner_name(owner: Option<&str>, name: &str) -> Option<String> {
    owner.map(|o| format!("{o}.{name}"))
}

#[allow(clippy::too_many_arguments)]
fn walk(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    owner: Option<String>,
    depth: usize,
) {
    if !check_recursion_depth(depth, node) {
        return;
    }

    match node.kind() {
        "using_directive" | "using_static_directive" | "global_using_directive" => {
            extract_using(node, source, file_id, builder);
        }
        "namespace_declaration" | "file_scoped_namespace_declaration" => {
            let Some(name_node) = node.child_by_field_name("name") else { return };
            let name = node_text(name_node, source).to_string();
            let scope = scopes.current_scope().clone();
            builder.add_symbol(name.clone(), SymbolKind::Namespace, location_of(name_node, file_id), scope, true);
            scopes.push_scope(ScopeKind::Namespace, Some(name), node.start_byte(), node.end_byte());
            recurse(node, source, file_id, builder, scopes, None, depth);
            let _ = scopes.pop_scope();
        }
        "class_declaration" | "struct_declaration" | "record_declaration" | "record_struct_declaration" => {
            let kind = match node.kind() {
                "struct_declaration" => SymbolKind::Struct,
                _ => SymbolKind::Class,
            };
            declare_type(node, source, file_id, builder, scopes, kind, depth);
        }
        "interface_declaration" => {
            declare_type(node, source, file_id, builder, scopes, SymbolKind::Interface, depth);
        }
        "enum_declaration" => {
            let Some(name_node) = node.child_by_field_name("name") else { return };
            let name = node_text(name_node, source).to_string();
            let exported = visibility_of(node, source);
            let scope = scopes.current_scope().clone();
            builder.add_symbol(name.clone(), SymbolKind::Enum, location_of(name_node, file_id), scope, exported);

            scopes.push_scope(ScopeKind::Class, Some(name.clone()), node.start_byte(), node.end_byte());
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for member in body.children(&mut cursor).filter(|n| n.kind() == "enum_member_declaration") {
                    if let Some(member_name) = member.child_by_field_name("name") {
                        let member_str = node_text(member_name, source).to_string();
                        let scope = scopes.current_scope().clone();
                        let id = builder.add_symbol(member_str.clone(), SymbolKind::EnumMember, location_of(member_name, file_id), scope, exported);
                        if let Some(symbol) = builder.symbol_mut(id) {
                            symbol.fully_qualified_name = owner_name(Some(&name), &member_str);
                        }
                    }
                }
            }
            let _ = scopes.pop_scope();
        }
        "method_declaration" | "constructor_declaration" => {
            let Some(name_node) = node.child_by_field_name("name") else { return };
            let name = node_text(name_node, source).to_string();
            let exported = visibility_of(node, source);
            let scope = scopes.current_scope().clone();
            let id = builder.add_symbol(name.clone(), SymbolKind::Method, location_of(name_node, file_id), scope, exported);
            if let Some(symbol) = builder.symbol_mut(id) {
                symbol.fully_qualified_name = owner_name(owner.as_deref(), &name);
            }
        }
        "property_declaration" | "indexer_declaration" => {
            let Some(name_node) = node.child_by_field_name("name") else { return };
            let name = node_text(name_node, source).to_string();
            let exported = visibility_of(node, source);
            let scope = scopes.current_scope().clone();
            let id = builder.add_symbol(name.clone(), SymbolKind::Property, location_of(name_node, file_id), scope, exported);
            if let Some(symbol) = builder.symbol_mut(id) {
                symbol.fully_qualified_name = owner_name(owner.as_deref(), &name);
            }
        }
        "field_declaration" => {
            let exported = visibility_of(node, source);
            if let Some(declaration) = node.child_by_field_name("declaration") {
                let mut cursor = declaration.walk();
                for declarator in declaration.children(&mut cursor).filter(|n| n.kind() == "variable_declarator") {
                    if let Some(name_node) = declarator.child_by_field_name("name") {
                        let name = node_text(name_node, source).to_string();
                        let scope = scopes.current_scope().clone();
                        let id = builder.add_symbol(name.clone(), SymbolKind::Property, location_of(name_node, file_id), scope, exported);
                        if let Some(symbol) = builder.symbol_mut(id) {
                            symbol.fully_qualified_name = owner_name(owner.as_deref(), &name);
                        }
                    }
                }
            }
        }
        "delegate_declaration" => {
            let Some(name_node) = node.child_by_field_name("name") else { return };
            let name = node_text(name_node, source).to_string();
            let exported = visibility_of(node, source);
            let scope = scopes.current_scope().clone();
            builder.add_symbol(name, SymbolKind::Type, location_of(name_node, file_id), scope, exported);
        }
        _ => {
            recurse(node, source, file_id, builder, scopes, owner, depth);
        }
    }
}

fn declare_type(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    kind: SymbolKind,
    depth: usize,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let exported = visibility_of(node, source);
    let scope = scopes.current_scope().clone();
    builder.add_symbol(name.clone(), kind, location_of(name_node, file_id), scope, exported);

    scopes.push_scope(ScopeKind::Class, Some(name.clone()), node.start_byte(), node.end_byte());
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            walk(child, source, file_id, builder, scopes, Some(name.clone()), depth + 1);
        }
    }
    let _ = scopes.pop_scope();
}

fn recurse(
    node: Node,
    source: &str,
    file_id: FileId,
    builder: &mut SymbolTableBuilder,
    scopes: &mut ScopeManager,
    owner: Option<String>,
    depth: usize,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, file_id, builder, scopes, owner.clone(), depth + 1);
    }
}

fn extract_using(node: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let mut alias = None;
    let mut path = None;
    let mut found_equals = false;
    let mut is_global = false;
    let mut is_static = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "global" => is_global = true,
            "static" => is_static = true,
            "=" => {
                found_equals = true;
                if path.is_some() && alias.is_none() {
                    alias = path.take();
                }
            }
            "identifier" if path.is_none() => path = Some(node_text(child, source).to_string()),
            "qualified_name" if found_equals || path.is_none() => path = Some(node_text(child, source).to_string()),
            _ => {}
        }
    }

    let Some(import_path) = path else { return };
    let final_path = if is_global {
        format!("global::{import_path}")
    } else if is_static {
        format!("static::{import_path}")
    } else {
        import_path
    };

    let mut info = ImportInfo::new(location_of(node, file_id), final_path);
    info.alias = alias;
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
        let ext = CSharpExtractor;
        assert!(ext.can_handle(Path::new("Program.cs")));
        assert!(!ext.can_handle(Path::new("Program.java")));
    }

    #[test]
    fn public_class_and_private_method() {
        let source = r#"
namespace App {
    public class Server {
        private void Listen() {}
        public string Name;
    }
}
"#;
        let table = CSharpExtractor.extract_symbols(file(), source, Path::new("Program.cs")).unwrap();
        assert!(table.exported_symbol_named("Server").is_some());
        let method = table.symbols_named("Listen").next().unwrap();
        assert!(!method.is_exported);
        assert_eq!(method.fully_qualified_name.as_deref(), Some("Server.Listen"));
    }

    #[test]
    fn using_directive_with_alias() {
        let source = "using System;\nusing Json = Newtonsoft.Json;\n";
        let table = CSharpExtractor.extract_symbols(file(), source, Path::new("Program.cs")).unwrap();
        assert_eq!(table.imports.len(), 2);
        assert_eq!(table.imports[1].alias.as_deref(), Some("Json"));
    }
}
