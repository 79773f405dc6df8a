//! PHP extractor. Visibility follows member modifiers; class/function/
//! trait/interface/enum at namespace level are exported (spec §4.2).
//!
//! Also implements the WordPress framework-aware lift to synthetic
//! `Event`-kind symbols: hook registrations and the plugin/template
//! header comment blocks.

use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::error::{IndexError, IndexResult};
use crate::parsing::common::{check_recursion_depth, location_of, node_text, unquote};
use crate::parsing::{Language, LanguageExtractor};
use crate::symbol::{ImportInfo, ScopeManager, SymbolTable, SymbolTableBuilder};
use crate::types::{FileId, ScopeKind, SymbolKind};

pub struct PhpExtractor;

impl LanguageExtractor for PhpExtractor {
    fn language(&self) -> Language {
        Language::Php
    }

    fn extract_symbols(&self, file_id: FileId, source: &str, path: &Path) -> IndexResult<SymbolTable> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .expect("tree-sitter-php grammar is ABI compatible");
        let tree = parser.parse(source, None).ok_or_else(|| IndexError::ParseFailure {
            path: path.to_path_buf(),
            reason: "tree-sitter-php returned no tree".into(),
        })?;

        let mut builder = SymbolTableBuilder::new(file_id, Language::Php);
        let mut scopes = ScopeManager::new();
        extract_plugin_header(source, file_id, &mut builder);
        walk(tree.root_node(), source, file_id, &mut builder, &mut scopes, None, 0);
        Ok(builder.build())
    }
}

fn modifier_visibility(node: Node, source: &str) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "visibility_modifier" => {
                return node_text(child, source) == "public";
            }
            _ => continue,
        }
    }
    true
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
        "namespace_use_declaration" => extract_use(node, source, file_id, builder),
        "include_expression" | "include_once_expression" | "require_expression" | "require_once_expression" => {
            extract_include(node, source, file_id, builder);
        }
        "namespace_definition" => {
            let name = node.child_by_field_name("name").map(|n| node_text(n, source).to_string());
            scopes.push_scope(ScopeKind::Namespace, name, node.start_byte(), node.end_byte());
            recurse(node, source, file_id, builder, scopes, owner, depth);
            let _ = scopes.pop_scope();
        }
        "class_declaration" | "interface_declaration" | "trait_declaration" => {
            let kind = match node.kind() {
                "interface_declaration" => SymbolKind::Interface,
                "trait_declaration" => SymbolKind::Trait,
                _ => SymbolKind::Class,
            };
            declare_type(node, source, file_id, builder, scopes, kind, depth);
        }
        "enum_declaration" => {
            let Some(name_node) = node.child_by_field_name("name") else { return };
            let name = node_text(name_node, source).to_string();
            let scope = scopes.current_scope().clone();
            builder.add_symbol(name.clone(), SymbolKind::Enum, location_of(name_node, file_id), scope, true);

            scopes.push_scope(ScopeKind::Class, Some(name.clone()), node.start_byte(), node.end_byte());
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for case in body.children(&mut cursor).filter(|n| n.kind() == "enum_case") {
                    if let Some(case_name) = case.child_by_field_name("name") {
                        let case_str = node_text(case_name, source).to_string();
                        let scope = scopes.current_scope().clone();
                        let id = builder.add_symbol(case_str.clone(), SymbolKind::EnumMember, location_of(case_name, file_id), scope, true);
                        if let Some(symbol) = builder.symbol_mut(id) {
                            symbol.fully_qualified_name = Some(format!("{name}.{case_str}"));
                        }
                    }
                }
            }
            let _ = scopes.pop_scope();
        }
        "function_definition" => {
            let Some(name_node) = node.child_by_field_name("name") else { return };
            let name = node_text(name_node, source).to_string();
            let in_namespace_scope = matches!(scopes.current_scope().kind, ScopeKind::File | ScopeKind::Namespace);
            let scope = scopes.current_scope().clone();
            builder.add_symbol(name, SymbolKind::Function, location_of(name_node, file_id), scope, in_namespace_scope);
            recurse(node, source, file_id, builder, scopes, owner, depth);
        }
        "method_declaration" => {
            let Some(name_node) = node.child_by_field_name("name") else { return };
            let name = node_text(name_node, source).to_string();
            let exported = modifier_visibility(node, source);
            let scope = scopes.current_scope().clone();
            let id = builder.add_symbol(name.clone(), SymbolKind::Method, location_of(name_node, file_id), scope, exported);
            if let (Some(symbol), Some(owner)) = (builder.symbol_mut(id), owner.as_deref()) {
                symbol.fully_qualified_name = Some(format!("{owner}.{name}"));
            }
        }
        "property_declaration" => {
            let exported = modifier_visibility(node, source);
            let mut cursor = node.walk();
            for element in node.children(&mut cursor).filter(|n| n.kind() == "property_element") {
                if let Some(name_node) = element.child_by_field_name("name").or_else(|| element.child(0)) {
                    let name = node_text(name_node, source).trim_start_matches('$').to_string();
                    let scope = scopes.current_scope().clone();
                    let id = builder.add_symbol(name.clone(), SymbolKind::Property, location_of(name_node, file_id), scope, exported);
                    if let (Some(symbol), Some(owner)) = (builder.symbol_mut(id), owner.as_deref()) {
                        symbol.fully_qualified_name = Some(format!("{owner}.{name}"));
                    }
                }
            }
        }
        "function_call_expression" => {
            extract_wordpress_hook(node, source, file_id, builder);
            recurse(node, source, file_id, builder, scopes, owner, depth);
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
    let scope = scopes.current_scope().clone();
    builder.add_symbol(name.clone(), kind, location_of(name_node, file_id), scope, true);

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

fn extract_use(node: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let mut cursor = node.walk();
    for clause in node.children(&mut cursor).filter(|n| n.kind() == "namespace_use_clause") {
        let Some(name_node) = clause.child_by_field_name("name") else { continue };
        let mut info = ImportInfo::new(location_of(node, file_id), node_text(name_node, source).to_string());
        if let Some(alias_node) = clause.child_by_field_name("alias") {
            info.alias = Some(node_text(alias_node, source).to_string());
        }
        builder.add_import(info);
    }

    // `use A\B\{C, D as E};` groups.
    let mut group_cursor = node.walk();
    for group in node.children(&mut group_cursor).filter(|n| n.kind() == "namespace_use_group") {
        let prefix = node
            .child_by_field_name("prefix")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_default();
        let mut gc = group.walk();
        for clause in group.children(&mut gc).filter(|n| n.kind() == "namespace_use_clause" || n.kind() == "namespace_use_group_clause") {
            let Some(name_node) = clause.child_by_field_name("name") else { continue };
            let full_path = format!("{prefix}{}", node_text(name_node, source));
            let mut info = ImportInfo::new(location_of(node, file_id), full_path);
            if let Some(alias_node) = clause.child_by_field_name("alias") {
                info.alias = Some(node_text(alias_node, source).to_string());
            }
            builder.add_import(info);
        }
    }
}

fn extract_include(node: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let Some(arg) = node.child(1) else { return };
    let path = unquote(node_text(arg, source)).to_string();
    builder.add_import(ImportInfo::new(location_of(node, file_id), path));
}

const WORDPRESS_HOOKS: &[(&str, &str)] = &[
    ("add_action", "action"),
    ("add_filter", "filter"),
    ("add_shortcode", "shortcode"),
];

fn extract_wordpress_hook(node: Node, source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let Some(function_node) = node.child_by_field_name("function") else { return };
    let callee = node_text(function_node, source);
    let Some(args) = node.child_by_field_name("arguments") else { return };
    let arg_texts: Vec<&str> = {
        let mut cursor = args.walk();
        args.children(&mut cursor)
            .filter(|n| n.kind() == "argument")
            .filter_map(|n| n.child(0))
            .map(|n| node_text(n, source))
            .collect()
    };
    if arg_texts.is_empty() {
        return;
    }

    if let Some((_, kind)) = WORDPRESS_HOOKS.iter().find(|(name, _)| *name == callee) {
        let hook = unquote(arg_texts[0]);
        let name = format!("hook:{kind}:{hook}");
        let id = builder.add_symbol(name, SymbolKind::Event, location_of(node, file_id), default_scope(), true);
        if let (Some(symbol), Some(callback)) = (builder.symbol_mut(id), arg_texts.get(1)) {
            symbol.r#type = Some((*kind).to_string());
            symbol.signature = Some((*callback).to_string());
        }
        return;
    }

    match callee {
        "register_rest_route" if arg_texts.len() >= 2 => {
            let ns = unquote(arg_texts[0]);
            let route = unquote(arg_texts[1]);
            let name = format!("hook:rest_route:{ns}{route}");
            let id = builder.add_symbol(name, SymbolKind::Event, location_of(node, file_id), default_scope(), true);
            if let Some(symbol) = builder.symbol_mut(id) {
                symbol.r#type = Some("rest_route".to_string());
            }
        }
        "register_block_type" => {
            let block_name = unquote(arg_texts[0]);
            let name = format!("block:{block_name}");
            let id = builder.add_symbol(name, SymbolKind::Event, location_of(node, file_id), default_scope(), true);
            if let Some(symbol) = builder.symbol_mut(id) {
                symbol.r#type = Some("block".to_string());
            }
        }
        "register_post_template" => {
            let template = unquote(arg_texts[0]);
            let name = format!("wp:template:{template}");
            let id = builder.add_symbol(name, SymbolKind::Event, location_of(node, file_id), default_scope(), true);
            if let Some(symbol) = builder.symbol_mut(id) {
                symbol.r#type = Some("template".to_string());
            }
        }
        _ => {}
    }
}

/// Synthetic hook/header symbols aren't lexically scoped; attach them to
/// a fresh file scope rather than threading the real one through.
fn default_scope() -> crate::symbol::Scope {
    ScopeManager::new().current_scope().clone()
}

/// WordPress plugin header: a top-of-file comment block with `Plugin
/// Name:`/`Version:`/other `Key: value` header lines.
fn extract_plugin_header(source: &str, file_id: FileId, builder: &mut SymbolTableBuilder) {
    let Some(comment_start) = source.find("/*") else { return };
    if source[..comment_start].trim() != "<?php" && !source[..comment_start].trim().is_empty() {
        return;
    }
    let Some(comment_end) = source[comment_start..].find("*/").map(|i| comment_start + i) else { return };
    let block = &source[comment_start..comment_end];

    let mut plugin_name = None;
    let mut version = None;
    let mut other_headers = Vec::new();
    for line in block.lines() {
        let line = line.trim_start_matches('*').trim();
        let Some((key, value)) = line.split_once(':') else { continue };
        let key = key.trim();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key {
            "Plugin Name" => plugin_name = Some(value.to_string()),
            "Version" => version = Some(value.to_string()),
            _ => other_headers.push(format!("{key}: {value}")),
        }
    }

    if let Some(name) = plugin_name {
        let symbol_name = format!("wp:plugin:{name}");
        let scope = default_scope();
        let location = crate::types::Location::new(file_id, comment_start, comment_end + 2, 0, 0);
        let id = builder.add_symbol(symbol_name, SymbolKind::Module, location, scope, true);
        if let Some(symbol) = builder.symbol_mut(id) {
            symbol.value = version;
            if !other_headers.is_empty() {
                symbol.signature = Some(other_headers.join("; "));
            }
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
    fn extension_recognized() {
        let ext = PhpExtractor;
        assert!(ext.can_handle(Path::new("index.php")));
        assert!(!ext.can_handle(Path::new("index.html")));
    }

    #[test]
    fn class_and_private_method_visibility() {
        let source = r#"<?php
class Widget {
    private function render() {}
    public $label;
}
"#;
        let table = PhpExtractor.extract_symbols(file(), source, Path::new("Widget.php")).unwrap();
        assert!(table.exported_symbol_named("Widget").is_some());
        let method = table.symbols_named("render").next().unwrap();
        assert!(!method.is_exported);
        assert_eq!(method.fully_qualified_name.as_deref(), Some("Widget.render"));
    }

    #[test]
    fn grouped_use_declaration() {
        let source = "<?php\nuse App\\Models\\{User, Post as BlogPost};\n";
        let table = PhpExtractor.extract_symbols(file(), source, Path::new("x.php")).unwrap();
        assert!(table.imports.iter().any(|i| i.import_path.ends_with("User")));
        assert!(table.imports.iter().any(|i| i.alias.as_deref() == Some("BlogPost")));
    }

    #[test]
    fn wordpress_action_hook_becomes_event_symbol() {
        let source = r#"<?php
add_action('init', 'my_plugin_init');
"#;
        let table = PhpExtractor.extract_symbols(file(), source, Path::new("plugin.php")).unwrap();
        let hook = table.symbols_named("hook:action:init").next().unwrap();
        assert_eq!(hook.kind, SymbolKind::Event);
        assert_eq!(hook.signature.as_deref(), Some("'my_plugin_init'"));
    }

    #[test]
    fn plugin_header_emits_module_symbol() {
        let source = "<?php\n/*\n * Plugin Name: Example Plugin\n * Version: 1.2.0\n * Author: Jane\n */\n";
        let table = PhpExtractor.extract_symbols(file(), source, Path::new("plugin.php")).unwrap();
        let plugin = table.symbols_named("wp:plugin:Example Plugin").next().unwrap();
        assert_eq!(plugin.value.as_deref(), Some("1.2.0"));
        assert!(plugin.signature.as_deref().unwrap().contains("Author"));
    }
}
