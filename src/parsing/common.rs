//! Helpers shared by every per-language extractor.

use tree_sitter::Node;

use crate::types::{FileId, Location};

/// Maximum AST recursion depth. Default stack size is 2MB; ~4KB/frame gives
/// headroom well short of overflow even for pathologically nested fixtures.
pub const MAX_AST_DEPTH: usize = 500;

/// Returns `false` (stop recursing) once `depth` exceeds [`MAX_AST_DEPTH`].
pub fn check_recursion_depth(depth: usize, node: Node) -> bool {
    if depth > MAX_AST_DEPTH {
        tracing::warn!(
            kind = node.kind(),
            depth,
            "AST recursion depth exceeded, truncating traversal"
        );
        return false;
    }
    true
}

/// The UTF-8 text spanned by `node`, or `""` on any decode failure (malformed
/// byte ranges should never happen for a tree produced from `source`, but we
/// never panic on attacker-controlled input).
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Builds a [`Location`] spanning `node`'s start, using tree-sitter's
/// 0-indexed line/column (stored as-is; callers treat line 0 as line one).
pub fn location_of(node: Node, file: FileId) -> Location {
    let start = node.start_position();
    Location::new(file, node.start_byte(), node.end_byte(), start.row as u32, start.column as u32)
}

/// Strips a single layer of matching quote characters, if present.
pub fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'' || first == b'`') && first == last {
            return &s[1..s.len() - 1];
        }
    }
    s
}
