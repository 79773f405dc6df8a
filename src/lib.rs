//! `codelink`: a multi-language source symbol indexer and cross-file
//! linker. Extracts declarations from Go, JavaScript, TypeScript, Python,
//! PHP, and C# source via tree-sitter, resolves each file's imports against
//! the project and the host language's module system, and links imported
//! names to the symbols that define them.
//!
//! The engine is organized around six components: a per-file symbol table
//! builder ([`symbol`]), per-language extractors dispatched by a registry
//! ([`parsing`]), per-language module resolvers ([`resolution`]), a file
//! registry assigning stable IDs ([`registry`]), a linker that binds
//! imports to definitions ([`linker`]), and an incremental engine that
//! re-links on file change ([`incremental`]).

pub mod config;
pub mod error;
pub mod incremental;
pub mod linker;
pub mod parsing;
pub mod registry;
pub mod resolution;
pub mod symbol;
pub mod types;
