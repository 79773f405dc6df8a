//! Core integer identifiers shared across the engine.
//!
//! FileIds and LocalSymbolIds are kept as small integers rather than
//! interned strings so tables stay hot and comparisons are cheap; paths
//! live once in the file registry's reverse map (see [`crate::registry`]).

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Opaque, stable identifier for a file. `0` is reserved ("unknown") by
/// construction: the inner value is a `NonZeroU32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(NonZeroU32);

impl FileId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// Per-file, monotonically increasing symbol identifier starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalSymbolId(NonZeroU32);

impl LocalSymbolId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(self) -> u32 {
        self.0.get()
    }
}

/// `(FileId, LocalSymbolId)`, globally unique within the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompositeSymbolId {
    pub file: FileId,
    pub local: LocalSymbolId,
}

impl CompositeSymbolId {
    pub fn new(file: FileId, local: LocalSymbolId) -> Self {
        Self { file, local }
    }
}

impl std::fmt::Display for CompositeSymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.local.value())
    }
}

/// Allocates [`LocalSymbolId`]s in increasing order for a single file.
#[derive(Debug, Default)]
pub struct SymbolCounter(u32);

impl SymbolCounter {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn next(&mut self) -> LocalSymbolId {
        self.0 += 1;
        LocalSymbolId::new(self.0).expect("counter starts at 1 and only increases")
    }
}

/// Byte and line/column span of a declaration's identifier (not its body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: FileId,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: u32,
    pub start_col: u32,
}

impl Location {
    pub fn new(
        file: FileId,
        start_byte: usize,
        end_byte: usize,
        start_line: u32,
        start_col: u32,
    ) -> Self {
        Self {
            file,
            start_byte,
            end_byte,
            start_line,
            start_col,
        }
    }
}

/// Tagged enumeration of everything an extractor can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Trait,
    Enum,
    EnumMember,
    Type,
    Property,
    Attribute,
    Constant,
    Variable,
    Parameter,
    Namespace,
    Module,
    /// Framework hook/registration (PHP WordPress callbacks, plugin/template headers).
    Event,
}

/// Lexical scope kinds; scopes nest strictly and the file scope always exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    File,
    Namespace,
    Class,
    Function,
    Method,
    Block,
}
