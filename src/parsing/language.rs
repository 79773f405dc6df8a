//! Language enumeration and extension-based detection.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Go,
    JavaScript,
    TypeScript,
    Python,
    Php,
    CSharp,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Go,
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Php,
        Language::CSharp,
    ];

    /// Built-in extension table, case-sensitive per spec §4.2.
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Go => &["go"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx", "d.ts"],
            Language::Python => &["py", "pyw", "pyi", "pyx"],
            Language::Php => &["php", "phtml", "php3", "phar"],
            Language::CSharp => &["cs"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Php => "php",
            Language::CSharp => "csharp",
        }
    }

    /// Detect from a path's extension(s), honoring the compound `.d.ts` case.
    pub fn from_path(path: &Path) -> Option<Language> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".d.ts") {
            return Some(Language::TypeScript);
        }
        let ext = path.extension()?.to_str()?;
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.default_extensions().contains(&ext))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn detects_by_extension() {
        assert_eq!(Language::from_path(Path::new("main.go")), Some(Language::Go));
        assert_eq!(Language::from_path(Path::new("a/b.tsx")), Some(Language::TypeScript));
        assert_eq!(Language::from_path(Path::new("types.d.ts")), Some(Language::TypeScript));
        assert_eq!(Language::from_path(Path::new("app.mjs")), Some(Language::JavaScript));
        assert_eq!(Language::from_path(Path::new("x.phar")), Some(Language::Php));
        assert_eq!(Language::from_path(Path::new("Program.cs")), Some(Language::CSharp));
        assert_eq!(Language::from_path(Path::new("README.md")), None);
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        assert_eq!(Language::from_path(Path::new("main.GO")), None);
    }
}
