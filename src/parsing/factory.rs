//! Dispatch table keyed by language — the "capability, not inheritance"
//! model from spec §9.

use std::collections::HashMap;
use std::path::Path;

use super::{
    csharp::CSharpExtractor, go::GoExtractor, javascript::JavaScriptExtractor,
    php::PhpExtractor, python::PythonExtractor, typescript::TypeScriptExtractor, Language,
    LanguageExtractor,
};

/// Holds one boxed extractor per registered language and dispatches by
/// extension. Registered once at engine construction (spec §6).
pub struct ExtractorRegistry {
    extractors: HashMap<Language, Box<dyn LanguageExtractor>>,
}

impl ExtractorRegistry {
    /// All six extractors named in spec §4.2.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            extractors: HashMap::new(),
        };
        registry.register(Box::new(GoExtractor));
        registry.register(Box::new(JavaScriptExtractor));
        registry.register(Box::new(TypeScriptExtractor));
        registry.register(Box::new(PythonExtractor));
        registry.register(Box::new(PhpExtractor));
        registry.register(Box::new(CSharpExtractor));
        registry
    }

    pub fn register(&mut self, extractor: Box<dyn LanguageExtractor>) {
        self.extractors.insert(extractor.language(), extractor);
    }

    pub fn for_path(&self, path: &Path) -> Option<&dyn LanguageExtractor> {
        let language = Language::from_path(path)?;
        self.extractors.get(&language).map(|b| b.as_ref())
    }

    pub fn for_language(&self, language: Language) -> Option<&dyn LanguageExtractor> {
        self.extractors.get(&language).map(|b| b.as_ref())
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.extractors.keys().copied()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_declared_extension_round_trips_through_can_handle() {
        let registry = ExtractorRegistry::with_defaults();
        for language in Language::ALL {
            let extractor = registry.for_language(language).expect("registered");
            for ext in language.default_extensions() {
                let path = Path::new("x").with_extension(ext);
                assert!(
                    extractor.can_handle(&path),
                    "{language} extractor should handle .{ext}"
                );
            }
        }
    }

    #[test]
    fn unknown_extension_has_no_extractor() {
        let registry = ExtractorRegistry::with_defaults();
        assert!(registry.for_path(Path::new("README.md")).is_none());
    }
}
