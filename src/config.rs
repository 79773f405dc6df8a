//! Layered engine configuration.
//!
//! Layers, lowest to highest priority: built-in defaults, an optional
//! `codelink.toml` file, then `SYMLINK_`-prefixed environment variables
//! with `__` separating nested keys (e.g.
//! `SYMLINK_INCREMENTAL__CASCADE_DEPTH_LIMIT=3`).

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::error::{IndexError, IndexResult};
use crate::parsing::Language;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_enabled_languages")]
    pub enabled_languages: HashSet<Language>,

    /// Per-language extension overrides; empty means "use the built-in table".
    #[serde(default)]
    pub language_extensions: HashMap<Language, Vec<String>>,

    #[serde(default)]
    pub incremental: IncrementalConfig,

    /// Extra module names treated as stdlib/builtin per language, layered on
    /// top of the built-in tables in each resolver.
    #[serde(default)]
    pub stdlib_overrides: HashMap<Language, Vec<String>>,

    /// Advisory only: the tree-sitter bindings used here do not enforce a
    /// parse timeout, this is recorded for parity with the ambient config
    /// surface and consumed by external wrappers that add one.
    #[serde(default)]
    pub parse_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IncrementalConfig {
    /// `None` = unbounded (cascade still terminates via a visited-set).
    #[serde(default)]
    pub cascade_depth_limit: Option<u32>,
}

fn default_enabled_languages() -> HashSet<Language> {
    Language::ALL.iter().copied().collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled_languages: default_enabled_languages(),
            language_extensions: HashMap::new(),
            incremental: IncrementalConfig::default(),
            stdlib_overrides: HashMap::new(),
            parse_timeout: None,
        }
    }
}

impl EngineConfig {
    /// Load defaults, then an optional TOML file at `path`, then environment
    /// overrides. Missing `path` is not an error.
    pub fn load(path: Option<&std::path::Path>) -> IndexResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));

        if let Some(path) = path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("SYMLINK_").split("__"));

        figment
            .extract()
            .map_err(|e| IndexError::Config { reason: e.to_string() })
    }

    pub fn is_enabled(&self, language: Language) -> bool {
        self.enabled_languages.contains(&language)
    }

    pub fn extensions_for(&self, language: Language) -> Vec<String> {
        self.language_extensions
            .get(&language)
            .cloned()
            .unwrap_or_else(|| language.default_extensions().iter().map(|s| s.to_string()).collect())
    }
}

/// Directory conventions an external crawler/collaborator may want; kept
/// here only as a named constant, not acted on by the engine itself.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "codelink.toml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_all_six_languages() {
        let config = EngineConfig::default();
        assert_eq!(config.enabled_languages.len(), 6);
        assert!(config.is_enabled(Language::Go));
        assert!(config.is_enabled(Language::CSharp));
    }

    #[test]
    fn load_with_missing_file_falls_back_to_defaults() {
        let config = EngineConfig::load(Some(std::path::Path::new("/nonexistent/codelink.toml")))
            .expect("defaults must always load");
        assert!(config.is_enabled(Language::Python));
    }

    #[test]
    fn extensions_for_uses_builtin_table_when_unset() {
        let config = EngineConfig::default();
        assert!(config.extensions_for(Language::Go).contains(&"go".to_string()));
    }
}
