//! Command-line front-end (C8): scaffolding around the engine for manual
//! indexing and inspection, not a query layer of its own. Each invocation
//! walks a directory, indexes every recognized source file into a fresh
//! [`codelink::incremental::IncrementalEngine`], links it, then answers the
//! one question the subcommand asked. Nothing persists between runs.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use walkdir::WalkDir;

use codelink::config::{EngineConfig, DEFAULT_CONFIG_FILE_NAME};
use codelink::incremental::IncrementalEngine;
use codelink::linker::LinkerEngine;
use codelink::parsing::Language;
use codelink::resolution::StdFileService;
use codelink::types::CompositeSymbolId;

#[derive(Parser)]
#[command(name = "codelink")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-language source symbol indexer and cross-file linker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a directory and print engine statistics
    Index {
        /// Directory to walk and index
        path: PathBuf,
    },

    /// Index a directory, then print a symbol's definition and references
    Symbol {
        /// Directory to walk and index
        path: PathBuf,
        /// Symbol name to look up
        name: String,
    },

    /// Index a directory, then print one file's resolved imports
    Imports {
        /// Directory to walk and index
        path: PathBuf,
        /// File whose imports to print, relative to `path`
        file: PathBuf,
    },

    /// Show the effective configuration (defaults + codelink.toml + env)
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::load(Some(Path::new(DEFAULT_CONFIG_FILE_NAME))).unwrap_or_else(|e| {
        eprintln!("configuration error: {e}, falling back to defaults");
        EngineConfig::default()
    });

    match cli.command {
        Commands::Config => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => eprintln!("error rendering configuration: {e}"),
            }
        }
        Commands::Index { path } => {
            let (engine, indexed) = index_directory(&path, config);
            print_stats(&engine, &indexed);
        }
        Commands::Symbol { path, name } => {
            let (engine, indexed) = index_directory(&path, config);
            print_symbol(engine.linker(), &indexed, &name);
        }
        Commands::Imports { path, file } => {
            let (engine, indexed) = index_directory(&path, config);
            let target = path.join(&file);
            print_imports(engine.linker(), &target);
        }
    }
}

/// Walks `root`, indexing every file whose extension an enabled language
/// claims. Per-file read/parse failures are logged and skipped rather than
/// aborting the whole walk (spec §7: engine errors are per-file, not fatal
/// to the run).
fn index_directory(root: &Path, config: EngineConfig) -> (IncrementalEngine, Vec<PathBuf>) {
    let engine = IncrementalEngine::new(root.to_path_buf(), Box::new(StdFileService::new()), config.clone());
    let mut indexed = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(language) = Language::from_path(path) else { continue };
        if !config.is_enabled(language) {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(bytes) => match engine.update_file(path, &bytes) {
                Ok(result) => {
                    indexed.push(path.to_path_buf());
                    println!(
                        "indexed {} (+{} -{} symbols)",
                        path.display(),
                        result.added_symbols.len(),
                        result.removed_symbols.len()
                    );
                }
                Err(e) => eprintln!("failed to index {}: {e}", path.display()),
            },
            Err(e) => eprintln!("failed to read {}: {e}", path.display()),
        }
    }

    (engine, indexed)
}

fn print_stats(engine: &IncrementalEngine, indexed: &[PathBuf]) {
    let stats = engine.linker().stats();
    let incremental = engine.stats();
    println!("files walked: {}", indexed.len());
    println!("files indexed: {}", stats.files);
    println!("symbols: {}", stats.symbols);
    println!("import links: {}", stats.import_links);
    println!("extractors registered: {}", stats.extractors);
    println!("tracked files: {}", incremental.tracked_files);
}

fn print_symbol(linker: &LinkerEngine, indexed: &[PathBuf], name: &str) {
    for path in indexed {
        let Some(file_id) = linker.file_id_for(path) else { continue };
        let Ok(symbols) = linker.get_symbols_in_file(file_id) else { continue };
        for symbol in symbols.into_iter().filter(|s| s.name == name) {
            let composite = CompositeSymbolId::new(file_id, symbol.id);
            println!(
                "{composite} {:?} '{}' in {} (exported: {})",
                symbol.kind,
                symbol.fully_qualified_name.as_deref().unwrap_or(&symbol.name),
                path.display(),
                symbol.is_exported
            );
            match linker.get_symbol_link(composite) {
                Ok(link) => {
                    if let Some(exporter) = link.exported_by {
                        println!("  exported by {exporter}");
                    }
                    if link.references.is_empty() {
                        println!("  no cross-file references recorded");
                    }
                    for reference in link.references {
                        println!("  referenced from {} as '{}'", reference.from_file, reference.imported_name);
                    }
                }
                Err(_) => println!("  no cross-file references recorded"),
            }
        }
    }
}

fn print_imports(linker: &LinkerEngine, file: &Path) {
    let Some(file_id) = linker.file_id_for(file) else {
        eprintln!("{} was not indexed", file.display());
        return;
    };
    match linker.get_file_imports(file_id) {
        Ok(links) => {
            for link in links {
                let resolved = link
                    .resolved_file
                    .and_then(|id| linker.path_of(id))
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unresolved>".to_string());
                println!(
                    "{} -> {resolved} ({:?}, external: {})",
                    link.import_path, link.resolution, link.is_external
                );
            }
        }
        Err(e) => eprintln!("{e}"),
    }
}
