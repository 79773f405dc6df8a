//! The incremental engine (C6): wraps [`LinkerEngine`] with content
//! hashing and a dependents cascade so a single file change only relinks
//! what could have been affected by it.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::IndexResult;
use crate::linker::{LinkerEngine, Stats};
use crate::resolution::FileService;
use crate::types::FileId;

/// 32-byte SHA-256 content digest.
pub type ContentHash = [u8; 32];

fn hash_of(bytes: &str) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_bytes());
    hasher.finalize().into()
}

/// `{updatedFiles, addedSymbols, removedSymbols, updateDuration,
/// cascadeDepth}` (spec §4.6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateResult {
    pub updated_files: Vec<FileId>,
    pub added_symbols: Vec<String>,
    pub removed_symbols: Vec<String>,
    pub update_duration: Duration,
    pub cascade_depth: u32,
}

/// `{tracked_files, dependency_edges, pending_updates}` (spec §6).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IncrementalStats {
    pub tracked_files: usize,
    pub dependency_edges: usize,
    pub pending_updates: usize,
}

#[derive(Default)]
struct Tracking {
    hashes: HashMap<FileId, ContentHash>,
    modified_at: HashMap<FileId, std::time::SystemTime>,
}

/// Wraps a [`LinkerEngine`], tracking per-file content hashes so repeated
/// updates with unchanged bytes are free (spec invariant P5).
pub struct IncrementalEngine {
    linker: LinkerEngine,
    tracking: RwLock<Tracking>,
    cascade_depth_limit: Option<u32>,
}

impl IncrementalEngine {
    pub fn new(project_root: PathBuf, file_service: Box<dyn FileService>, config: EngineConfig) -> Self {
        let cascade_depth_limit = config.incremental.cascade_depth_limit;
        Self {
            linker: LinkerEngine::new(project_root, file_service, config),
            tracking: RwLock::new(Tracking::default()),
            cascade_depth_limit,
        }
    }

    pub fn linker(&self) -> &LinkerEngine {
        &self.linker
    }

    /// Indexes `path` if its content hash changed, then relinks the file
    /// and its transitive dependents up to the configured cascade depth.
    pub fn update_file(&self, path: &Path, bytes: &str) -> IndexResult<UpdateResult> {
        self.update_file_cancellable(path, bytes, &CancellationToken::new())
    }

    pub fn update_file_cancellable(
        &self,
        path: &Path,
        bytes: &str,
        cancellation: &CancellationToken,
    ) -> IndexResult<UpdateResult> {
        let start = Instant::now();
        let new_hash = hash_of(bytes);

        let file_id = self.linker.with_state_write(|state| state.file_id_for(path));
        let unchanged = self.tracking.read().hashes.get(&file_id).is_some_and(|h| *h == new_hash);
        if unchanged {
            return Ok(UpdateResult { update_duration: start.elapsed(), ..Default::default() });
        }

        let before_names = self.linker.with_state_write(|state| state.symbol_names(file_id));
        self.linker.index_file(path, bytes)?;
        let after_names = self.linker.with_state_write(|state| state.symbol_names(file_id));

        self.tracking.write().hashes.insert(file_id, new_hash);
        self.tracking.write().modified_at.insert(file_id, std::time::SystemTime::now());

        let added_symbols: Vec<String> = after_names.difference(&before_names).cloned().collect();
        let removed_symbols: Vec<String> = before_names.difference(&after_names).cloned().collect();

        let (updated_files, cascade_depth) = self.cascade_relink(file_id, cancellation);

        info!(
            path = %path.display(),
            updated = updated_files.len(),
            added = added_symbols.len(),
            removed = removed_symbols.len(),
            cascade_depth,
            "updated file"
        );

        Ok(UpdateResult {
            updated_files,
            added_symbols,
            removed_symbols,
            update_duration: start.elapsed(),
            cascade_depth,
        })
    }

    /// Drops `path`'s table; every symbol it defined is reported removed;
    /// its dependents are relinked. A path never indexed returns a zero
    /// result rather than an error (spec §7 `removalOfUnknownFile`).
    pub fn remove_file(&self, path: &Path) -> UpdateResult {
        let start = Instant::now();
        let file_id = self.linker.with_state_write(|state| state.file_id_for(path));

        if !self.linker.with_state_write(|state| state.has_table(file_id)) {
            return UpdateResult { update_duration: start.elapsed(), ..Default::default() };
        }

        let removed_symbols: Vec<String> =
            self.linker.with_state_write(|state| state.symbol_names(file_id)).into_iter().collect();
        let dependents = self.linker.with_state_write(|state| state.dependents_of(file_id));

        self.linker.remove_table(file_id);
        self.tracking.write().hashes.remove(&file_id);

        self.linker.link_symbols();

        let mut updated_files: Vec<FileId> = dependents.into_iter().collect();
        updated_files.push(file_id);

        UpdateResult {
            updated_files,
            added_symbols: Vec::new(),
            removed_symbols,
            update_duration: start.elapsed(),
            cascade_depth: 1,
        }
    }

    /// Applies every entry, running a single relink pass at the end so
    /// readers never observe a partially-updated batch (spec §5 ordering
    /// guarantees).
    pub fn batch_update(&self, files: &HashMap<PathBuf, String>) -> IndexResult<UpdateResult> {
        self.batch_update_cancellable(files, &CancellationToken::new())
    }

    pub fn batch_update_cancellable(
        &self,
        files: &HashMap<PathBuf, String>,
        cancellation: &CancellationToken,
    ) -> IndexResult<UpdateResult> {
        let start = Instant::now();
        let mut updated_files = Vec::new();
        let mut added_symbols = Vec::new();
        let mut removed_symbols = Vec::new();

        for (path, bytes) in files {
            if cancellation.is_cancelled() {
                break;
            }
            let new_hash = hash_of(bytes);
            let file_id = self.linker.with_state_write(|state| state.file_id_for(path));
            if self.tracking.read().hashes.get(&file_id).is_some_and(|h| *h == new_hash) {
                continue;
            }

            let before_names = self.linker.with_state_write(|state| state.symbol_names(file_id));
            self.linker.index_file(path, bytes)?;
            let after_names = self.linker.with_state_write(|state| state.symbol_names(file_id));

            self.tracking.write().hashes.insert(file_id, new_hash);
            added_symbols.extend(after_names.difference(&before_names).cloned());
            removed_symbols.extend(before_names.difference(&after_names).cloned());
            updated_files.push(file_id);
        }

        self.linker.link_symbols();

        Ok(UpdateResult {
            updated_files,
            added_symbols,
            removed_symbols,
            update_duration: start.elapsed(),
            cascade_depth: if files.is_empty() { 0 } else { 1 },
        })
    }

    /// Relinks `root` and every file in its transitive `dependents` set,
    /// breaking cycles with a visited set and stopping at
    /// `cascade_depth_limit` when configured (spec §4.6 cascade policy).
    fn cascade_relink(&self, root: FileId, cancellation: &CancellationToken) -> (Vec<FileId>, u32) {
        self.linker.link_symbols();

        let mut visited = HashSet::new();
        visited.insert(root);
        let mut frontier = vec![root];
        let mut depth = 0u32;

        while !frontier.is_empty() {
            if cancellation.is_cancelled() {
                break;
            }
            if let Some(limit) = self.cascade_depth_limit {
                if depth >= limit {
                    break;
                }
            }
            let mut next = Vec::new();
            for file_id in &frontier {
                let dependents = self.linker.with_state_write(|state| state.dependents_of(*file_id));
                for dependent in dependents {
                    if visited.insert(dependent) {
                        next.push(dependent);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
            depth += 1;
        }

        (visited.into_iter().collect(), depth)
    }

    pub fn stats(&self) -> IncrementalStats {
        let linker_stats: Stats = self.linker.stats();
        let tracking = self.tracking.read();
        IncrementalStats {
            tracked_files: tracking.hashes.len(),
            dependency_edges: linker_stats.import_links,
            pending_updates: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::MemoryFileService;

    fn engine() -> IncrementalEngine {
        IncrementalEngine::new(
            PathBuf::from("/proj"),
            Box::new(MemoryFileService::new([])),
            EngineConfig::default(),
        )
    }

    #[test]
    fn repeated_update_with_identical_bytes_is_a_no_op() {
        let engine = engine();
        let source = "package main\nfunc main() {}\n";
        let first = engine.update_file(Path::new("/proj/main.go"), source).unwrap();
        assert!(!first.updated_files.is_empty());

        let second = engine.update_file(Path::new("/proj/main.go"), source).unwrap();
        assert!(second.updated_files.is_empty());
        assert!(second.added_symbols.is_empty());
        assert!(second.removed_symbols.is_empty());
    }

    #[test]
    fn removing_untracked_file_is_a_zero_result_not_an_error() {
        let engine = engine();
        let result = engine.remove_file(Path::new("/proj/never_indexed.go"));
        assert!(result.updated_files.is_empty());
        assert!(result.removed_symbols.is_empty());
    }

    #[test]
    fn modifying_a_file_reports_added_and_removed_symbols() {
        let engine = engine();
        engine.update_file(Path::new("/proj/main.go"), "package main\nfunc A() {}\n").unwrap();
        let result = engine.update_file(Path::new("/proj/main.go"), "package main\nfunc B() {}\n").unwrap();
        assert!(result.added_symbols.contains(&"B".to_string()));
        assert!(result.removed_symbols.contains(&"A".to_string()));
    }

    #[test]
    fn batch_update_runs_a_single_relink_pass() {
        let engine = engine();
        let mut files = HashMap::new();
        files.insert(PathBuf::from("/proj/a.go"), "package main\nfunc A() {}\n".to_string());
        files.insert(PathBuf::from("/proj/b.go"), "package main\nfunc B() {}\n".to_string());
        let result = engine.batch_update(&files).unwrap();
        assert_eq!(result.updated_files.len(), 2);
    }
}
