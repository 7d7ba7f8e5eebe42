use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{BatchError, BatchResult};
use super::turn::Turn;
use crate::storage::StorageError;

/// Turns read from a `generated/` directory, sorted by id.
#[derive(Debug, Clone, Default)]
pub struct LoadedTurns {
    pub turns: Vec<Turn>,
    /// Files that were unreadable, malformed or repeated an earlier id.
    pub skipped: usize,
}

/// Loads every `*.json` turn file under `dir`.
///
/// A file that cannot be read or parsed is logged and skipped; only a
/// missing or unlistable `dir` fails. When two files carry the same id the
/// one whose path sorts first wins.
pub fn load_turns(dir: &Path) -> BatchResult<LoadedTurns> {
    if !dir.is_dir() {
        return Err(BatchError::MissingGenerated {
            path: dir.to_path_buf(),
        });
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| StorageError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut by_id: BTreeMap<String, Turn> = BTreeMap::new();
    let mut skipped = 0;
    for path in paths {
        let turn = match Turn::load(&path) {
            Ok(turn) => turn,
            Err(e) if e.is_skippable() => {
                warn!(path = %path.display(), error = %e, "Skipping turn file");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        if by_id.contains_key(&turn.id) {
            warn!(path = %path.display(), turn_id = %turn.id, "Skipping duplicate turn id");
            skipped += 1;
            continue;
        }
        by_id.insert(turn.id.clone(), turn);
    }

    debug!(dir = %dir.display(), turns = by_id.len(), skipped, "Loaded generated turns");
    Ok(LoadedTurns {
        turns: by_id.into_values().collect(),
        skipped,
    })
}
