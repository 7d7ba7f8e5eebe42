//! Loading raw corpus text from disk.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{IndexError, IndexResult};
use super::model::SourceText;
use crate::storage::StorageError;

const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// One line of `corpus.jsonl`. Only `text` is required.
#[derive(Debug, Deserialize)]
struct CorpusLine {
    text: String,
    #[serde(default, alias = "source", alias = "work")]
    r#ref: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Reads every `.txt` / `.md` file directly under `dir`, sorted by file name.
pub fn read_text_sources(dir: &Path) -> IndexResult<Vec<SourceText>> {
    if !dir.is_dir() {
        return Err(IndexError::MissingCorpus {
            path: dir.to_path_buf(),
        });
    }

    let mut paths: Vec<_> = fs::read_dir(dir)
        .map_err(|e| StorageError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| TEXT_EXTENSIONS.contains(&e))
        })
        .collect();
    paths.sort();

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(text) => {
                let source_ref = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                sources.push(SourceText::new(source_ref, text));
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable corpus file"),
        }
    }

    debug!(dir = %dir.display(), files = sources.len(), "Read corpus text files");
    Ok(sources)
}

/// Reads a JSON-lines corpus. Malformed lines are skipped with a warning.
///
/// Each line becomes one source; its reference is `ref` (or `source` /
/// `work`), else `id`, else `<file>:<line>`.
pub fn read_corpus_jsonl(path: &Path) -> IndexResult<Vec<SourceText>> {
    if !path.is_file() {
        return Err(IndexError::MissingCorpus {
            path: path.to_path_buf(),
        });
    }
    let raw = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut sources = Vec::new();
    for (i, line) in raw.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<CorpusLine>(line) {
            Ok(entry) => {
                let source_ref = entry
                    .r#ref
                    .or(entry.id)
                    .unwrap_or_else(|| format!("{file_name}:{line_no}"));
                sources.push(SourceText::new(source_ref, entry.text));
            }
            Err(e) => warn!(
                path = %path.display(),
                line = line_no,
                error = %e,
                "Skipping malformed corpus line"
            ),
        }
    }
    Ok(sources)
}
