//! Library-set reader: resolves the full set of Steam library roots.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::SteamError;
use crate::paths::Paths;
use crate::vdf::{VdfValue, parse_text_vdf};

/// Returns every Steam library root on the system, sorted and deduplicated.
///
/// Parses `libraryfolders.vdf` from the install root and keeps entries that
/// expose a `path` field (or, in the pre-2021 format, a bare string value).
/// The install root itself is always part of the result. A missing or
/// unparseable index file is fatal; a single malformed entry is not.
pub fn library_roots(paths: &Paths) -> Result<Vec<PathBuf>, SteamError> {
    let index_path = paths.libraryfolders_path();
    let content = fs::read_to_string(&index_path)
        .map_err(|_| SteamError::LibraryIndexNotFound(index_path.display().to_string()))?;

    let root = parse_text_vdf(&content)?;
    let folders = root
        .get("libraryfolders")
        .ok_or_else(|| SteamError::Vdf("missing 'libraryfolders' root key".into()))?;

    let mut roots = BTreeSet::new();
    roots.insert(paths.base_dir().clone());

    for (key, value) in folders.entries() {
        match entry_path(value) {
            Some(path) => {
                roots.insert(path);
            }
            None => {
                // Scalar metadata like "contentstatsid" lives alongside the
                // numbered entries; only warn for entries that look like
                // library slots.
                if key.parse::<u32>().is_ok() {
                    warn!(entry = %key, "library entry has no usable path, skipping");
                }
            }
        }
    }

    Ok(roots.into_iter().collect())
}

/// Extracts the library path from one index entry.
///
/// New format: an object with a `path` field. Old format: the entry value is
/// the path itself.
fn entry_path(value: &VdfValue) -> Option<PathBuf> {
    match value {
        VdfValue::Obj(_) => value
            .get("path")
            .and_then(|v| v.as_str())
            .map(PathBuf::from),
        VdfValue::Str(s) => {
            // Old-format values are paths; scalar metadata is numeric.
            if s.parse::<i64>().is_ok() || s.is_empty() {
                None
            } else {
                Some(PathBuf::from(s))
            }
        }
    }
}
