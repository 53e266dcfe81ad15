// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<RwLock<()>>>>> = OnceLock::new();

/// Returns the process-wide lock guarding one logical file. Writers hold the
/// exclusive half for a full read-mutate-write cycle; readers hold the
/// shared half so they see either the pre-write or post-write file, never a
/// cycle in flight.
///
/// Keys are canonicalized so `./records.csv` and its absolute form share a
/// lock; paths that do not exist yet fall back to the parent's canonical
/// form joined with the file name.
#[must_use]
pub fn path_lock(path: &Path) -> Arc<RwLock<()>> {
    let key = canonical_key(path);
    let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = match registry.lock() {
        Ok(map) => map,
        // A poisoned registry only means another thread panicked while
        // inserting; the map itself is still usable.
        Err(poisoned) => poisoned.into_inner(),
    };
    Arc::clone(map.entry(key).or_default())
}

fn canonical_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_file_yields_same_lock() {
        let dir = std::env::temp_dir();
        let path = dir.join("formbridge-lock-test.csv");
        let a = path_lock(&path);
        let b = path_lock(&path);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_files_yield_different_locks() {
        let dir = std::env::temp_dir();
        let a = path_lock(&dir.join("formbridge-lock-a.csv"));
        let b = path_lock(&dir.join("formbridge-lock-b.csv"));
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
