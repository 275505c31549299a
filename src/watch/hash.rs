// src/watch/hash.rs

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use blake3::Hasher;
use tracing::debug;
use walkdir::WalkDir;

use crate::compile::sass::{is_hidden, is_style_source};
use crate::errors::Result;

/// Compute a deterministic hash over every style source under `src`.
///
/// The hash covers each file's path relative to `src` as well as its
/// contents, so renames count as changes. Partials are included and hidden
/// entries are skipped, mirroring exactly what the watcher triggers on.
/// Files are visited in sorted order so the hash is stable across runs.
pub fn task_tree_hash(src: &Path) -> Result<String> {
    let mut hasher = Hasher::new();

    let walker = WalkDir::new(src)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    for entry in walker.filter_entry(|e| !is_hidden(e)) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || !is_style_source(entry.path()) {
            continue;
        }

        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        hasher.update(rel.to_string_lossy().as_bytes());
        hash_file_into(&mut hasher, entry.path())?;
    }

    let hash = hasher.finalize().to_hex().to_string();
    debug!(src = %src.display(), hash = %hash, "computed source tree hash");
    Ok(hash)
}

fn hash_file_into(hasher: &mut Hasher, path: &Path) -> Result<()> {
    debug!("hashing file {:?}", path);
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(())
}
