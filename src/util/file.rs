use crate::error::{BuildError, Result};
use crate::pipeline::Asset;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::task::JoinSet;
use tracing::{debug, info};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand `include` globs (relative to `root`) into files, in pattern order.
///
/// Each pattern's matches are sorted; a file matched by an earlier pattern
/// keeps its first position. Paths whose root-relative form matches any
/// `exclude` glob are dropped. A missing root yields no files.
pub fn collect_files(root: &Path, include: &[&str], exclude: &[&str]) -> Result<Vec<PathBuf>> {
    let base = Pattern::escape(&root.to_string_lossy());
    let excludes = exclude
        .iter()
        .map(|pattern| Pattern::new(pattern))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in include {
        let mut matched = Vec::new();
        for entry in glob::glob_with(&format!("{base}/{pattern}"), MATCH_OPTIONS)? {
            let path = entry?;
            if path.is_file() {
                matched.push(path);
            }
        }
        matched.sort();

        for path in matched {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            if excludes
                .iter()
                .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
            {
                debug!("Excluding {:?}", relative);
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    info!(
        "Collected {} file(s) under {}",
        files.len(),
        root.display()
    );
    Ok(files)
}

/// Read `files` concurrently into assets addressed relative to `root`
pub async fn read_assets(root: &Path, files: Vec<PathBuf>) -> Result<Vec<Asset>> {
    let mut set = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let relative = match path.strip_prefix(root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
        };
        set.spawn(async move {
            let contents = async_fs::read(&path)
                .await
                .map_err(|e| BuildError::io_at(&path, e))?;
            Ok::<_, BuildError>((index, Asset::new(relative, path, contents)))
        });
    }

    let mut assets = Vec::with_capacity(set.len());
    while let Some(result) = set.join_next().await {
        assets.push(result??);
    }
    assets.sort_by_key(|(index, _)| *index);

    Ok(assets.into_iter().map(|(_, asset)| asset).collect())
}

/// Join asset contents in order, separated by a newline
pub fn concat(assets: &[Asset]) -> Vec<u8> {
    let mut out = Vec::with_capacity(assets.iter().map(|a| a.contents.len() + 1).sum());
    for (index, asset) in assets.iter().enumerate() {
        if index > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(&asset.contents);
    }
    out
}

/// Remove a directory tree; a missing directory is fine
pub async fn remove_dir(path: &Path) -> Result<()> {
    match async_fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::io_at(path, e)),
    }
}
