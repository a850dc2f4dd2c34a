//! Passthrough copying: files that bypass templating.

use super::{collect_all_files, is_up_to_date};
use crate::config::SiteConfig;
use crate::log;
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

/// Copy a registered passthrough path (file or directory) into the output tree.
///
/// `path` is relative to the project root. A missing path is skipped with a
/// log line. Returns the number of files written.
pub fn copy_passthrough(path: &Path, config: &SiteConfig) -> Result<usize> {
    let source = config.get_root().join(path);

    if !source.exists() {
        log!("copy"; "skipping missing passthrough `{}`", path.display());
        return Ok(0);
    }

    let files = if source.is_dir() {
        collect_all_files(&source)
    } else {
        vec![source]
    };

    let mut copied = 0;
    for file in &files {
        let dest = passthrough_dest(file, config)?;
        if copy_file(file, &dest, config.build.clean)? {
            copied += 1;
            if config.verbose {
                log!("copy"; "{}", config.root_relative(&dest));
            }
        }
    }

    Ok(copied)
}

/// Output location of a passthrough file.
///
/// Files inside the input directory keep their path relative to it
/// (`site/assets/a.css` → `_site/assets/a.css`); others keep their path
/// relative to the project root.
pub fn passthrough_dest(file: &Path, config: &SiteConfig) -> Result<PathBuf> {
    let rel = file
        .strip_prefix(&config.build.input)
        .or_else(|_| file.strip_prefix(config.get_root()))
        .map_err(|_| anyhow!("Passthrough file is outside the project: {}", file.display()))?;

    Ok(config.build.output.join(rel))
}

/// Copy `src` to `dest` byte-for-byte, creating parent directories.
///
/// Returns `false` when `dest` already has the same bytes and `force` is off.
pub fn copy_file(src: &Path, dest: &Path, force: bool) -> Result<bool> {
    if !force && is_up_to_date(src, dest) {
        return Ok(false);
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::copy(src, dest)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
    Ok(true)
}
