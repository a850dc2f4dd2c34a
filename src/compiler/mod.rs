//! Content discovery, rendering, and asset copying.
//!
//! - **frontmatter**: Split and parse YAML/TOML front matter
//! - **meta**: Content items and their output paths/URLs
//! - **pages**: Render items through Tera, Markdown and layouts
//! - **assets**: Passthrough copies
//!
//! # Build Flow
//!
//! ```text
//! collect_all_files() ──► ContentItem::load() ──► Renderer::render()
//!         │                                            │
//!         ▼                                            ▼
//!   copy_passthrough()                          transforms → disk
//! ```

pub mod assets;
pub mod frontmatter;
pub mod meta;
pub mod pages;

use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all files from a directory recursively, sorted by file name.
///
/// The returned order is the discovery order collections preserve.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Check if destination already holds exactly the source's bytes.
///
/// Mtimes are not trusted: tools like `cp -p` or `tar` can restore older
/// timestamps on changed files.
pub fn is_up_to_date(src: &Path, dst: &Path) -> bool {
    let len = |p: &Path| p.metadata().map(|m| m.len()).ok();

    match (len(src), len(dst)) {
        (Some(src_len), Some(dst_len)) if src_len == dst_len => {}
        _ => return false,
    }

    matches!((fs::read(src), fs::read(dst)), (Ok(a), Ok(b)) if a == b)
}
