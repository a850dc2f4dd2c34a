//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── setup::configure()      ──► Registry
//!     │
//!     ├── discover()              ──► ContentItem[] + raster copies
//!     │
//!     ├── build_collections()     ──► all, posts, ...
//!     │
//!     ├── render_items()          ──► Renderer → transforms → HTML files
//!     │
//!     └── copy_passthrough()      ──► verbatim asset copies
//! ```
//!
//! Everything runs sequentially; the first error aborts the build.

use crate::{
    compiler::{
        assets::{copy_file, copy_passthrough},
        collect_all_files,
        meta::{ContentItem, TemplateKind},
        pages::{Renderer, collections_value},
    },
    config::SiteConfig,
    log,
    pipeline::Registry,
    setup,
};
use anyhow::{Context, Result, bail};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Counts reported after a successful build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Rendered content items
    pub pages: usize,
    /// Files copied without templating
    pub copied: usize,
}

/// Build the site into `config.build.output`.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let output = &config.build.output;

    if config.build.clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let mut registry = Registry::default();
    setup::configure(&mut registry, config);
    if config.verbose {
        log!(
            "setup";
            "transforms {:?} filters {:?} collections {:?} formats {:?}",
            registry.transform_names(),
            registry.filter_names(),
            registry.collection_names(),
            registry.template_formats()
        );
    }

    log!("build"; "reading {}", config.root_relative(&config.build.input));
    let discovered = discover(config, &registry)?;
    check_output_conflicts(&discovered.items)?;

    let collections = registry.build_collections(&discovered.items)?;
    for (name, items) in &collections {
        log!("collect"; "{name}: {} items", items.len());
    }
    let collections = collections_value(&collections);

    let pages = render_items(&discovered.items, &collections, &registry, config)?;

    let mut copied = 0;
    for file in &discovered.raw_copies {
        let dest = output.join(file.strip_prefix(&config.build.input)?);
        if copy_file(file, &dest, config.build.clean)? {
            copied += 1;
        }
    }
    for path in registry.passthrough_copies() {
        copied += copy_passthrough(path, config)?;
    }

    let report = BuildReport { pages, copied };
    log!("build"; "wrote {} pages, copied {} files", report.pages, report.copied);
    Ok(report)
}

/// Source files sorted into what gets rendered and what gets copied as-is.
struct Discovered {
    items: Vec<ContentItem>,
    raw_copies: Vec<PathBuf>,
}

/// Walk the input directory in file-name order and classify every file.
///
/// Skipped: the includes directory, passthrough paths (copied separately),
/// the output directory, and extensions not in the registry's formats.
fn discover(config: &SiteConfig, registry: &Registry) -> Result<Discovered> {
    let root = config.get_root();
    let mut excluded: Vec<PathBuf> = registry
        .passthrough_copies()
        .iter()
        .map(|p| root.join(p))
        .collect();
    excluded.push(config.includes_dir());
    excluded.push(config.build.output.clone());

    let mut discovered = Discovered {
        items: Vec::new(),
        raw_copies: Vec::new(),
    };

    for path in collect_all_files(&config.build.input) {
        if excluded.iter().any(|dir| path.starts_with(dir)) {
            continue;
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !registry.accepts_format(ext) {
            continue;
        }

        match TemplateKind::from_extension(ext) {
            Some(kind) => {
                if let Some(item) = ContentItem::load(&path, kind, config)? {
                    discovered.items.push(item);
                }
            }
            None => discovered.raw_copies.push(path),
        }
    }

    Ok(discovered)
}

/// Fail when two items would write the same output file.
fn check_output_conflicts(items: &[ContentItem]) -> Result<()> {
    let mut seen: HashMap<&Path, &str> = HashMap::new();

    for item in items {
        if let Some(first) = seen.insert(&item.output_path, &item.input_path) {
            bail!(
                "`{}` and `{}` both write {}",
                first,
                item.input_path,
                item.output_rel
            );
        }
    }

    Ok(())
}

/// Render, transform and write every item. Returns the number written.
fn render_items(
    items: &[ContentItem],
    collections: &serde_json::Value,
    registry: &Registry,
    config: &SiteConfig,
) -> Result<usize> {
    let renderer = Renderer::new(config, registry, items)?;

    for item in items {
        let rendered = renderer.render(item, collections)?;
        let content = registry.apply_transforms(rendered, &item.output_path)?;

        if let Some(parent) = item.output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&item.output_path, content)
            .with_context(|| format!("Failed to write {}", item.output_path.display()))?;

        if config.verbose {
            match item.front_matter.title() {
                Some(title) => log!("write"; "{} -> {} ({title})", item.input_path, item.output_rel),
                None => log!("write"; "{} -> {}", item.input_path, item.output_rel),
            }
        }
    }

    Ok(items.len())
}
