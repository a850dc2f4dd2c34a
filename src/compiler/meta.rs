//! Content items: discovered source documents with their resolved paths.
//!
//! | Field         | Example                                  |
//! |---------------|------------------------------------------|
//! | `source`      | `/project/site/blog/foo/index.md`        |
//! | `input_path`  | `site/blog/foo/index.md`                 |
//! | `output_path` | `/project/_site/blog/foo/index.html`     |
//! | `output_rel`  | `_site/blog/foo/index.html`              |
//! | `url`         | `/blog/foo/`                             |
//! | `file_slug`   | `foo`                                    |

use super::frontmatter::{FrontMatter, parse_front_matter};
use crate::config::SiteConfig;
use crate::utils::date;
use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// How a content item's body is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Tera, then CommonMark.
    Markdown,
    /// Tera only.
    Tera,
}

impl TemplateKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "tera" => Some(Self::Tera),
            _ => None,
        }
    }
}

/// A source document taking part in the build.
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Absolute source path
    pub source: PathBuf,
    /// Source path relative to the project root, `/`-separated (glob target)
    pub input_path: String,
    /// Absolute output file path
    pub output_path: PathBuf,
    /// Output path relative to the project root, `/`-separated
    pub output_rel: String,
    /// Public URL (`/about/`)
    pub url: String,
    /// File stem, or parent directory name for `index` files
    pub file_slug: String,
    /// Front matter `date`, else the file's modification time
    pub date: DateTime<Utc>,
    pub kind: TemplateKind,
    pub front_matter: FrontMatter,
    /// Template source after the front matter
    pub body: String,
}

impl ContentItem {
    /// Read and parse a source file.
    ///
    /// Returns `None` for drafts.
    pub fn load(source: &Path, kind: TemplateKind, config: &SiteConfig) -> Result<Option<Self>> {
        let content = fs::read_to_string(source)
            .with_context(|| format!("Failed to read {}", source.display()))?;
        let (front_matter, body) = parse_front_matter(&content)
            .with_context(|| format!("Failed to parse front matter in {}", source.display()))?;

        if front_matter.is_draft() {
            return Ok(None);
        }

        let relative = source.strip_prefix(&config.build.input).map_err(|_| {
            anyhow!("File is not in input directory: {}", source.display())
        })?;

        let output_path =
            output_path_for(relative, front_matter.permalink(), &config.build.output)
                .with_context(|| format!("Invalid permalink in {}", source.display()))?;
        let url = url_from_output_path(&output_path, &config.build.output)?;

        let date = match front_matter.date() {
            Some(value) => date_from_value(value).ok_or_else(|| {
                anyhow!("Invalid `date` in {}: {value}", source.display())
            })?,
            None => modified_time(source)?,
        };

        Ok(Some(Self {
            source: source.to_path_buf(),
            input_path: config.root_relative(source),
            output_rel: config.root_relative(&output_path),
            output_path,
            url,
            file_slug: file_slug(relative),
            date,
            kind,
            front_matter,
            body: body.to_string(),
        }))
    }

    /// The item as seen from templates (`page` and collection entries).
    pub fn to_value(&self) -> Value {
        json!({
            "url": self.url,
            "input_path": self.input_path,
            "output_path": self.output_rel,
            "file_slug": self.file_slug,
            "date": date::to_rfc3339(&self.date),
            "data": self.front_matter.data(),
        })
    }

    #[cfg(test)]
    pub(crate) fn stub(input_path: &str) -> Self {
        use chrono::TimeZone;

        Self {
            source: PathBuf::from(input_path),
            input_path: input_path.to_string(),
            output_path: PathBuf::from("_site/index.html"),
            output_rel: "_site/index.html".to_string(),
            url: "/".to_string(),
            file_slug: String::new(),
            date: Utc.with_ymd_and_hms(2021, 3, 5, 0, 0, 0).unwrap(),
            kind: TemplateKind::Markdown,
            front_matter: FrontMatter::default(),
            body: String::new(),
        }
    }
}

/// Interpret a front matter `date` value.
pub fn date_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => date::parse_date(s),
        Value::Number(n) => n.as_i64().and_then(date::from_timestamp),
        _ => None,
    }
}

fn modified_time(source: &Path) -> Result<DateTime<Utc>> {
    let modified = fs::metadata(source)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to read mtime of {}", source.display()))?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Compute the output file for a source path relative to the input directory.
///
/// Without a permalink, pretty URLs apply: `about.md` → `about/index.html`,
/// `blog/foo/index.md` → `blog/foo/index.html`. A permalink is taken as the
/// URL; one ending in `/` gets `index.html`.
pub fn output_path_for(relative: &Path, permalink: Option<&str>, output_dir: &Path) -> Result<PathBuf> {
    if let Some(permalink) = permalink {
        let trimmed = permalink.trim_start_matches('/');
        let target = Path::new(trimmed);

        if target
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("permalink `{permalink}` must stay inside the output directory");
        }

        let path = output_dir.join(target);
        return Ok(if trimmed.is_empty() || trimmed.ends_with('/') {
            path.join("index.html")
        } else {
            path
        });
    }

    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Invalid file name: {}", relative.display()))?;
    let parent = relative.parent().unwrap_or(Path::new(""));

    let dir = if stem == "index" {
        output_dir.join(parent)
    } else {
        output_dir.join(parent).join(stem)
    };
    Ok(dir.join("index.html"))
}

/// Public URL of an output file, dropping a trailing `index.html`.
pub fn url_from_output_path(path: &Path, output_dir: &Path) -> Result<String> {
    let rel_to_output = path
        .strip_prefix(output_dir)
        .map_err(|_| anyhow!("Path is not in output directory: {}", path.display()))?;

    let path_str = rel_to_output.to_string_lossy().replace('\\', "/");

    // Remove "index.html" for pretty URLs
    let url_path = if path_str == "index.html" {
        String::new()
    } else if let Some(dir) = path_str.strip_suffix("/index.html") {
        format!("{dir}/")
    } else {
        path_str
    };

    Ok(format!("/{url_path}"))
}

/// File stem, or the parent directory's name for `index` files.
fn file_slug(relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if stem != "index" {
        return stem;
    }
    relative
        .parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
