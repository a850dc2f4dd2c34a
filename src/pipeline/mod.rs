//! Host registration API.
//!
//! The configurator populates a [`Registry`] once per build. The build
//! engine then drives every callback it holds:
//!
//! ```text
//! setup::configure()
//!     │
//!     ├── add_transform()        ──► applied to each rendered artifact
//!     ├── add_filter()           ──► bound into the template engine
//!     ├── add_collection()       ──► evaluated over discovered items
//!     ├── add_passthrough_copy() ──► copied verbatim to output
//!     └── set_template_formats() ──► restricts discovery
//! ```
//!
//! Names are unique per kind. Registering a name again replaces the earlier
//! callback in place, so transform order is registration order of first use.

mod collection;
mod error;

pub use collection::CollectionApi;
pub use error::PipelineError;

use crate::compiler::meta::ContentItem;
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};
use tera::{Filter, Tera, Value};

/// Rewrites a rendered artifact: `(content, output_path) -> content'`.
pub type TransformFn = dyn Fn(&str, &Path) -> Result<String, PipelineError> + Send + Sync;

/// Selects content items for a named collection.
pub type CollectionFn =
    dyn Fn(&CollectionApi<'_>) -> Result<Vec<ContentItem>, PipelineError> + Send + Sync;

/// Name of the implicit collection holding every content item.
pub const ALL_COLLECTION: &str = "all";

/// Formats processed when the configurator does not restrict them.
const DEFAULT_TEMPLATE_FORMATS: &[&str] = &["md", "tera"];

/// Named callbacks and declarations handed to the build engine.
pub struct Registry {
    transforms: Vec<(String, Box<TransformFn>)>,
    filters: Vec<(String, Arc<dyn Filter>)>,
    collections: Vec<(String, Box<CollectionFn>)>,
    passthrough: Vec<PathBuf>,
    template_formats: Vec<String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            transforms: Vec::new(),
            filters: Vec::new(),
            collections: Vec::new(),
            passthrough: Vec::new(),
            template_formats: DEFAULT_TEMPLATE_FORMATS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("transforms", &names(&self.transforms))
            .field("filters", &names(&self.filters))
            .field("collections", &names(&self.collections))
            .field("passthrough", &self.passthrough)
            .field("template_formats", &self.template_formats)
            .finish()
    }
}

impl Registry {
    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register a content transform applied to every rendered artifact.
    pub fn add_transform<F>(&mut self, name: impl Into<String>, transform: F) -> &mut Self
    where
        F: Fn(&str, &Path) -> Result<String, PipelineError> + Send + Sync + 'static,
    {
        upsert(&mut self.transforms, name.into(), Box::new(transform));
        self
    }

    /// Register a template filter.
    pub fn add_filter(&mut self, name: impl Into<String>, filter: impl Filter + 'static) -> &mut Self {
        upsert(&mut self.filters, name.into(), Arc::new(filter));
        self
    }

    /// Register a named collection.
    pub fn add_collection<F>(&mut self, name: impl Into<String>, select: F) -> &mut Self
    where
        F: Fn(&CollectionApi<'_>) -> Result<Vec<ContentItem>, PipelineError>
            + Send
            + Sync
            + 'static,
    {
        upsert(&mut self.collections, name.into(), Box::new(select));
        self
    }

    /// Declare a root-relative file or directory copied verbatim to output.
    pub fn add_passthrough_copy(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        let path = path.into();
        if !self.passthrough.contains(&path) {
            self.passthrough.push(path);
        }
        self
    }

    /// Restrict the source extensions the build engine processes.
    pub fn set_template_formats(&mut self, formats: &[&str]) -> &mut Self {
        self.template_formats = formats
            .iter()
            .map(|f| f.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn transform_names(&self) -> Vec<&str> {
        names(&self.transforms)
    }

    pub fn collection_names(&self) -> Vec<&str> {
        names(&self.collections)
    }

    pub fn filter_names(&self) -> Vec<&str> {
        names(&self.filters)
    }

    pub fn passthrough_copies(&self) -> &[PathBuf] {
        &self.passthrough
    }

    pub fn template_formats(&self) -> &[String] {
        &self.template_formats
    }

    /// Whether files with extension `ext` take part in the build.
    pub fn accepts_format(&self, ext: &str) -> bool {
        self.template_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(ext))
    }

    // ------------------------------------------------------------------------
    // Invocation
    // ------------------------------------------------------------------------

    /// Run every transform, in registration order, over one artifact.
    pub fn apply_transforms(&self, content: String, output_path: &Path) -> Result<String, PipelineError> {
        self.transforms
            .iter()
            .try_fold(content, |content, (name, transform)| {
                transform(&content, output_path).map_err(|source| PipelineError::Transform {
                    name: name.clone(),
                    path: output_path.to_path_buf(),
                    source: Box::new(source),
                })
            })
    }

    /// Evaluate `all` plus every registered collection over `items`.
    pub fn build_collections(
        &self,
        items: &[ContentItem],
    ) -> Result<Vec<(String, Vec<ContentItem>)>, PipelineError> {
        let api = CollectionApi::new(items);
        let mut built = vec![(ALL_COLLECTION.to_string(), api.all())];

        for (name, select) in &self.collections {
            let selected = select(&api)?;
            match built.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = selected,
                None => built.push((name.clone(), selected)),
            }
        }

        Ok(built)
    }

    /// Bind every registered filter into a template engine.
    pub fn register_filters(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            let filter = Arc::clone(filter);
            tera.register_filter(
                name,
                move |value: &Value, args: &HashMap<String, Value>| filter.filter(value, args),
            );
        }
    }
}

/// Replace the entry called `name`, or append it.
fn upsert<T>(entries: &mut Vec<(String, T)>, name: String, value: T) {
    match entries.iter_mut().find(|(n, _)| *n == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name, value)),
    }
}

fn names<T>(entries: &[(String, T)]) -> Vec<&str> {
    entries.iter().map(|(n, _)| n.as_str()).collect()
}
