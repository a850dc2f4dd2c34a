//! Read-only view over discovered content, handed to collection callbacks.

use super::PipelineError;
use crate::compiler::meta::ContentItem;
use globset::{GlobBuilder, GlobMatcher};

/// The items a collection callback may select from, in discovery order.
pub struct CollectionApi<'a> {
    items: &'a [ContentItem],
}

impl<'a> CollectionApi<'a> {
    pub fn new(items: &'a [ContentItem]) -> Self {
        Self { items }
    }

    /// Every item, in discovery order.
    pub fn all(&self) -> Vec<ContentItem> {
        self.items.to_vec()
    }

    /// Items whose root-relative input path matches `pattern`.
    ///
    /// `*` stays within one path segment; `**` spans segments.
    pub fn filtered_by_glob(&self, pattern: &str) -> Result<Vec<ContentItem>, PipelineError> {
        let matcher = compile_glob(pattern)?;
        Ok(self
            .items
            .iter()
            .filter(|item| matcher.is_match(&item.input_path))
            .cloned()
            .collect())
    }
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher, PipelineError> {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|err| PipelineError::Glob(pattern.to_string(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(paths: &[&str]) -> Vec<ContentItem> {
        paths.iter().map(|p| ContentItem::stub(p)).collect()
    }

    fn selected(result: Vec<ContentItem>) -> Vec<String> {
        result.into_iter().map(|i| i.input_path).collect()
    }

    #[test]
    fn test_two_level_glob() {
        let items = items(&[
            "site/blog/foo/index.md",
            "site/about.md",
            "site/blog/bar/notes.md",
            "site/blog/top.md",
            "site/blog/a/b/deep.md",
        ]);
        let api = CollectionApi::new(&items);

        let posts = api.filtered_by_glob("site/blog/*/*.md").unwrap();
        assert_eq!(
            selected(posts),
            ["site/blog/foo/index.md", "site/blog/bar/notes.md"]
        );
    }

    #[test]
    fn test_leading_dot_slash_ignored() {
        let items = items(&["site/blog/foo/index.md"]);
        let api = CollectionApi::new(&items);

        assert_eq!(api.filtered_by_glob("./site/blog/*/*.md").unwrap().len(), 1);
    }

    #[test]
    fn test_preserves_discovery_order() {
        let items = items(&["site/blog/z/index.md", "site/blog/a/index.md"]);
        let api = CollectionApi::new(&items);

        assert_eq!(
            selected(api.filtered_by_glob("site/blog/*/index.md").unwrap()),
            ["site/blog/z/index.md", "site/blog/a/index.md"]
        );
    }

    #[test]
    fn test_extension_must_match() {
        let items = items(&["site/blog/foo/index.tera"]);
        let api = CollectionApi::new(&items);

        assert!(api.filtered_by_glob("site/blog/*/*.md").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_glob() {
        let items = items(&[]);
        let api = CollectionApi::new(&items);

        assert!(matches!(
            api.filtered_by_glob("site/[blog"),
            Err(PipelineError::Glob(..))
        ));
    }

    #[test]
    fn test_all_returns_everything() {
        let items = items(&["site/a.md", "site/b.md"]);
        assert_eq!(CollectionApi::new(&items).all().len(), 2);
    }
}
