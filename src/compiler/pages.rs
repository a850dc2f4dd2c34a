//! Page rendering: Tera bodies, Markdown conversion, and layout chains.
//!
//! ```text
//! body ──► tera ──► (markdown → html) ──► layout ──► layout ... ──► artifact
//! ```

use super::collect_all_files;
use super::frontmatter::{FrontMatter, parse_front_matter};
use super::meta::{ContentItem, TemplateKind};
use crate::config::SiteConfig;
use crate::pipeline::{PipelineError, Registry};
use anyhow::{Context as _, Result};
use pulldown_cmark::{Options, Parser, html};
use serde_json::{Map, Value};
use std::{collections::HashMap, fs};
use tera::{Context, Tera};

/// Layouts may wrap other layouts at most this deep.
const MAX_LAYOUT_DEPTH: usize = 10;

/// Extension tried when a `layout` name is given without one.
const LAYOUT_EXTENSION: &str = "tera";

/// Template engine loaded with includes and every page body.
pub struct Renderer<'a> {
    tera: Tera,
    /// Front matter of each includes template, keyed by template name.
    layouts: HashMap<String, FrontMatter>,
    config: &'a SiteConfig,
}

impl<'a> Renderer<'a> {
    /// Load includes and item bodies, and bind the registry's filters.
    pub fn new(config: &'a SiteConfig, registry: &Registry, items: &[ContentItem]) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        registry.register_filters(&mut tera);

        let includes_dir = config.includes_dir();
        let mut layouts = HashMap::new();
        let mut templates = Vec::new();

        if includes_dir.is_dir() {
            for path in collect_all_files(&includes_dir) {
                let name = path
                    .strip_prefix(&includes_dir)?
                    .to_string_lossy()
                    .replace('\\', "/");
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let (front_matter, body) = parse_front_matter(&content)
                    .with_context(|| format!("Failed to parse front matter in {}", path.display()))?;

                templates.push((name.clone(), body.to_string()));
                layouts.insert(name, front_matter);
            }
        }

        templates.extend(
            items
                .iter()
                .map(|item| (item.input_path.clone(), item.body.clone())),
        );
        tera.add_raw_templates(templates)
            .context("Failed to load templates")?;

        Ok(Self {
            tera,
            layouts,
            config,
        })
    }

    /// Render one item through its body template and layout chain.
    pub fn render(&self, item: &ContentItem, collections: &Value) -> Result<String> {
        let mut context = self.context_for(item, collections)?;

        let body = self
            .tera
            .render(&item.input_path, &context)
            .with_context(|| format!("Failed to render {}", item.input_path))?;
        let mut content = match item.kind {
            TemplateKind::Markdown => markdown_to_html(&body),
            TemplateKind::Tera => body,
        };

        let mut layout = item.front_matter.layout();
        let mut depth = 0;
        while let Some(name) = layout {
            depth += 1;
            if depth > MAX_LAYOUT_DEPTH {
                return Err(PipelineError::LayoutDepth(
                    item.front_matter.layout().unwrap_or_default().to_string(),
                    MAX_LAYOUT_DEPTH,
                )
                .into());
            }

            let (resolved, front_matter) = self.resolve_layout(name)?;
            context.insert("content", &content);
            content = self
                .tera
                .render(resolved, &context)
                .with_context(|| format!("Failed to render layout {resolved} for {}", item.input_path))?;
            layout = front_matter.layout();
        }

        Ok(content)
    }

    /// Find an includes template by exact name, then with the default extension.
    fn resolve_layout(&self, name: &str) -> Result<(&str, &FrontMatter), PipelineError> {
        self.layouts
            .get_key_value(name)
            .or_else(|| {
                self.layouts
                    .get_key_value(&format!("{name}.{LAYOUT_EXTENSION}"))
            })
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| PipelineError::UnknownLayout(name.to_string()))
    }

    /// Front matter keys at top level, plus `page`, `site` and `collections`.
    fn context_for(&self, item: &ContentItem, collections: &Value) -> Result<Context> {
        let mut data = item.front_matter.data().clone();
        data.insert("page".into(), item.to_value());
        data.insert("site".into(), serde_json::to_value(&self.config.base)?);
        data.insert("collections".into(), collections.clone());

        Ok(Context::from_value(Value::Object(data))?)
    }
}

/// Template view of built collections: `{ name: [item, ...] }`.
pub fn collections_value(collections: &[(String, Vec<ContentItem>)]) -> Value {
    let map: Map<String, Value> = collections
        .iter()
        .map(|(name, items)| {
            let items = items.iter().map(ContentItem::to_value).collect();
            (name.clone(), Value::Array(items))
        })
        .collect();
    Value::Object(map)
}

/// Convert CommonMark (with tables, footnotes, strikethrough, task lists) to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn config_for(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.set_root(root);
        config.build.input = root.join("site");
        config.build.output = root.join("_site");
        config.base.title = "Test Site".into();
        config
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn load(root: &Path, rel: &str, config: &SiteConfig) -> ContentItem {
        let path = root.join(rel);
        let ext = path.extension().unwrap().to_str().unwrap();
        let kind = TemplateKind::from_extension(ext).unwrap();
        ContentItem::load(&path, kind, config).unwrap().unwrap()
    }

    #[test]
    fn test_markdown_to_html() {
        let html = markdown_to_html("# Title\n\nSome *text* and ~~old~~.\n\n| a |\n|---|\n| 1 |\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_render_markdown_with_layout_chain() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "site/_includes/base.tera", "<html><title>{{ title }} | {{ site.title }}</title>{{ content }}</html>");
        write(root, "site/_includes/post.tera", "---\nlayout: base\n---\n<article>{{ content }}</article>");
        write(root, "site/blog/foo/index.md", "---\ntitle: Foo\nlayout: post.tera\n---\n# {{ title }}\n");

        let config = config_for(root);
        let item = load(root, "site/blog/foo/index.md", &config);
        let registry = Registry::default();
        let renderer = Renderer::new(&config, &registry, std::slice::from_ref(&item)).unwrap();

        let html = renderer.render(&item, &Value::Object(Map::new())).unwrap();
        assert_eq!(
            html,
            "<html><title>Foo | Test Site</title><article><h1>Foo</h1>\n</article></html>"
        );
    }

    #[test]
    fn test_render_uses_registered_filters_and_collections() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "site/index.tera",
            "{% for post in collections.posts %}{{ post.url }} {{ post.date | bracket }};{% endfor %}",
        );
        write(root, "site/blog/a/index.md", "---\ndate: 2021-03-05\n---\nA");

        let config = config_for(root);
        let index = load(root, "site/index.tera", &config);
        let post = load(root, "site/blog/a/index.md", &config);
        let items = vec![index, post.clone()];

        let mut registry = Registry::default();
        registry.add_filter(
            "bracket",
            |v: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
                Ok(Value::String(format!("[{}]", v.as_str().unwrap_or_default())))
            },
        );
        let renderer = Renderer::new(&config, &registry, &items).unwrap();
        let collections = collections_value(&[("posts".to_string(), vec![post])]);

        let html = renderer.render(&items[0], &collections).unwrap();
        assert_eq!(html, "/blog/a/ [2021-03-05T00:00:00Z];");
    }

    #[test]
    fn test_markdown_body_is_tera_source() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "site/broken.md", "# Heading {#id}\n");
        write(root, "site/raw.md", "{% raw %}# Heading {#id}{% endraw %}\n");

        let config = config_for(root);
        let registry = Registry::default();

        // `{#` opens a Tera comment, so the bare form does not load
        let broken = load(root, "site/broken.md", &config);
        let err = Renderer::new(&config, &registry, &[broken]).err().unwrap();
        assert!(format!("{err:#}").contains("site/broken.md"));

        let raw = load(root, "site/raw.md", &config);
        let renderer = Renderer::new(&config, &registry, std::slice::from_ref(&raw)).unwrap();
        let html = renderer.render(&raw, &Value::Null).unwrap();
        assert!(html.contains("<h1>Heading {#id}</h1>"));
    }

    #[test]
    fn test_render_unknown_layout() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "site/about.md", "---\nlayout: missing\n---\nAbout");

        let config = config_for(root);
        let item = load(root, "site/about.md", &config);
        let registry = Registry::default();
        let renderer = Renderer::new(&config, &registry, std::slice::from_ref(&item)).unwrap();

        let err = renderer.render(&item, &Value::Null).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnknownLayout(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_render_layout_cycle_bounded() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "site/_includes/loop.tera", "---\nlayout: loop.tera\n---\n{{ content }}");
        write(root, "site/about.md", "---\nlayout: loop\n---\nAbout");

        let config = config_for(root);
        let item = load(root, "site/about.md", &config);
        let registry = Registry::default();
        let renderer = Renderer::new(&config, &registry, std::slice::from_ref(&item)).unwrap();

        let err = renderer.render(&item, &Value::Null).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::LayoutDepth(_, MAX_LAYOUT_DEPTH))
        ));
    }

    #[test]
    fn test_collections_value_shape() {
        let value = collections_value(&[
            ("all".to_string(), vec![ContentItem::stub("site/a.md")]),
            ("posts".to_string(), vec![]),
        ]);

        assert_eq!(value["all"][0]["input_path"], "site/a.md");
        assert_eq!(value["posts"].as_array().unwrap().len(), 0);
    }
}
