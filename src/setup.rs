//! Site pipeline configuration.
//!
//! Registers the site's transforms, filters, collections and passthrough
//! copies with the build engine. Every callback here is stateless.

use crate::compiler::meta::ContentItem;
use crate::config::SiteConfig;
use crate::pipeline::{CollectionApi, PipelineError, Registry};
use crate::utils::{date, minify};
use std::{collections::HashMap, path::Path};
use tera::Value;

/// Copied verbatim to the output tree.
pub const ASSETS_DIR: &str = "site/assets";

/// Blog posts: one directory per post under `site/blog/`.
pub const POSTS_GLOB: &str = "site/blog/*/*.md";

/// Markdown, Tera templates, and PNG images copied as-is.
pub const TEMPLATE_FORMATS: &[&str] = &["md", "tera", "png"];

/// Populate `registry` with the site's pipeline.
pub fn configure(registry: &mut Registry, config: &SiteConfig) {
    if config.build.minify {
        registry.add_transform("htmlmin", html_min);
    }

    registry
        .add_filter("cssmin", css_min)
        .add_filter("htmlDateString", html_date_string)
        .add_collection("posts", posts)
        .add_passthrough_copy(ASSETS_DIR)
        .set_template_formats(TEMPLATE_FORMATS);
}

/// Minify `.html` artifacts; anything else passes through unchanged.
fn html_min(content: &str, output_path: &Path) -> Result<String, PipelineError> {
    if output_path.to_string_lossy().ends_with(".html") {
        minify::minify_html(content)
    } else {
        Ok(content.to_string())
    }
}

fn css_min(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let css = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("cssmin filter expects a string"))?;
    let minified = minify::minify_css(css).map_err(|e| tera::Error::chain("cssmin failed", e))?;
    Ok(Value::String(minified))
}

fn html_date_string(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let parsed = match value {
        Value::String(s) => date::parse_date(s),
        Value::Number(n) => n.as_i64().and_then(date::from_timestamp),
        _ => None,
    };
    let dt = parsed
        .ok_or_else(|| tera::Error::msg(format!("htmlDateString: invalid date `{value}`")))?;
    Ok(Value::String(date::html_date_string(&dt)))
}

fn posts(api: &CollectionApi<'_>) -> Result<Vec<ContentItem>, PipelineError> {
    api.filtered_by_glob(POSTS_GLOB)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tera::{Context, Tera};

    fn registry_with(minify: bool) -> Registry {
        let mut config = SiteConfig::default();
        config.build.minify = minify;
        let mut registry = Registry::default();
        configure(&mut registry, &config);
        registry
    }

    /// Render `{{ value | name }}` through a Tera instance bound to `registry`.
    fn apply_filter(registry: &Registry, name: &str, value: Value) -> tera::Result<String> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        registry.register_filters(&mut tera);
        tera.add_raw_template("t", &format!("{{{{ value | {name} }}}}"))?;

        let mut context = Context::new();
        context.insert("value", &value);
        tera.render("t", &context)
    }

    #[test]
    fn test_configure_registers_everything() {
        let registry = registry_with(true);

        assert_eq!(registry.transform_names(), ["htmlmin"]);
        assert_eq!(registry.collection_names(), ["posts"]);
        assert_eq!(registry.filter_names(), ["cssmin", "htmlDateString"]);
        assert_eq!(registry.passthrough_copies(), [PathBuf::from("site/assets")]);
        assert_eq!(registry.template_formats(), ["md", "tera", "png"]);
    }

    #[test]
    fn test_configure_without_minify() {
        let registry = registry_with(false);
        assert!(registry.transform_names().is_empty());
        assert_eq!(registry.filter_names(), ["cssmin", "htmlDateString"]);
    }

    #[test]
    fn test_htmlmin_on_html_path() {
        let registry = registry_with(true);
        let html = "<!DOCTYPE html>\n<html>\n  <body>\n    <!-- nav -->\n    <p>Hello    World</p>\n  </body>\n</html>\n";

        let out = registry
            .apply_transforms(html.into(), Path::new("_site/index.html"))
            .unwrap();

        assert!(!out.contains("<!--"));
        assert!(!out.contains("nav"));
        assert!(!out.contains("\n  "));
        assert!(out.contains("Hello World"));
    }

    #[test]
    fn test_htmlmin_identity_on_other_paths() {
        let registry = registry_with(true);
        let xml = "<feed>\n  <!-- keep -->\n  <title>x</title>\n</feed>\n";

        let out = registry
            .apply_transforms(xml.into(), Path::new("_site/feed.xml"))
            .unwrap();
        assert_eq!(out, xml);
    }

    #[test]
    fn test_cssmin_filter() {
        let registry = registry_with(true);
        let css = "/* header */\nheader {\n  padding: 0px 1em;\n}\n";

        let out = apply_filter(&registry, "cssmin", Value::String(css.into())).unwrap();
        assert!(out.starts_with("header{"));
        assert!(out.contains("padding:0 1em"));
        assert!(!out.contains("/*"));
    }

    #[test]
    fn test_cssmin_rejects_non_string() {
        let registry = registry_with(true);
        assert!(apply_filter(&registry, "cssmin", Value::from(3)).is_err());
    }

    #[test]
    fn test_html_date_string_filter() {
        let registry = registry_with(true);
        let render_date = |v: Value| apply_filter(&registry, "htmlDateString", v);

        assert_eq!(render_date(Value::from("2021-03-05T00:00:00Z")).unwrap(), "2021-03-05");
        assert_eq!(render_date(Value::from("2021-03-05")).unwrap(), "2021-03-05");
        assert_eq!(render_date(Value::from(1_614_902_400)).unwrap(), "2021-03-05");
        assert!(render_date(Value::from("not a date")).is_err());
        assert!(render_date(Value::Bool(true)).is_err());
    }

    #[test]
    fn test_posts_collection() {
        let registry = registry_with(true);
        let items = vec![
            ContentItem::stub("site/blog/foo/index.md"),
            ContentItem::stub("site/about.md"),
        ];

        let collections = registry.build_collections(&items).unwrap();
        let (name, posts) = &collections[1];
        assert_eq!(name, "posts");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].input_path, "site/blog/foo/index.md");
    }
}
