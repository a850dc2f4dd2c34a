//! Minification utilities for HTML and CSS.
//!
//! HTML goes through `minify_html`; standalone stylesheets through
//! `lightningcss`, the engine `minify_html` itself uses for inline styles.

use crate::pipeline::PipelineError;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// HTML
// ============================================================================

/// Leading doctype declaration, in any casing and with any public/system id.
static RE_DOCTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t\r\n]*<![dD][oO][cC][tT][yY][pP][eE][^>]*>").unwrap()
});

const SHORT_DOCTYPE: &str = "<!doctype html>";

/// Minify an HTML document.
///
/// Collapses whitespace, strips comments, and rewrites any doctype to the
/// short HTML5 form.
pub fn minify_html(html: &str) -> Result<String, PipelineError> {
    let html = RE_DOCTYPE.replace(html, SHORT_DOCTYPE);

    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;

    let minified = minify_html::minify(html.as_bytes(), &cfg);
    Ok(String::from_utf8(minified)?)
}

// ============================================================================
// CSS
// ============================================================================

/// Minify a stylesheet with the default `lightningcss` options.
pub fn minify_css(css: &str) -> Result<String, PipelineError> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| PipelineError::Css(e.to_string()))?;

    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| PipelineError::Css(e.to_string()))?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| PipelineError::Css(e.to_string()))?;

    Ok(printed.code)
}

// ============================================================================
// Tests
// ============================================================================
