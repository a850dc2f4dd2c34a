//! Errors raised by registered callbacks and the render pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a transform, filter, collection, or layout lookup.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid glob pattern `{0}`")]
    Glob(String, #[source] globset::Error),

    #[error("minified output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("css minification failed: {0}")]
    Css(String),

    #[error("transform `{name}` failed on `{}`", path.display())]
    Transform {
        name: String,
        path: PathBuf,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("layout `{0}` not found in includes directory")]
    UnknownLayout(String),

    #[error("layout chain starting at `{0}` is deeper than {1} levels")]
    LayoutDepth(String, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_display() {
        let err = PipelineError::Transform {
            name: "htmlmin".into(),
            path: PathBuf::from("_site/index.html"),
            source: Box::new(PipelineError::Css("unexpected token".into())),
        };
        let display = err.to_string();
        assert!(display.contains("htmlmin"));
        assert!(display.contains("_site/index.html"));

        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_glob_error_display() {
        let source = globset::Glob::new("site/[blog").unwrap_err();
        let err = PipelineError::Glob("site/[blog".into(), source);
        assert!(err.to_string().contains("site/[blog"));
    }
}
