//! Front matter parsing for content files and layouts.
//!
//! YAML front matter is delimited by `---` lines, TOML by `+++` lines. Both
//! are normalized into a JSON object so templates see one value model.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("invalid YAML front matter")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML front matter")]
    Toml(#[from] toml::de::Error),

    #[error("front matter must be a mapping")]
    NotMapping,
}

/// Delimiter types for front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterFormat {
    /// YAML front matter delimited by `---`.
    Yaml,
    /// TOML front matter delimited by `+++`.
    Toml,
}

impl FrontMatterFormat {
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Parsed front matter keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter(Map<String, Value>);

impl FrontMatter {
    pub fn data(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn layout(&self) -> Option<&str> {
        self.get_str("layout").filter(|s| !s.is_empty())
    }

    pub fn permalink(&self) -> Option<&str> {
        self.get_str("permalink")
    }

    pub fn date(&self) -> Option<&Value> {
        self.get("date")
    }

    pub fn is_draft(&self) -> bool {
        self.get("draft").and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Split content into front matter and body.
///
/// The opening delimiter must be the first line; the closing delimiter must
/// sit alone on its own line.
pub fn split_front_matter(content: &str) -> Option<(FrontMatterFormat, &str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let (format, rest) = if let Some(rest) = content.strip_prefix("---") {
        (FrontMatterFormat::Yaml, rest)
    } else if let Some(rest) = content.strip_prefix("+++") {
        (FrontMatterFormat::Toml, rest)
    } else {
        return None;
    };
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let delimiter = format.delimiter();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            return Some((format, &rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

/// Parse front matter, returning it with the remaining body.
///
/// Content without front matter yields an empty mapping and the full text.
pub fn parse_front_matter(content: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let Some((format, raw, body)) = split_front_matter(content) else {
        return Ok((FrontMatter::default(), content));
    };
    if raw.trim().is_empty() {
        return Ok((FrontMatter::default(), body));
    }

    let value = match format {
        FrontMatterFormat::Yaml => serde_yaml::from_str::<Value>(raw)?,
        FrontMatterFormat::Toml => toml_to_json(toml::from_str::<toml::Value>(raw)?),
    };

    match value {
        Value::Object(map) => Ok((FrontMatter(map), body)),
        Value::Null => Ok((FrontMatter::default(), body)),
        _ => Err(FrontMatterError::NotMapping),
    }
}

/// Convert TOML into JSON, rendering datetimes as their TOML string form.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
