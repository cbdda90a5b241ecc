//! Building the template context from a document and `--set` overrides.

use std::str::FromStr;

use serde_json::{Map, Value};
use tera::Context;
use tracing::debug;

use crate::document::value_kind;
use crate::error::{MudflowError, Result};

/// Options controlling how a document becomes a context and how it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// HTML-escape every interpolated value.
    pub autoescape: bool,
    /// Reject documents whose root is not a map. When false, such roots are
    /// exposed to the template as `data`.
    pub strict_context: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            autoescape: false,
            strict_context: true,
        }
    }
}

/// A single `KEY=VALUE` assignment applied on top of the document.
///
/// The key is a dot-separated path. The value is parsed as JSON when
/// possible (`true`, `3`, `[1,2]`, `"quoted"`), otherwise taken verbatim as a
/// string.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub path: Vec<String>,
    pub value: Value,
}

impl Override {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || MudflowError::InvalidOverride(raw.to_string());
        let (key, value) = raw.split_once('=').ok_or_else(invalid)?;
        let path: Vec<String> = key.trim().split('.').map(str::to_string).collect();
        if path.iter().any(|segment| segment.is_empty()) {
            return Err(invalid());
        }
        let value =
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        Ok(Self { path, value })
    }
}

impl FromStr for Override {
    type Err = MudflowError;

    fn from_str(s: &str) -> Result<Self> {
        Override::parse(s)
    }
}

/// Apply overrides in order; later ones win.
pub fn apply_overrides(document: &mut Value, overrides: &[Override]) {
    for ov in overrides {
        debug!(key = %ov.path.join("."), "applying override");
        insert_at(document, &ov.path, ov.value.clone());
    }
}

/// Set `value` at `path`, turning anything in the way into a map.
fn insert_at(slot: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *slot = value;
        return;
    };
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        insert_at(map.entry(head.clone()).or_insert(Value::Null), rest, value);
    }
}

/// Convert a document into a Tera context.
pub fn build_context(document: Value, options: &RenderOptions) -> Result<Context> {
    let document = match document {
        Value::Object(_) => document,
        other if options.strict_context => {
            return Err(MudflowError::InvalidContext(value_kind(&other)));
        }
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            Value::Object(map)
        }
    };
    Ok(Context::from_value(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_override_parses_json_values() {
        let ov = Override::parse("replicas=3").unwrap();
        assert_eq!(ov.path, ["replicas"]);
        assert_eq!(ov.value, json!(3));

        let ov = Override::parse("flags=[\"a\",\"b\"]").unwrap();
        assert_eq!(ov.value, json!(["a", "b"]));
    }

    #[test]
    fn test_override_falls_back_to_string() {
        let ov = Override::parse("image.tag=v1.2.3").unwrap();
        assert_eq!(ov.path, ["image", "tag"]);
        assert_eq!(ov.value, json!("v1.2.3"));

        let ov = Override::parse("empty=").unwrap();
        assert_eq!(ov.value, json!(""));
    }

    #[test]
    fn test_override_keeps_equals_in_value() {
        let ov = Override::parse("query=a=b").unwrap();
        assert_eq!(ov.value, json!("a=b"));
    }

    #[test]
    fn test_override_rejects_malformed_keys() {
        for raw in ["novalue", "=1", "a..b=1", ".a=1", "a.=1"] {
            assert!(
                matches!(Override::parse(raw), Err(MudflowError::InvalidOverride(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_apply_overrides_creates_nested_maps() {
        let mut doc = json!({"name": "web"});
        apply_overrides(&mut doc, &[Override::parse("image.tag=v2").unwrap()]);
        assert_eq!(doc, json!({"name": "web", "image": {"tag": "v2"}}));
    }

    #[test]
    fn test_apply_overrides_replaces_scalars_and_later_wins() {
        let mut doc = json!({"image": "nginx"});
        let overrides = [
            Override::parse("image.tag=v1").unwrap(),
            Override::parse("image.tag=v2").unwrap(),
        ];
        apply_overrides(&mut doc, &overrides);
        assert_eq!(doc, json!({"image": {"tag": "v2"}}));
    }

    #[test]
    fn test_apply_overrides_on_null_document() {
        let mut doc = Value::Null;
        apply_overrides(&mut doc, &[Override::parse("a=1").unwrap()]);
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn test_build_context_rejects_non_map_root() {
        let err = build_context(json!([1, 2, 3]), &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, MudflowError::InvalidContext("array")));
    }

    #[test]
    fn test_build_context_wraps_non_map_root() {
        let options = RenderOptions {
            strict_context: false,
            ..RenderOptions::default()
        };
        let ctx = build_context(json!([1, 2, 3]), &options).unwrap();
        assert_eq!(ctx.get("data"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_build_context_exposes_top_level_keys() {
        let ctx = build_context(json!({"a": {"b": 1}}), &RenderOptions::default()).unwrap();
        assert_eq!(ctx.get("a"), Some(&json!({"b": 1})));
    }
}
