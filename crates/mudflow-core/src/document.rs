//! Parsing and writing data documents.
//!
//! Every supported format is loaded into a single document model, a
//! [`serde_json::Value`] with insertion-ordered maps. TOML has no null and
//! carries a native datetime type, so TOML input is converted through
//! [`toml::Value`] with datetimes stringified. RON keeps enum variant names
//! and struct fields through [`crate::ron_document`].

use serde_json::Value;
use tracing::debug;

use crate::error::{MudflowError, Result};
use crate::format::DataFormat;
use crate::ron_document::parse_ron;

/// Parse `input` into the document model.
pub fn parse_document(input: &str, format: DataFormat) -> Result<Value> {
    debug!(%format, bytes = input.len(), "parsing document");
    match format {
        DataFormat::Json => {
            serde_json::from_str::<Value>(input).map_err(|e| MudflowError::de(format, e))
        }
        DataFormat::Yaml => {
            if input.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_yaml::from_str::<Value>(input).map_err(|e| MudflowError::de(format, e))
        }
        DataFormat::Toml => {
            let table: toml::Table =
                toml::from_str(input).map_err(|e| MudflowError::de(format, e))?;
            Ok(toml_value_to_json(toml::Value::Table(table)))
        }
        DataFormat::Ron => parse_ron(input).map_err(|e| MudflowError::de(format, e)),
    }
}

/// Serialize a document in `format`. The output always ends with a newline.
pub fn write_document(value: &Value, format: DataFormat) -> Result<String> {
    let mut out = match format {
        DataFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| MudflowError::ser(format, e))?
        }
        DataFormat::Yaml => serde_yaml::to_string(value).map_err(|e| MudflowError::ser(format, e))?,
        DataFormat::Toml => {
            if !value.is_object() {
                return Err(MudflowError::ser(
                    format,
                    format!("top-level value must be a table, got {}", value_kind(value)),
                ));
            }
            toml::to_string_pretty(value).map_err(|e| MudflowError::ser(format, e))?
        }
        DataFormat::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .map_err(|e| MudflowError::ser(format, e))?,
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Short name for the JSON type of `value`.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// Convert a [`toml::Value`] into the document model.
pub(crate) fn toml_value_to_json(val: toml::Value) -> Value {
    match val {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            // NaN and infinities have no JSON representation
            .unwrap_or_else(|| Value::String(f.to_string())),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_value_to_json).collect()),
        toml::Value::Table(tbl) => Value::Object(
            tbl.into_iter()
                .map(|(k, v)| (k, toml_value_to_json(v)))
                .collect(),
        ),
    }
}
