//! Format-to-format conversion of data documents.
//!
//! JSON and YAML input headed for JSON, YAML or RON is streamed from
//! deserializer to serializer with `serde_transcode`, so no intermediate tree
//! is built. Everything else goes through the document model: TOML output
//! must see the whole table to order values before sub-tables, TOML
//! datetimes need converting, and RON input keeps variant names only through
//! the document parser.

use serde::Deserializer;
use tracing::debug;

use crate::document::{parse_document, write_document};
use crate::error::{MudflowError, Result};
use crate::format::DataFormat;

/// Output formats with a streaming serializer.
#[derive(Debug, Clone, Copy)]
enum StreamTarget {
    Json,
    Yaml,
    Ron,
}

impl StreamTarget {
    fn format(self) -> DataFormat {
        match self {
            StreamTarget::Json => DataFormat::Json,
            StreamTarget::Yaml => DataFormat::Yaml,
            StreamTarget::Ron => DataFormat::Ron,
        }
    }
}

/// Convert `input` from one format to another.
pub fn transcode(input: &str, from: DataFormat, to: DataFormat) -> Result<String> {
    debug!(%from, %to, bytes = input.len(), "transcoding document");
    let target = match to {
        DataFormat::Json => StreamTarget::Json,
        DataFormat::Yaml => StreamTarget::Yaml,
        DataFormat::Ron => StreamTarget::Ron,
        DataFormat::Toml => return via_document(input, from, to),
    };

    match from {
        DataFormat::Json => {
            let mut de = serde_json::Deserializer::from_str(input);
            let out = stream(&mut de, from, target)?;
            de.end().map_err(|e| MudflowError::de(from, e))?;
            Ok(out)
        }
        DataFormat::Yaml if !input.trim().is_empty() => {
            stream(serde_yaml::Deserializer::from_str(input), from, target)
        }
        DataFormat::Yaml | DataFormat::Toml | DataFormat::Ron => via_document(input, from, to),
    }
}

fn via_document(input: &str, from: DataFormat, to: DataFormat) -> Result<String> {
    let document = parse_document(input, from)?;
    write_document(&document, to)
}

/// Drive `de` straight into a serializer for `target`.
///
/// Errors raised by either side surface through the serializer, so they are
/// reported against the input format: a failure mid-stream almost always
/// means the input did not parse.
fn stream<'de, D>(de: D, from: DataFormat, target: StreamTarget) -> Result<String>
where
    D: Deserializer<'de>,
{
    let to = target.format();
    let mut buf = Vec::new();
    match target {
        StreamTarget::Json => {
            let mut ser = serde_json::Serializer::pretty(&mut buf);
            serde_transcode::transcode(de, &mut ser).map_err(|e| MudflowError::de(from, e))?;
        }
        StreamTarget::Yaml => {
            let mut ser = serde_yaml::Serializer::new(&mut buf);
            serde_transcode::transcode(de, &mut ser).map_err(|e| MudflowError::de(from, e))?;
            ser.into_inner().map_err(|e| MudflowError::ser(to, e))?;
        }
        StreamTarget::Ron => {
            let mut ser = ron::Serializer::new(&mut buf, Some(ron::ser::PrettyConfig::default()))
                .map_err(|e| MudflowError::ser(to, e))?;
            serde_transcode::transcode(de, &mut ser).map_err(|e| MudflowError::de(from, e))?;
        }
    }

    let mut out = String::from_utf8(buf).map_err(|e| MudflowError::ser(to, e))?;
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}
