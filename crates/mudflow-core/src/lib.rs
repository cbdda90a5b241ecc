//! mudflow core library
//!
//! Loads JSON, YAML, TOML and RON documents, renders Tera templates against
//! them, and converts documents between formats.

pub mod context;
pub mod document;
pub mod error;
pub mod format;
pub mod render;
mod ron_document;
pub mod telemetry;
pub mod transcode;

pub use context::{apply_overrides, build_context, Override, RenderOptions};
pub use document::{parse_document, value_kind, write_document};
pub use error::{MudflowError, Result};
pub use format::DataFormat;
pub use render::Renderer;
pub use telemetry::init_tracing;
pub use transcode::transcode;

/// mudflow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse `input`, apply `overrides`, and render `template` (a file path)
/// against the result.
pub fn render_document(
    input: &str,
    format: DataFormat,
    template: &std::path::Path,
    overrides: &[Override],
    options: &RenderOptions,
) -> Result<String> {
    let mut document = parse_document(input, format)?;
    apply_overrides(&mut document, overrides);
    let context = build_context(document, options)?;
    Renderer::new(options.clone()).render_file(template, &context)
}
