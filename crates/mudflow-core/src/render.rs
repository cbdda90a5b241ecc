//! Tera template rendering.

use std::path::Path;

use tera::{Context, Tera};
use tracing::debug;

use crate::context::RenderOptions;
use crate::error::{MudflowError, Result};

/// Name under which inline templates are registered.
const INLINE_TEMPLATE_NAME: &str = "<inline>";

/// Renders single templates against a prepared context.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render template source held in memory.
    pub fn render_str(&self, template: &str, context: &Context) -> Result<String> {
        self.render_named(INLINE_TEMPLATE_NAME, template, context)
    }

    /// Read and render a template file. Errors name the template by its file
    /// name.
    pub fn render_file(&self, path: &Path, context: &Context) -> Result<String> {
        let source = std::fs::read_to_string(path).map_err(|e| MudflowError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| INLINE_TEMPLATE_NAME.to_string());
        self.render_named(&name, &source, context)
    }

    fn render_named(&self, name: &str, source: &str, context: &Context) -> Result<String> {
        debug!(template = name, bytes = source.len(), "rendering template");
        let mut tera = Tera::default();
        // Tera escapes .html/.htm/.xml by default; the flag alone decides here.
        if self.options.autoescape {
            tera.autoescape_on(vec![""]);
        } else {
            tera.autoescape_on(vec![]);
        }
        tera.add_raw_template(name, source)?;
        Ok(tera.render(name, context)?)
    }
}
