//! mudflow - render a Tera template from a structured data document
//!
//! ```text
//! mudflow [-i data.yaml] yaml template.tera
//! ```
//!
//! The document is read from `-i` or stdin, parsed in the given format, and
//! used as the template context. Rendered text goes to stdout (or `-o`).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::Parser;
use tracing::debug;

use mudflow_cli::{read_input, report_error, LogArgs, Sink};
use mudflow_core::{render_document, DataFormat, Override, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "mudflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render a Tera template from a JSON, YAML, TOML or RON document", long_about = None)]
struct Cli {
    /// Read a file as input instead of stdin
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    input_path: Option<PathBuf>,

    /// Write the rendered text to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Override a context value, e.g. `--set image.tag=v2` (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<Override>,

    /// HTML-escape every interpolated value
    #[arg(long, env = "MUDFLOW_AUTOESCAPE", value_parser = FalseyValueParser::new())]
    autoescape: bool,

    /// Expose a non-map document root to the template as `data`
    #[arg(long)]
    wrap_non_object: bool,

    #[command(flatten)]
    log: LogArgs,

    /// File format of the input (json, yaml, toml, ron)
    #[arg(value_name = "FORMAT")]
    format: DataFormat,

    /// Path to the template file
    template: PathBuf,
}

impl Cli {
    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            autoescape: self.autoescape,
            strict_context: !self.wrap_non_object,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.log.init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let input = read_input(cli.input_path.as_deref())?;
    debug!(format = %cli.format, template = %cli.template.display(), "rendering");

    let rendered = render_document(
        &input,
        cli.format,
        &cli.template,
        &cli.overrides,
        &cli.render_options(),
    )?;

    match cli.output {
        Some(path) => Sink::File(path).write(&rendered),
        None => Sink::Stdout.write(&format!("{rendered}\n")),
    }
}
