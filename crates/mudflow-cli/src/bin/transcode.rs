//! mudflow-transcode - convert a data document between formats
//!
//! ```text
//! mudflow-transcode config.ron config.yaml
//! cat data.json | mudflow-transcode -f json -t toml - -
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser};

use mudflow_cli::{read_input, report_error, LogArgs, Sink};
use mudflow_core::{transcode, DataFormat};

#[derive(Parser, Debug)]
#[command(name = "mudflow-transcode")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert a data document between JSON, YAML, TOML and RON", long_about = None)]
struct Cli {
    /// Input format (default: inferred from the INPUT extension)
    #[arg(short, long, value_name = "FORMAT")]
    from: Option<DataFormat>,

    /// Output format (default: inferred from the OUTPUT extension)
    #[arg(short, long, value_name = "FORMAT")]
    to: Option<DataFormat>,

    #[command(flatten)]
    log: LogArgs,

    /// Input file, or `-` for stdin
    input: PathBuf,

    /// Output file, or `-` for stdout
    output: PathBuf,
}

fn is_std_stream(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Explicit format, else the one implied by `path`; exits with a usage
/// error when neither is available.
fn resolve_format(explicit: Option<DataFormat>, path: &Path, flag: &str) -> DataFormat {
    explicit
        .or_else(|| DataFormat::from_path(path))
        .unwrap_or_else(|| {
            Cli::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    format!(
                        "cannot infer a format from {:?}; pass {flag} <FORMAT>",
                        path.display().to_string()
                    ),
                )
                .exit()
        })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.log.init();

    let from = resolve_format(cli.from, &cli.input, "--from");
    let to = resolve_format(cli.to, &cli.output, "--to");

    match run(&cli, from, to) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, from: DataFormat, to: DataFormat) -> Result<()> {
    let input_path = (!is_std_stream(&cli.input)).then_some(cli.input.as_path());
    let input = read_input(input_path)?;
    let output = transcode(&input, from, to)?;

    let sink = if is_std_stream(&cli.output) {
        Sink::Stdout
    } else {
        Sink::File(cli.output.clone())
    };
    sink.write(&output)
}
