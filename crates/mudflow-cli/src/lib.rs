//! Pieces shared by the `mudflow` and `mudflow-transcode` binaries.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::Args;
use owo_colors::{OwoColorize, Stream, Style};
use tracing::{info, Level};

use mudflow_core::MudflowError;

/// Logging flags common to both binaries.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Enable verbose (debug) logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "MUDFLOW_LOG_JSON", value_parser = FalseyValueParser::new())]
    pub json_logs: bool,
}

impl LogArgs {
    pub fn init(&self) {
        let level = if self.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        };
        mudflow_core::init_tracing(self.json_logs, level);
    }
}

/// Read the whole input document from `path`, or from stdin when `None`.
pub fn read_input(path: Option<&Path>) -> mudflow_core::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|error| MudflowError::Io {
            path: path.to_path_buf(),
            error,
        }),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(MudflowError::Stdin)?;
            Ok(buf)
        }
    }
}

/// Where finished output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
}

impl Sink {
    /// Write `text` unchanged.
    pub fn write(&self, text: &str) -> Result<()> {
        match self {
            Sink::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|_| stdout.flush())
                    .context("Failed to write to stdout")?;
            }
            Sink::File(path) => {
                std::fs::write(path, text)
                    .with_context(|| format!("Failed to write output to {}", path.display()))?;
                info!(path = %path.display(), bytes = text.len(), "wrote output");
            }
        }
        Ok(())
    }
}

/// Print `err` (with its context chain) to stderr as `error: <message>`.
pub fn report_error(err: &anyhow::Error) {
    let style = Style::new().red().bold();
    eprintln!(
        "{} {:#}",
        "error:".if_supports_color(Stream::Stderr, |text| text.style(style)),
        err
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/no/such/input.json"))).unwrap_err();
        assert!(matches!(err, MudflowError::Io { .. }));
        assert!(err.to_string().contains("/no/such/input.json"));
    }

    #[test]
    fn test_file_sink_writes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        Sink::File(path.clone()).write("no trailing newline").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "no trailing newline");
    }

    #[test]
    fn test_file_sink_reports_path_on_failure() {
        let err = Sink::File(PathBuf::from("/no/such/dir/out.txt"))
            .write("x")
            .unwrap_err();
        assert!(err.to_string().contains("/no/such/dir/out.txt"));
    }
}
