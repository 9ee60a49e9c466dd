#![warn(missing_docs)]
//! # promosaic binary
//!
//! Headless entry point: loads an image, optionally replays a gesture script,
//! and writes the flattened result.
//!
//! ```text
//! promosaic <input> [script.json] [--out <path>]
//! promosaic --version
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use promosaic_app::{AppError, GestureScript, MosaicSession, config_from_env, init_run_logger};
use promosaic_io::{ImageFileProvider, JpegFileSink};

/// Headless mosaic editor.
#[derive(Parser, Debug)]
#[command(
    name = "promosaic",
    version = promosaic_app::APP_VERSION,
    about = "Obscure regions of a photo and save the flattened result"
)]
struct Cli {
    /// Source image to edit.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// JSON gesture script replayed before saving.
    #[arg(value_name = "SCRIPT.json")]
    script: Option<PathBuf>,

    /// Output path; defaults to `<stem>_mosaic.<ext>` next to the input.
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,
}

/// CLI entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("stage=main action=failed error={error}");
            eprintln!("promosaic: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf, AppError> {
    let log_dir = cli
        .input
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    if let Err(error) = init_run_logger(&log_dir) {
        eprintln!("promosaic: file logging disabled: {error}");
    }
    log::info!("stage=startup action=begin version={}", promosaic_app::app_version());

    let mut session = MosaicSession::new(config_from_env())?;
    session.load_source(&ImageFileProvider, &cli.input)?;

    if let Some(script_path) = &cli.script {
        let raw = fs::read_to_string(script_path).map_err(|error| AppError::Io {
            path: script_path.display().to_string(),
            reason: error.to_string(),
        })?;
        GestureScript::from_json_str(&raw)?.replay(&mut session)?;
    }

    if let Some(output) = &cli.out {
        session.set_output_path(output);
    }
    let sink = JpegFileSink::default();
    Ok(session.save(&sink)?)
}

#[cfg(test)]
mod tests {
    //! Unit tests for command-line parsing.

    use super::*;

    #[test]
    fn parses_input_script_and_output() {
        let cli = Cli::try_parse_from(["promosaic", "in.jpg", "edits.json", "--out", "out.jpg"])
            .expect("arguments should parse");
        assert_eq!(cli.input, PathBuf::from("in.jpg"));
        assert_eq!(cli.script, Some(PathBuf::from("edits.json")));
        assert_eq!(cli.out, Some(PathBuf::from("out.jpg")));
    }

    #[test]
    fn input_is_required_and_extra_positionals_rejected() {
        assert!(Cli::try_parse_from(["promosaic"]).is_err());
        assert!(Cli::try_parse_from(["promosaic", "a.jpg", "b.json", "c"]).is_err());
    }
}
