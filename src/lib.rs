pub mod config;
pub mod pipeline;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

pub use pipeline::extraction::{process_image, render_report, ExtractionError, ExtractionResult};

/// Command-line entry: `rxscan <imagePath>`.
pub fn run() -> ExitCode {
    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let Some(path) = image_path_arg(std::env::args_os().skip(1)) else {
        eprintln!("Usage: {} <imagePath>", config::APP_NAME);
        return ExitCode::FAILURE;
    };

    match process_image(&path) {
        Ok(result) => {
            print!("{}", render_report(&result));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Extraction failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Exactly one positional argument, or nothing.
fn image_path_arg(args: impl IntoIterator<Item = OsString>) -> Option<PathBuf> {
    let mut args = args.into_iter();
    let path = args.next()?;
    if args.next().is_some() {
        return None;
    }
    Some(PathBuf::from(path))
}
