//! modelpack CLI entry point
//!
//! Parses the command line, runs the selected command and turns any failure into a
//! user-friendly message with exit code 1.
//!
//! - `pack` - Package a local folder
//! - `download` - Download a model folder or file
//! - `download-and-pack` - Download and package in one step
//! - `config` - Manage the global configuration

use anyhow::Result;
use clap::Parser;
use modelpack_cli::cli;
use modelpack_cli::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
