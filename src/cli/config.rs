//! Manage the global modelpack configuration.
//!
//! The global configuration file holds host endpoints, tool locations and the
//! default publisher. It lives at `~/.modelpack/config.toml` unless `--config` or
//! `MODELPACK_CONFIG` says otherwise.
//!
//! # Examples
//!
//! ```bash
//! modelpack config init            # write an example file
//! modelpack config init --force    # overwrite an existing file
//! modelpack config show            # print the effective configuration
//! modelpack config                 # same as show
//! modelpack config path            # print the file location
//! ```
//!
//! # File Structure
//!
//! ```toml
//! huggingface_endpoint = "https://huggingface.co"
//! github_api_endpoint = "https://api.github.com"
//! github_raw_endpoint = "https://raw.githubusercontent.com"
//! user_agent = "ModelPackagingTool/1.0"
//! makeappx_path = 'C:\Program Files (x86)\Windows Kits\10\bin\10.0.22621.0\x64\makeappx.exe'
//! default_publisher = "Contoso"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::config::GlobalConfig;

/// Command to manage the global configuration.
#[derive(Args)]
pub struct ConfigCommand {
    /// Configuration operation to perform
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write an example configuration file.
    ///
    /// Refuses to overwrite an existing file unless `--force` is given.
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration (default).
    Show,

    /// Print the location of the configuration file.
    Path,
}

impl ConfigCommand {
    /// Execute the config command against `config_path` or the default location
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let path = match config_path {
            Some(path) => path,
            None => GlobalConfig::resolve_path()?,
        };

        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(&path, force).await.map(|_| ()),
            Some(ConfigSubcommands::Show) | None => Self::show(&path).await,
            Some(ConfigSubcommands::Path) => {
                println!("{}", path.display());
                Ok(())
            }
        }
    }

    async fn init(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            println!("{} Config already exists at: {}", "✗".red(), path.display());
            println!("   Use --force to overwrite");
            return Ok(false);
        }

        let config = GlobalConfig::init_example();
        config.save_to(path).await?;

        println!("{} Created config at: {}", "✓".green(), path.display());
        println!("\n{}", toml::to_string_pretty(&config)?);
        println!("{}", "Next steps:".yellow());
        println!("  Set makeappx_path / signtool_path if the Windows SDK is not on PATH");
        println!("  Set default_publisher to the publisher used for your packages");
        Ok(true)
    }

    async fn show(path: &Path) -> Result<()> {
        let config = GlobalConfig::load_with_optional(Some(path.to_path_buf())).await?;

        println!("{}", "Global Configuration".bold());
        println!("Location: {}\n", path.display());

        if config == GlobalConfig::default() {
            println!("No settings configured, using defaults.");
            println!("\n{}", "Tip:".yellow());
            println!("  Run 'modelpack config init' to create an example configuration");
        } else {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Ok(())
    }
}
