//! CLI for the codepoll TOTP code poller.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use codepoll_core::config::{self, CodepollConfig};

use commands::{run_completions, run_man, run_once, run_watch};

/// Top-level CLI for codepoll.
#[derive(Debug, Parser)]
#[command(name = "codepoll")]
#[command(version)]
#[command(about = "codepoll: poll a TOTP server and keep the current codes on screen", long_about = None)]
pub struct Cli {
    /// Server origin serving /codes/ (overrides `server` in config.toml).
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show the codes and refresh them as they rotate, until Ctrl-C.
    Watch {
        /// Append frames instead of clearing the screen between them.
        #[arg(long)]
        no_clear: bool,
    },

    /// Fetch the current codes once and print them.
    Once,

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

/// Config from disk with command-line overrides applied.
fn effective_config(server: Option<String>) -> Result<CodepollConfig> {
    let mut cfg = config::load_or_init()?;
    if let Some(server) = server {
        cfg.server = server;
    }
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Watch { no_clear } => {
                let cfg = effective_config(cli.server)?;
                run_watch(&cfg, !no_clear).await?;
            }
            CliCommand::Once => {
                let cfg = effective_config(cli.server)?;
                run_once(&cfg).await?;
            }
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
