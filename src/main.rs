// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Completions { shell } => commands::cmd_completions(shell),
        Commands::Show { list, json, product } => {
            let options = commands::target_options(&cli.target)?;
            commands::cmd_show(&list, json, product.as_deref(), options)
        }
        Commands::Files { list, subpackage } => {
            let options = commands::target_options(&cli.target)?;
            commands::cmd_files(&list, subpackage.as_deref(), options)
        }
        Commands::Depends { list } => {
            let options = commands::target_options(&cli.target)?;
            commands::cmd_depends(&list, options)
        }
        Commands::Check { list, product, strict } => {
            let options = commands::target_options(&cli.target)?;
            commands::cmd_check(&list, product.as_deref(), strict, options)
        }
    }
}
