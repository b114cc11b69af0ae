// src/cli.rs
//! CLI definitions for packlist
//!
//! Global options describe the build target and the effective environment.
//! The command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "packlist")]
#[command(author = "Packlist Project")]
#[command(version)]
#[command(about = "Read software list files into a distribution description", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options that select the platform and environment a list file is read for
#[derive(Args)]
pub struct TargetArgs {
    /// Package format to read for (aix, bsd, deb, inst, osx, pkg, portable,
    /// rpm, setld, slackware, swinstall, native)
    #[arg(short, long, default_value = "native", global = true)]
    pub format: String,

    /// CPU architecture to use instead of the host's
    #[arg(short, long, global = true)]
    pub arch: Option<String>,

    /// Operating system name to use instead of the host's (requires --os-release)
    #[arg(long, requires = "os_release", global = true)]
    pub sysname: Option<String>,

    /// Operating system release to use instead of the host's
    #[arg(long, requires = "sysname", global = true)]
    pub os_release: Option<String>,

    /// Define a variable, overriding any list-file default (NAME=VALUE)
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", global = true)]
    pub defines: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show product information from a list file
    Show {
        /// Path to the list file
        list: PathBuf,

        /// Print the whole distribution as JSON
        #[arg(long)]
        json: bool,

        /// Product identifier (defaults to the list file name)
        #[arg(long)]
        product: Option<String>,
    },

    /// List the files a list file installs
    Files {
        /// Path to the list file
        list: PathBuf,

        /// Only show files of this subpackage
        #[arg(long)]
        subpackage: Option<String>,
    },

    /// List the dependencies declared by a list file
    Depends {
        /// Path to the list file
        list: PathBuf,
    },

    /// Check that a list file describes a buildable distribution
    Check {
        /// Path to the list file
        list: PathBuf,

        /// Product identifier (defaults to the list file name)
        #[arg(long)]
        product: Option<String>,

        /// Treat list-file warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
