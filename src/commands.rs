// src/commands.rs
//! Command handlers for the packlist CLI

use crate::cli::{Cli, TargetArgs};
use anyhow::{bail, Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use packlist::{Environment, PackageFormat, ParseOptions, ParseOutput, Platform};
use std::io;
use std::path::Path;
use tracing::info;

/// Build parse options from the global target arguments
pub fn target_options(args: &TargetArgs) -> Result<ParseOptions> {
    let format: PackageFormat = args.format.parse()?;

    let platform = match (&args.sysname, &args.os_release) {
        (Some(sysname), Some(release)) => {
            let host = Platform::detect()?;
            Platform::new(sysname, release, &host.machine)
        }
        _ => Platform::detect()?,
    };
    let platform = match &args.arch {
        Some(arch) => platform.with_machine(arch),
        None => platform,
    };

    let mut env = Environment::from_os();
    for define in &args.defines {
        if !env.apply_assignment(define) {
            bail!("Invalid definition \"{}\", expected NAME=VALUE", define);
        }
    }

    info!("Target {} ({})", platform, format);
    Ok(ParseOptions::new(platform, format).with_env(env))
}

fn read_list(list: &Path, options: &ParseOptions) -> Result<ParseOutput> {
    packlist::parse_with_options(list, options)
        .with_context(|| format!("Failed to read list file {}", list.display()))
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("{:<12}{}", format!("{}:", label), value);
    }
}

/// Print a summary of the distribution, or the whole model as JSON
pub fn cmd_show(list: &Path, json: bool, product: Option<&str>, options: ParseOptions) -> Result<()> {
    let options = match product {
        Some(product) => options.with_prodname(product),
        None => options,
    };
    let output = read_list(list, &options)?;
    let dist = &output.dist;

    if json {
        println!("{}", serde_json::to_string_pretty(dist)?);
        return Ok(());
    }

    print_field("Product", &dist.product);
    print_field("Id", &dist.prodname);
    if !dist.version.is_empty() {
        println!("{:<12}{} ({})", "Version:", dist.version, dist.vernumber);
    }
    print_field("Release", &dist.release);
    print_field("Copyright", &dist.copyright);
    print_field("Vendor", &dist.vendor);
    print_field("Packager", &dist.packager);
    print_field("License", &dist.license);
    print_field("Readme", &dist.readme);
    print_field("Target", &format!("{} ({})", options.platform, options.format));

    for description in dist.descriptions_for(None) {
        for line in description.text.lines() {
            println!("  {}", line);
        }
    }

    for subpackage in &dist.subpackages {
        println!();
        println!("Subpackage {}:", subpackage);
        for description in dist.descriptions_for(Some(subpackage.as_str())) {
            for line in description.text.lines() {
                println!("  {}", line);
            }
        }
        println!("  {} files", dist.files_for(Some(subpackage.as_str())).count());
    }

    println!();
    println!(
        "{} files, {} dependencies, {} commands",
        dist.files.len(),
        dist.depends.len(),
        dist.commands.len()
    );
    if !output.diagnostics.is_empty() {
        println!("{} warnings", output.diagnostics.len());
    }

    Ok(())
}

/// Print every file entry, one per line
pub fn cmd_files(list: &Path, subpackage: Option<&str>, options: ParseOptions) -> Result<()> {
    let output = read_list(list, &options)?;

    let files: Vec<_> = match subpackage {
        Some(name) => output.dist.files_for(Some(name)).collect(),
        None => output.dist.files.iter().collect(),
    };

    for file in files {
        match &file.subpackage {
            Some(name) if subpackage.is_none() => println!("{} [{}]", file, name),
            _ => println!("{}", file),
        }
    }
    Ok(())
}

/// Print dependencies and lifecycle commands
pub fn cmd_depends(list: &Path, options: ParseOptions) -> Result<()> {
    let output = read_list(list, &options)?;

    for dep in &output.dist.depends {
        match &dep.subpackage {
            Some(name) => println!("{} [{}]", dep, name),
            None => println!("{}", dep),
        }
    }
    for command in &output.dist.commands {
        let first = command.command.lines().next().unwrap_or_default();
        println!("{}: {}", command.command_type, first);
    }
    Ok(())
}

/// Validate a list file, failing on missing metadata
pub fn cmd_check(list: &Path, product: Option<&str>, strict: bool, options: ParseOptions) -> Result<()> {
    let options = match product {
        Some(product) => options.with_prodname(product),
        None => options,
    };
    let output = read_list(list, &options)?;

    output.dist.validate()?;
    if strict && !output.diagnostics.is_empty() {
        bail!(
            "{} has {} warnings",
            list.display(),
            output.diagnostics.len()
        );
    }

    println!(
        "{}: {} {}-{} ({} files)",
        list.display(),
        output.dist.product,
        output.dist.version,
        output.dist.release,
        output.dist.files.len()
    );
    Ok(())
}

/// Write a completion script for `shell` to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "packlist", &mut io::stdout());
    Ok(())
}
