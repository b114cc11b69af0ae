// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Common argument: list file path
fn list_arg() -> Arg {
    Arg::new("list")
        .required(true)
        .value_name("LIST")
        .help("Path to the list file")
}

/// Common argument: product identifier
fn product_arg() -> Arg {
    Arg::new("product")
        .long("product")
        .value_name("ID")
        .help("Product identifier (defaults to the list file name)")
}

fn build_cli() -> Command {
    Command::new("packlist")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Packlist Project")
        .about("Read software list files into a distribution description")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log output (-v info, -vv debug)"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .default_value("native")
                .help("Package format to read for"),
        )
        .arg(
            Arg::new("arch")
                .short('a')
                .long("arch")
                .help("CPU architecture to use instead of the host's"),
        )
        .arg(
            Arg::new("sysname")
                .long("sysname")
                .requires("os_release")
                .help("Operating system name to use instead of the host's"),
        )
        .arg(
            Arg::new("os_release")
                .long("os-release")
                .requires("sysname")
                .help("Operating system release to use instead of the host's"),
        )
        .arg(
            Arg::new("define")
                .short('D')
                .long("define")
                .value_name("NAME=VALUE")
                .action(ArgAction::Append)
                .help("Define a variable, overriding any list-file default"),
        )
        .subcommand(
            Command::new("show")
                .about("Show product information from a list file")
                .arg(list_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the whole distribution as JSON"),
                )
                .arg(product_arg()),
        )
        .subcommand(
            Command::new("files")
                .about("List the files a list file installs")
                .arg(list_arg())
                .arg(
                    Arg::new("subpackage")
                        .long("subpackage")
                        .help("Only show files of this subpackage"),
                ),
        )
        .subcommand(
            Command::new("depends")
                .about("List the dependencies declared by a list file")
                .arg(list_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Check that a list file describes a buildable distribution")
                .arg(list_arg())
                .arg(product_arg())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Treat list-file warnings as errors"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

/// Render the man page for `cmd` into `dir`, returning the written path
fn write_man_page(cmd: Command, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let page = dir.join(format!("{}.1", cmd.get_name()));
    let mut out = fs::File::create(&page)?;
    Man::new(cmd).render(&mut out)?;
    Ok(page)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/cli.rs");

    let Some(manifest_dir) = env::var_os("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set, skipping man page");
        return;
    };

    let man_dir = PathBuf::from(manifest_dir).join("man");
    if let Err(e) = write_man_page(build_cli(), &man_dir) {
        println!("cargo:warning=Man page not generated in {}: {}", man_dir.display(), e);
    }
}
