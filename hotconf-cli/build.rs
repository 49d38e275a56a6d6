//! Build script for hotconf-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

fn name_arg() -> Arg {
    Arg::new("name")
        .value_name("NAME")
        .required(true)
        .help("Configuration name (case-insensitive)")
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_parser(["yaml", "json"])
        .default_value("yaml")
        .help("Output format")
}

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("hotconf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect layered YAML configuration")
        .long_about(
            "Load YAML configuration the way services using the hotconf library do: \
             a base file from the search path with override, tests and \
             environment-selected overlays merged on top",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .help("Directory holding overlays (and base files unless --search-dir is given)")
                .value_name("PATH")
                .global(true)
                .env("HOTCONF_CONFIG_DIR"),
        )
        .arg(
            Arg::new("search-dir")
                .long("search-dir")
                .help("Directory searched for base files; may be repeated, first match wins")
                .value_name("PATH")
                .global(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("no-watch")
                .long("no-watch")
                .help("Disable file watching")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("show")
                .about("Print the merged configuration for a name")
                .arg(name_arg())
                .arg(format_arg())
                .arg(
                    Arg::new("report")
                        .long("report")
                        .help("Also print which files contributed")
                        .action(ArgAction::SetTrue),
                ),
            Command::new("paths")
                .about("Show where a configuration would be loaded from")
                .arg(name_arg()),
            Command::new("watch")
                .about("Print a configuration again after every reload")
                .arg(name_arg())
                .arg(format_arg())
                .arg(
                    Arg::new("count")
                        .long("count")
                        .value_name("N")
                        .help("Exit after this many reloads"),
                ),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("hotconf.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
