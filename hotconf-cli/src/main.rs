//! Main entry point for the hotconf CLI.
//!
//! Commands:
//! - `show`: Print the merged configuration for a name
//! - `paths`: Show where a configuration would be loaded from
//! - `watch`: Print a configuration again after every reload

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Parse CLI arguments; usage errors exit with the invalid-arguments code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 4 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Initialize logging based on verbosity
    hotconf::init_logger(cli.verbose, cli.quiet);

    let global = cli.global_options();

    // Execute the command
    let result = match cli.command {
        cli::Command::Show(cmd) => cmd.execute(&global),
        cli::Command::Paths(cmd) => cmd.execute(&global),
        cli::Command::Watch(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
