//! Crosslint CLI entry point.

use clap::Parser;
use crosslint::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Analyze(args) => report(cli::run_analyze(&args)),
        Commands::CrossFile(args) => report(cli::run_cross_file(&args)),
        Commands::Security(args) => report(cli::run_security(&args)),
        Commands::Functions(args) => report(cli::run_functions(&args)),
    };

    std::process::exit(exit_code);
}

fn report(result: anyhow::Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}
