use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use path_watcher::cli::{Cli, Commands};
use path_watcher::{WatcherContext, commands};
use std::io;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.clone().unwrap_or(Commands::Watch) {
        Commands::Watch => {
            let ctx = WatcherContext::load(cli.config.as_deref())?;
            commands::watch::execute(&ctx, cli.verbose)?;
        }
        Commands::Snapshot { stdout } => {
            let ctx = WatcherContext::load(cli.config.as_deref())?;
            commands::snapshot::execute(&ctx, stdout, cli.verbose)?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
