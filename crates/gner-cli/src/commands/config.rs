//! Config command - manage configuration.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use gner_core::GnerConfig;

use super::load_config;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),
}

#[derive(Args)]
struct InitArgs {
    /// Output path for the configuration file
    #[arg(short, long, default_value = "gner.json")]
    output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Init(init_args) => init_config(init_args),
    }
}

fn show_config() -> anyhow::Result<()> {
    // The global --config flag is handled per command; `show` prints
    // defaults so users can see every knob.
    let config = load_config(None)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists, use --force to overwrite",
            args.output.display()
        );
    }

    let config = GnerConfig::default();
    config.save(&args.output)?;

    println!(
        "{} Wrote default configuration to {}",
        style("✓").green(),
        args.output.display()
    );
    Ok(())
}
