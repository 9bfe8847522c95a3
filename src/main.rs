use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hyperion::{Driver, Mode, ProcessBackend, ProjectConfig};

/// Hyperion CLI
///
/// Compiles Helios smart contracts (.hl files) into the JSON artifacts
/// deployed on-chain. Compilation itself is done by an external Helios
/// compiler; hyperion finds the sources, applies template parameters and
/// writes the results.
#[derive(Parser, Debug)]
#[command(name = "hyperion", version)]
#[command(about = "Helios smart contract build tool", long_about = None)]
struct Cli {
    /// Project config file (defaults to ./hyperion.config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compiles a Helios file, a directory of them, or the whole project to JSON
    Compile(CompileArgs),
}

#[derive(Args, Debug)]
struct CompileArgs {
    /// Path to the source file
    #[arg(short, long = "input_file")]
    input_file: Option<PathBuf>,

    /// Print each program's name and script hex
    #[arg(short, long)]
    verbose: bool,

    /// Custom output file (its extension is replaced by .json)
    #[arg(short, long = "output_file")]
    output_file: Option<PathBuf>,

    /// JSON file of template parameters
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Compile every .hl file in this directory
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compile(args) => compile(cli.config, args),
    }
}

fn compile(config_path: Option<PathBuf>, args: CompileArgs) -> anyhow::Result<()> {
    let config = ProjectConfig::resolve(config_path).context("loading project config")?;
    let backend = ProcessBackend::new(config.compiler_command());
    debug!(compiler = ?backend.argv(), "using compiler");

    let mode = Mode::select(args.input_file, args.params, args.output_file, args.directory, config);
    let summary = Driver::new(&backend, args.verbose)
        .run(&mode)
        .context("compilation aborted")?;
    debug!(compiled = summary.compiled.len(), rejected = summary.rejected.len(), "batch finished");

    println!("Done");
    Ok(())
}
