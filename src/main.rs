#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "shapeprint", about = "Shape-aware inspection of captured process memory")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Snapshot layout and memory statistics.
	Info(cmd::info::Args),
	/// List types, or show one type's layout.
	Types(cmd::types::Args),
	/// Render a typed value through the decoder registry.
	Print(cmd::print::Args),
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> shapeprint::inspect::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Types(args) => cmd::types::run(args),
		Commands::Print(args) => cmd::print::run(args),
	}
}
