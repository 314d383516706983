//! JitBind CLI Tool
//!
//! Main entry point for the jitbind command-line interface.

use anyhow::Context;
use clap::{Parser, Subcommand};
use jitbind_tools::{CheckArgs, GenerateArgs, run_check, run_generate};
use tracing::Level;

#[derive(Parser)]
#[command(name = "jitbind")]
#[command(about = "JitBind - Flat and object-oriented bindings for a JIT builder API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bindings from an API description
    Generate(GenerateArgs),
    /// Validate an API description without writing anything
    Check(CheckArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Generate(args) => {
            let summary = run_generate(&args).with_context(|| format!("Generating bindings from {}", args.api.display()))?;
            let stats = &summary.stats;
            println!("Generated {} artifacts ({} bytes) in {} ms", stats.artifact_count, stats.total_bytes, stats.generation_time_ms);
            println!("Classes: {}", stats.class_count);
            println!("Free functions: {}", stats.free_function_count);
            println!("Member definitions: {}", stats.function_count);
        }
        Commands::Check(args) => {
            let summary = run_check(&args).with_context(|| format!("Checking {}", args.api.display()))?;
            if args.json {
                println!("{}", summary.to_json()?);
            } else {
                println!("{} is valid", args.api.display());
                println!("Classes: {}", summary.classes);
                println!("Free functions: {}", summary.free_functions);
                println!("Member functions: {} ({} callbacks)", summary.member_functions, summary.callbacks);
            }
        }
    }

    Ok(())
}
