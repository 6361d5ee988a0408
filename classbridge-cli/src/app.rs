use std::path::PathBuf;

use clap::Parser;

/// classbridge - restore bridge-method names in compiled class files
#[derive(Debug, Parser)]
#[command(name = "classbridge", version, about, long_about = None)]
pub struct Cli {
    /// Class files or directories to rewrite; directories are searched
    /// recursively for `.class` files.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Decode and rewrite in memory, report counts, but write nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}
