mod app;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use classbridge::BridgeRewriter;

use crate::app::Cli;

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show classbridge info+ on stderr; --verbose enables debug; RUST_LOG overrides
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("classbridge", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let files = collect_class_files(&cli.paths)?;
    if files.is_empty() {
        println!("No class files found.");
        return Ok(());
    }

    let rewriter = BridgeRewriter::new();
    let mut failed = 0usize;

    if cli.dry_run {
        for path in &files {
            let result = std::fs::read(path)
                .map_err(classbridge::Error::FileError)
                .and_then(|data| rewriter.rewrite(&data).map(|_| ()));
            if let Err(error) = result {
                eprintln!("Failed to rewrite {}: {}", path.display(), error);
                failed += 1;
            }
        }
    } else {
        let summary = rewriter.rewrite_paths(&files);
        for (path, error) in &summary.failures {
            eprintln!("Failed to rewrite {}: {}", path.display(), error);
        }
        failed = summary.failures.len();
    }

    println!(
        "Rewrote {} members and {} method calls across {} files{}",
        rewriter.members_rewritten(),
        rewriter.call_sites_rewritten(),
        files.len() - failed,
        if cli.dry_run { " (dry run)" } else { "" },
    );
    if failed > 0 {
        println!("{failed} files could not be rewritten (see above).");
    }

    Ok(())
}

/// Collect every `.class` file from the given files and directories,
/// searching directories recursively. Non-class files are ignored.
fn collect_class_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_recursive(path, &mut files)?;
        } else if is_class_file(path) {
            files.push(path.clone());
        }
        // else ignore
    }
    files.sort();
    Ok(files)
}

fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if is_class_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Returns true if the path has a `.class` extension.
fn is_class_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("class"))
}
