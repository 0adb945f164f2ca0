//! Workspace tasks: `cargo xtask <command>`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use trajsmooth::options::Options;

#[derive(Parser)]
#[command(name = "xtask", about = "trajsmooth workspace tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the JSON schema of the options file.
    Schema {
        /// Output path.
        #[arg(long, default_value = "options.schema.json")]
        out: PathBuf,
    },
}

fn schema(out: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&Options::json_schema())
        .context("serializing options schema")?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(out, json).with_context(|| format!("writing {}", out.display()))
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Schema { out } => schema(&out),
    }
}
