use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod dispatch;
mod render;

#[cfg(test)]
mod tests;

#[derive(Parser, Debug)]
#[command(name = "workband")]
#[command(about = "SDK workload manifest resolver and installation state tracker", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    dotnet_root: Option<PathBuf>,
    #[arg(long, global = true)]
    sdk_version: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Resolve {
        #[arg(required = true)]
        workload_ids: Vec<String>,
        #[arg(long)]
        rid: Option<String>,
    },
    Install {
        #[arg(required = true)]
        workload_ids: Vec<String>,
    },
    Uninstall {
        #[arg(required = true)]
        workload_ids: Vec<String>,
    },
    List,
    History,
    Band,
}

fn main() -> Result<()> {
    dispatch::run_cli(Cli::parse())
}
