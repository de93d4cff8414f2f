// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive: CLI for the mesh fleet dashboard.

mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "hive", version, about = "Manage a mesh of hosts running hive agents")]
struct Cli {
    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an initial hive.toml for this host
    Init(commands::init::InitArgs),
    /// Daemon management
    Daemon(commands::daemon::DaemonArgs),
    /// Known hosts in the mesh
    Host(commands::host::HostArgs),
    /// Mesh organization name
    Org(commands::org::OrgArgs),
    /// List this host's agents
    Agents,
    /// Resolve an agent name to its host
    Lookup {
        name: String,
    },
    /// Show the full agent directory
    Directory,
    /// Daemon status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Text };

    let result = match cli.command {
        Commands::Init(args) => commands::init::init(args, format),
        Commands::Daemon(args) => commands::daemon::daemon(args, format).await,
        Commands::Host(args) => commands::host::host(args, format).await,
        Commands::Org(args) => commands::org::org(args, format).await,
        Commands::Agents => commands::agent::agents(format).await,
        Commands::Lookup { name } => commands::agent::lookup(name, format).await,
        Commands::Directory => commands::agent::directory(format).await,
        Commands::Status => commands::daemon::status(format).await,
    };

    if let Err(e) = result {
        eprintln!("hive: {e:#}");
        std::process::exit(1);
    }
}
