// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive init` - Write the initial hive.toml for this host.

use anyhow::{anyhow, Result};
use clap::Args;
use hive_core::{validate_host_id, validate_host_url};
use hive_daemon::lifecycle::DaemonPaths;

use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct InitArgs {
    /// Mesh-unique host id (ASCII letters, digits, '-', '_')
    pub id: String,

    /// Advertised url peers will dial, e.g. http://this-host:23000
    pub url: String,

    /// Display name (defaults to the id)
    #[arg(long)]
    pub name: Option<String>,

    /// Description shown in host listings
    #[arg(long)]
    pub description: Option<String>,

    /// TCP port the daemon listens on for peers
    #[arg(long)]
    pub port: Option<u16>,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

pub fn init(args: InitArgs, format: OutputFormat) -> Result<()> {
    validate_host_id(&args.id)?;
    validate_host_url(&args.url)?;

    let paths = DaemonPaths::load()?;
    if paths.config_path.exists() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            paths.config_path.display()
        ));
    }

    let name = args.name.unwrap_or_else(|| args.id.clone());
    let mut text = format!(
        "[host]\nid = {id:?}\nname = {name:?}\nurl = {url:?}\n",
        id = args.id,
        name = name,
        url = args.url,
    );
    if let Some(description) = &args.description {
        text.push_str(&format!("description = {description:?}\n"));
    }
    if let Some(port) = args.port {
        text.push_str(&format!("\n[listen]\ntcp_port = {port}\n"));
    }

    // Validate the generated file the same way the daemon will
    hive_core::Config::parse(&text)?;
    std::fs::write(&paths.config_path, &text)?;

    let obj = serde_json::json!({
        "config_path": paths.config_path.to_string_lossy().into_owned(),
        "id": args.id,
        "url": args.url,
    });
    format_or_json(format, &obj, || {
        println!("Wrote {}", paths.config_path.display());
    })
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
