// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hived: the hive mesh daemon binary.

use hive_daemon::lifecycle::{run, DaemonPaths};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let paths = match DaemonPaths::load() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("hived: {e}");
            std::process::exit(1);
        }
    };

    let file_appender = tracing_appender::rolling::never(&paths.state_dir, "daemon.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    if let Err(e) = run(paths).await {
        error!(error = %e, "daemon failed");
        eprintln!("hived: {e}");
        std::process::exit(1);
    }
}
