//! Long-running watch: run the observation engine, print every emission.

use tokio::sync::watch;
use tracing::debug;

use garagio_core::StatusEngine;

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::open_store;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let store = open_store(global)?;
    let accounts = store.subscribe();

    // No OS connectivity integration here: the CLI assumes the link is
    // up. Embedders wire a real monitor into this channel.
    let (_conn_tx, conn_rx) = watch::channel(true);

    let engine = StatusEngine::new(accounts, conn_rx);
    let mut statuses = engine.subscribe();
    engine.start().await;

    if !global.quiet {
        eprintln!("watching; press Ctrl-C to stop");
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = statuses.recv() => {
                match received {
                    Ok(status) => {
                        if global.json {
                            println!("{}", serde_json::to_string(&status)?);
                        } else {
                            println!("{status}");
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(missed, "status consumer lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}
