//! One-shot status fetch.

use garagio_core::Status;

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::device_client;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let client = device_client(global)?;
    let snapshot = client.fetch_status().await?;

    if global.json {
        println!("{}", serde_json::to_string(&snapshot)?);
    } else {
        println!("{}", Status::Ok(snapshot));
    }
    Ok(())
}
