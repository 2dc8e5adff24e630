//! Door commands: one-shot open/close against the device.

use garagio_api::Door;

use crate::cli::{DoorArgs, GlobalOpts};
use crate::error::CliError;

use super::device_client;

pub async fn handle(global: &GlobalOpts, args: &DoorArgs, open: bool) -> Result<(), CliError> {
    let client = device_client(global)?;
    let door = match args.door {
        0 => Door::Zero,
        _ => Door::One,
    };

    let result = if open {
        client.open_door(door).await
    } else {
        client.close_door(door).await
    };

    let action = if open { "open" } else { "close" };
    match result {
        Ok(()) => {
            if !global.quiet {
                eprintln!("{action} command accepted for {door}");
            }
            Ok(())
        }
        Err(e) if e.is_auth() => Err(e.into()),
        Err(_) => Err(CliError::CommandRejected {
            action,
            door: args.door,
        }),
    }
}
