//! Stored-account inspection and updates.

use secrecy::SecretString;

use crate::cli::{ConfigCommand, GlobalOpts};
use crate::error::CliError;

use super::open_store;

pub fn handle(global: &GlobalOpts, cmd: ConfigCommand) -> Result<(), CliError> {
    let store = open_store(global)?;

    match cmd {
        ConfigCommand::Show => {
            let account = store.account().masked();
            println!("base_url: {}", account.base_url);
            println!("username: {}", account.username);
            Ok(())
        }

        ConfigCommand::Set => {
            let mut account = store.account();
            if let Some(base_url) = &global.base_url {
                account.base_url = base_url.clone();
            }
            if let Some(username) = &global.username {
                account.username = username.clone();
            }
            // None keeps the previously stored secret
            account.password = global
                .password
                .as_ref()
                .map(|p| SecretString::from(p.clone()));

            store.save(&account)?;
            if !global.quiet {
                eprintln!("account saved");
            }
            Ok(())
        }
    }
}
