//! Per-command handlers.

pub mod config_cmd;
pub mod doors;
pub mod status;
pub mod watch;

use secrecy::SecretString;

use garagio_api::DeviceClient;
use garagio_config::AccountStore;
use garagio_core::Account;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Open the account store honoring `--config`.
pub fn open_store(global: &GlobalOpts) -> Result<AccountStore, CliError> {
    match &global.config {
        Some(path) => Ok(AccountStore::at_path(path.clone())?),
        None => Ok(AccountStore::open()?),
    }
}

/// The stored account with CLI flag overrides folded in.
pub fn resolve_account(global: &GlobalOpts) -> Result<Account, CliError> {
    let mut account = open_store(global)?.account();

    if let Some(base_url) = &global.base_url {
        account.base_url = base_url.clone();
    }
    if let Some(username) = &global.username {
        account.username = username.clone();
    }
    if let Some(password) = &global.password {
        account.password = Some(SecretString::from(password.clone()));
    }

    if account.base_url.is_empty() {
        return Err(CliError::NoAccount);
    }
    Ok(account)
}

/// A one-shot device client for the resolved account.
pub fn device_client(global: &GlobalOpts) -> Result<DeviceClient, CliError> {
    let account = resolve_account(global)?;
    let password = account
        .password
        .clone()
        .unwrap_or_else(|| SecretString::from(String::new()));
    Ok(DeviceClient::new(
        &account.base_url,
        &account.username,
        password,
    )?)
}
