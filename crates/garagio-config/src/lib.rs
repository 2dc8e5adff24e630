//! Persistent account configuration for Garagio clients.
//!
//! One TOML profile (`base_url`, `username`, optional `password`) merged
//! with `GARAGIO_*` environment overrides via figment. The store exposes
//! the account as a watch channel: the current value on subscribe, a new
//! value on every save — exactly the push-sequence the observation
//! engine consumes.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use garagio_core::Account;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no usable config directory on this platform")]
    NoConfigDir,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Stored profile ──────────────────────────────────────────────────

/// On-disk shape of the account profile. The password is stored in the
/// file as plain TOML; point `GARAGIO_PASSWORD` at the environment to
/// keep it out of the file entirely.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredAccount {
    #[serde(default)]
    base_url: String,
    #[serde(default)]
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

impl From<StoredAccount> for Account {
    fn from(stored: StoredAccount) -> Self {
        Account {
            base_url: stored.base_url,
            username: stored.username,
            password: stored.password.map(SecretString::from),
        }
    }
}

/// Default config file path: `<project config dir>/account.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("net", "pelennor", "garagio").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("account.toml"))
}

fn load_stored(path: &Path) -> Result<StoredAccount, ConfigError> {
    let stored = Figment::from(Serialized::defaults(StoredAccount::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GARAGIO_"))
        .extract()?;
    Ok(stored)
}

// ── Account store ───────────────────────────────────────────────────

/// File-backed account store with a reactive view.
pub struct AccountStore {
    path: PathBuf,
    tx: watch::Sender<Account>,
}

impl AccountStore {
    /// Open the store at the platform default path.
    pub fn open() -> Result<Self, ConfigError> {
        Self::at_path(default_config_path()?)
    }

    /// Open the store at an explicit path. A missing file is an empty
    /// account, not an error.
    pub fn at_path(path: PathBuf) -> Result<Self, ConfigError> {
        let account: Account = load_stored(&path)?.into();
        debug!(path = %path.display(), "account store opened");
        let (tx, _) = watch::channel(account);
        Ok(Self { path, tx })
    }

    /// The account stream: current value immediately, then every save.
    pub fn subscribe(&self) -> watch::Receiver<Account> {
        self.tx.subscribe()
    }

    /// The current account.
    pub fn account(&self) -> Account {
        self.tx.borrow().clone()
    }

    /// Persist `account` and publish it to subscribers.
    ///
    /// A save with `password: None` keeps the previously stored secret —
    /// callers holding a masked account can update the URL or username
    /// without read access to the password.
    pub fn save(&self, account: &Account) -> Result<(), ConfigError> {
        let current = self.tx.borrow().clone();
        let password = account
            .password
            .clone()
            .or(current.password)
            .map(|secret| secret.expose_secret().to_owned());

        let stored = StoredAccount {
            base_url: account.base_url.clone(),
            username: account.username.clone(),
            password,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&stored)?)?;
        debug!(path = %self.path.display(), "account saved");

        self.tx.send_replace(stored.into());
        Ok(())
    }
}
