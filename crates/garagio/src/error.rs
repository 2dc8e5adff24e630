//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No device account configured")]
    #[diagnostic(
        code(garagio::no_account),
        help(
            "Store an account with: garagio config set --base-url https://... --username ...\n\
             Or pass --base-url/--username/--password directly."
        )
    )]
    NoAccount,

    #[error("Device rejected the credentials")]
    #[diagnostic(
        code(garagio::auth),
        help("Check the stored username/password: garagio config show")
    )]
    Auth {
        #[source]
        source: garagio_api::Error,
    },

    #[error("Device request failed")]
    #[diagnostic(code(garagio::device))]
    Device {
        #[source]
        source: garagio_api::Error,
    },

    #[error("{action} door {door} was not accepted by the device")]
    #[diagnostic(code(garagio::command_rejected))]
    CommandRejected { action: &'static str, door: u8 },

    #[error("Config error")]
    #[diagnostic(code(garagio::config))]
    Config {
        #[from]
        source: garagio_config::ConfigError,
    },

    #[error("Output serialization failed")]
    #[diagnostic(code(garagio::output))]
    Output {
        #[from]
        source: serde_json::Error,
    },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoAccount => exit_code::USAGE,
            Self::Auth { .. } => exit_code::AUTH,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<garagio_api::Error> for CliError {
    fn from(err: garagio_api::Error) -> Self {
        if err.is_auth() {
            Self::Auth { source: err }
        } else {
            Self::Device { source: err }
        }
    }
}
