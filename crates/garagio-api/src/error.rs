use thiserror::Error;

/// Top-level error type for the `garagio-api` crate.
///
/// Covers every failure mode the device client can produce:
/// configuration, authorization, protocol, and transport.
/// `garagio-core` maps these into `Status` values — consumers of the
/// observation pipeline never see this type directly.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// The account could not be turned into a usable client
    /// (non-HTTPS base URL, unparseable URL, bad credentials encoding).
    #[error("Configuration rejected: {message}")]
    Config { message: String },

    // ── Authorization ───────────────────────────────────────────────
    /// The device rejected the credentials (HTTP 403).
    #[error("{message}")]
    Auth { message: String },

    // ── Protocol ────────────────────────────────────────────────────
    /// Unexpected HTTP status or a malformed status payload.
    #[error("{message}")]
    Proto { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn proto(message: impl Into<String>) -> Self {
        Self::Proto {
            message: message.into(),
        }
    }

    /// Returns `true` if this error indicates rejected credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Returns `true` if this is a transient transport error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
