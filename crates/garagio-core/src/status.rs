// ── Status sum type ──
//
// Every poll outcome, success or failure, is one of these values.
// Consumers match exhaustively; the pipeline never propagates device
// failures as errors.

use serde::Serialize;

use garagio_api::StatusSnapshot;

/// One observation of the device, emitted by the status engine.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Status {
    /// A well-formed snapshot.
    Ok(StatusSnapshot),
    /// The account could not be configured; no network call was made.
    /// Fatal to the current account chain until the account changes.
    AccountError(String),
    /// The device rejected the credentials.
    AuthError(String),
    /// The device answered with something unexpected or malformed.
    ProtoError(String),
    /// The transport failed (DNS, connect, timeout).
    NetworkError(String),
    /// No connectivity; polling is suspended. Carries no diagnostic.
    OfflineError,
    /// Unclassified failure.
    OtherError(String),
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// `true` for a snapshot with either door opening or closing.
    pub fn is_moving(&self) -> bool {
        match self {
            Self::Ok(snapshot) => snapshot.is_moving(),
            _ => false,
        }
    }

    /// The diagnostic string for error variants. `None` for [`Status::Ok`];
    /// the offline condition carries an empty diagnostic.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::OfflineError => Some(""),
            Self::AccountError(detail)
            | Self::AuthError(detail)
            | Self::ProtoError(detail)
            | Self::NetworkError(detail)
            | Self::OtherError(detail) => Some(detail),
        }
    }
}

impl From<garagio_api::Error> for Status {
    fn from(err: garagio_api::Error) -> Self {
        match err {
            garagio_api::Error::Config { message } => Self::AccountError(message),
            garagio_api::Error::Auth { message } => Self::AuthError(message),
            garagio_api::Error::Proto { message } => Self::ProtoError(message),
            garagio_api::Error::Transport(e) => Self::NetworkError(e.to_string()),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok(s) => write!(
                f,
                "door0 {:?} ({}s) | door1 {:?} ({}s) | temp {} | rssi {} | heap {} | up {}s",
                s.door0_state,
                s.door0_age,
                s.door1_state,
                s.door1_age,
                s.temperature_reading()
                    .map_or_else(|| "n/a".to_owned(), |t| format!("{t:.1}C")),
                s.rssi,
                s.heap,
                s.uptime,
            ),
            Self::AccountError(detail) => write!(f, "account error: {detail}"),
            Self::AuthError(detail) => write!(f, "auth error: {detail}"),
            Self::ProtoError(detail) => write!(f, "protocol error: {detail}"),
            Self::NetworkError(detail) => write!(f, "network error: {detail}"),
            Self::OfflineError => write!(f, "offline"),
            Self::OtherError(detail) => write!(f, "error: {detail}"),
        }
    }
}
