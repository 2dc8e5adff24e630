// ── Device HTTP client ──
//
// Wraps `reqwest::Client` with Garagio-specific URL construction and
// response triage. All endpoint URLs are derived up front so a bad base
// URL fails at configuration time, not on the first poll.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::status::{self, StatusSnapshot};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which of the two garage doors a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Door {
    Zero,
    One,
}

impl std::fmt::Display for Door {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zero => write!(f, "door 0"),
            Self::One => write!(f, "door 1"),
        }
    }
}

/// HTTP client for a single configured Garagio device.
///
/// Holds the status and per-door command URLs plus the basic-auth
/// credentials. Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    status_url: Url,
    open_urls: [Url; 2],
    close_urls: [Url; 2],
    username: String,
    password: SecretString,
}

impl DeviceClient {
    /// Create a client for the device at `base_url`.
    ///
    /// Only `https://` base URLs are accepted; the device speaks basic
    /// auth and anything else would put the credentials on the wire in
    /// the clear.
    pub fn new(
        base_url: &str,
        username: &str,
        password: SecretString,
    ) -> Result<Self, Error> {
        if !base_url.starts_with("https://") {
            return Err(Error::config("only 'https://' base URLs are supported"));
        }
        let base = Url::parse(base_url)
            .map_err(|e| Error::config(format!("unable to parse base URL: {e}")))?;
        Self::with_base_url(base, username, password)
    }

    /// Create a client from a pre-parsed base URL, skipping the
    /// https-only check. Intended for tests against local mock servers.
    pub fn with_base_url(
        base: Url,
        username: &str,
        password: SecretString,
    ) -> Result<Self, Error> {
        // Endpoint paths append to the base URL as given, preserving any
        // path prefix in front of a reverse proxy.
        let root = base.as_str().trim_end_matches('/').to_owned();
        let endpoint = |path: &str| {
            Url::parse(&format!("{root}{path}"))
                .map_err(|e| Error::config(format!("unable to derive endpoint URL: {e}")))
        };

        let status_url = endpoint("/")?;
        let open_urls = [endpoint("/door0/open")?, endpoint("/door1/open")?];
        let close_urls = [endpoint("/door0/close")?, endpoint("/door1/close")?];

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("unable to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            status_url,
            open_urls,
            close_urls,
            username: username.to_owned(),
            password,
        })
    }

    /// Fetch and parse the device status.
    ///
    /// HTTP 403 is an [`Error::Auth`]; any other non-success status or a
    /// malformed body is an [`Error::Proto`]. Transport failures surface
    /// as [`Error::Transport`].
    pub async fn fetch_status(&self) -> Result<StatusSnapshot, Error> {
        debug!("GET {}", self.status_url);

        let resp = self
            .http
            .get(self.status_url.clone())
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await?;

        let code = resp.status();
        let body = resp.text().await?;

        if code == StatusCode::FORBIDDEN {
            return Err(Error::Auth {
                message: format!("HTTP 403/Unauthorized ({body})"),
            });
        }
        if !code.is_success() {
            return Err(Error::proto(format!("HTTP {}/{body}", code.as_u16())));
        }

        status::parse_status(&body)
    }

    /// Command a door to open.
    pub async fn open_door(&self, door: Door) -> Result<(), Error> {
        let url = match door {
            Door::Zero => &self.open_urls[0],
            Door::One => &self.open_urls[1],
        };
        self.send_command(url).await
    }

    /// Command a door to close.
    pub async fn close_door(&self, door: Door) -> Result<(), Error> {
        let url = match door {
            Door::Zero => &self.close_urls[0],
            Door::One => &self.close_urls[1],
        };
        self.send_command(url).await
    }

    async fn send_command(&self, url: &Url) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url.clone())
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .body("")
            .send()
            .await?;

        let code = resp.status();
        if code.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(Error::proto(format!("HTTP {}/{body}", code.as_u16())))
        }
    }
}

impl std::fmt::Debug for DeviceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceClient")
            .field("status_url", &self.status_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
