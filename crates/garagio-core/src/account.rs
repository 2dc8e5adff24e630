use secrecy::SecretString;

/// Credentials and location of a Garagio device.
///
/// `password: None` is distinct from an empty password: `None` means the
/// holder has no read access to the secret (a masked observation, or a
/// save that should keep the stored secret). The engine substitutes the
/// empty string only when configuring the device client.
#[derive(Debug, Clone, Default)]
pub struct Account {
    pub base_url: String,
    pub username: String,
    pub password: Option<SecretString>,
}

impl Account {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: Option<SecretString>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password,
        }
    }

    /// A copy safe to hand to display layers: same URL and username,
    /// password withheld.
    pub fn masked(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: None,
        }
    }
}
