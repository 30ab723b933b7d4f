use std::fmt;

const VISIBLE_PREFIX: usize = 6;

/// Secret used to authenticate against the email provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First few characters followed by `...`, safe to log.
    pub fn masked(&self) -> String {
        if self.0.chars().count() <= VISIBLE_PREFIX {
            return "***".to_owned();
        }

        let prefix: String = self.0.chars().take(VISIBLE_PREFIX).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

/// Where the handler looks up the provider secret on every request.
pub trait CredentialSource: Send + Sync {
    fn load(&self) -> Option<Credential>;
}

/// Reads the named environment variable each time, so rotating the secret
/// does not require a restart.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl CredentialSource for EnvCredentials {
    fn load(&self) -> Option<Credential> {
        std::env::var(&self.var)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(Credential::new)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(Option<String>);

impl StaticCredentials {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Some(secret.into()))
    }

    pub fn missing() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticCredentials {
    fn load(&self) -> Option<Credential> {
        self.0
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(Credential::new)
    }
}
