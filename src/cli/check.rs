use anyhow::Result;
use muunoob::Config;
use muunoob_contact::{CredentialSource, EnvCredentials};

/// Reports whether the loaded configuration can actually deliver mail.
///
/// The config itself is already validated by the time this runs.
pub fn check(config: &Config) -> Result<()> {
    tracing::info!(
        provider = ?config.email.provider,
        from = %config.email.from,
        to = %config.email.to,
        timeout_secs = config.email.timeout_secs,
        "Configuration is valid"
    );

    let credentials = EnvCredentials::new(config.email.api_key_var.to_owned());

    match credentials.load() {
        Some(credential) => {
            tracing::info!(
                var = credentials.var(),
                credential = %credential.masked(),
                "Email provider credential found"
            );
            Ok(())
        }
        None => {
            tracing::error!(
                var = credentials.var(),
                "Email provider credential is not set, submissions will fail"
            );
            anyhow::bail!("{} is not set", credentials.var())
        }
    }
}
