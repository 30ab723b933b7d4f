use std::{env, time::Duration};

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use lettre::message::Mailbox;
use muunoob_contact::provider::SmtpSecurity;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Resend,
    Smtp,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// Name of the environment variable holding the provider secret. The secret
    /// itself never goes through this config.
    #[serde(default = "default_api_key_var")]
    pub api_key_var: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
    #[serde(default = "default_site")]
    pub site: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key_var: default_api_key_var(),
            api_url: default_api_url(),
            from: default_from(),
            to: default_to(),
            site: default_site(),
            timeout_secs: default_timeout_secs(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl EmailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_key_var() -> String {
    "RESEND_API_KEY".to_string()
}

fn default_api_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_from() -> String {
    "Contact Form <noreply@muunoobstudios.com>".to_string()
}

fn default_to() -> String {
    "business@muunoobstudios.com".to_string()
}

fn default_site() -> String {
    "muunoobstudios.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default = "default_smtp_username")]
    pub username: String,
    /// `starttls` (port 587), `tls` (implicit, port 465) or `none`.
    #[serde(default)]
    pub security: SmtpSecurity,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: default_smtp_username(),
            security: SmtpSecurity::default(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_username() -> String {
    "noreply@muunoobstudios.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContactConfig {
    #[serde(default = "default_true")]
    pub rate_limit_enabled: bool,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,
    #[serde(default)]
    pub require_form_token: bool,
    #[serde(default = "default_form_token_max_age_secs")]
    pub form_token_max_age_secs: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Key the rate limit on `x-forwarded-for`/`x-real-ip` instead of the peer
    /// address. Only safe behind a reverse proxy that overwrites them.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            rate_limit_enabled: true,
            rate_limit_window_secs: default_rate_limit_window_secs(),
            rate_limit_max: default_rate_limit_max(),
            require_form_token: false,
            form_token_max_age_secs: default_form_token_max_age_secs(),
            max_body_bytes: default_max_body_bytes(),
            trust_proxy_headers: false,
        }
    }
}

impl ContactConfig {
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn form_token_max_age(&self) -> Duration {
        Duration::from_secs(self.form_token_max_age_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_rate_limit_max() -> u32 {
    3
}

fn default_form_token_max_age_secs() -> u64 {
    60 * 60
}

fn default_max_body_bytes() -> usize {
    10 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `json` for structured output, anything else for human readable lines.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (MUUNOOB__SERVER__PORT, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional, ignored when missing
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("MUUNOOB")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.email.timeout_secs == 0 {
            return Err("Email timeout_secs must be greater than 0".to_string());
        }
        if self.email.api_key_var.trim().is_empty() {
            return Err("Email api_key_var must name an environment variable".to_string());
        }
        if let Err(e) = self.email.from.parse::<Mailbox>() {
            return Err(format!("Invalid email.from address: {e}"));
        }
        if let Err(e) = self.email.to.parse::<Mailbox>() {
            return Err(format!("Invalid email.to address: {e}"));
        }
        if self.contact.rate_limit_enabled && self.contact.rate_limit_max == 0 {
            return Err("Contact rate_limit_max must be at least 1".to_string());
        }
        if self.contact.max_body_bytes == 0 {
            return Err("Contact max_body_bytes must be greater than 0".to_string());
        }
        Ok(())
    }
}
