//! # Configuration
//!
//! Layered service settings.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (`#[serde(default)]` on every section)
//! 2. a TOML file: `$FREIGHT_QUOTE_CONFIG`, else `freight-quote.toml` if present
//! 3. `FREIGHT_QUOTE__<SECTION>__<KEY>` environment variables
//!
//! `.env` is loaded with `dotenvy` before the environment is read.
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0:8080"
//!
//! [freightos]
//! api_key = "..."
//!
//! [payments]
//! confirmation_policy = "owner_only"
//! ```
//!
//! Rate providers without credentials are left out of the registry; see
//! [`FreightosSettings::provider_config`] and [`SeaRatesSettings::provider_config`].

use crate::application::services::{AggregationConfig, BookingWorkflowConfig, PaymentConfirmationPolicy};
use crate::infrastructure::notifications::{RetryPolicy, SmtpSecurity, SmtpSettings};
use crate::infrastructure::rates::{FreightosConfig, SeaRatesConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "FREIGHT_QUOTE_CONFIG";

/// Config file read when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "freight-quote.toml";

/// Prefix of overriding environment variables.
pub const ENV_PREFIX: &str = "FREIGHT_QUOTE";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("could not load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// An explicitly named config file does not exist.
    #[error("config file not found: `{0}`")]
    MissingFile(PathBuf),

    /// Values are present but inconsistent.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Multi-line, human oriented.
    Pretty,
    /// Single-line text.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// How e-mails leave the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailMode {
    /// Log and keep in memory only.
    #[default]
    Log,
    /// Deliver over SMTP.
    Smtp,
}

/// Full service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener.
    pub server: ServerSettings,
    /// Log output.
    pub logging: LoggingSettings,
    /// Provider fan-out.
    pub aggregation: AggregationSettings,
    /// Freightos estimate API.
    pub freightos: FreightosSettings,
    /// SeaRates GraphQL API.
    pub searates: SeaRatesSettings,
    /// Outbound e-mail.
    pub email: EmailSettings,
    /// Plan limits.
    pub plans: PlanSettings,
    /// Payment confirmation.
    pub payments: PaymentSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind.
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Log settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Fan-out settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    /// Overall deadline in milliseconds.
    pub timeout_ms: u64,
    /// Upper bound for a single provider in milliseconds.
    pub per_provider_timeout_ms: u64,
    /// Validity of the synthetic estimate in hours.
    pub estimate_validity_hours: i64,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        let defaults = AggregationConfig::default();
        Self {
            timeout_ms: defaults.timeout_ms,
            per_provider_timeout_ms: defaults.per_provider_timeout_ms,
            estimate_validity_hours: defaults.estimate_validity_hours,
        }
    }
}

impl AggregationSettings {
    /// Aggregator configuration.
    #[must_use]
    pub fn to_config(&self) -> AggregationConfig {
        AggregationConfig::with_timeout(self.timeout_ms)
            .with_per_provider_timeout(self.per_provider_timeout_ms)
            .with_estimate_validity_hours(self.estimate_validity_hours)
    }
}

/// Freightos settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FreightosSettings {
    /// Register the adapter when credentials are present.
    pub enabled: bool,
    /// API base URL.
    pub base_url: String,
    /// API key.
    pub api_key: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for FreightosSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://sandbox.freightos.com".to_string(),
            api_key: None,
            timeout_ms: 5000,
        }
    }
}

impl FreightosSettings {
    /// Adapter configuration, or `None` when disabled or without a key.
    #[must_use]
    pub fn provider_config(&self) -> Option<FreightosConfig> {
        if !self.enabled {
            return None;
        }
        let key = non_blank(self.api_key.as_deref())?;
        Some(FreightosConfig::new(&self.base_url, key).with_timeout(self.timeout_ms))
    }
}

/// SeaRates settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeaRatesSettings {
    /// Register the adapter when credentials are present.
    pub enabled: bool,
    /// Platform id.
    pub platform_id: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Token endpoint; the public endpoint when unset.
    pub token_url: Option<String>,
    /// GraphQL endpoint; the public endpoint when unset.
    pub graphql_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Assumed token lifetime in seconds.
    pub token_lifetime_secs: u64,
    /// Refresh margin before expiry in seconds.
    pub token_margin_secs: u64,
}

impl Default for SeaRatesSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            platform_id: None,
            api_key: None,
            token_url: None,
            graphql_url: None,
            timeout_ms: 8000,
            token_lifetime_secs: 9 * 60 * 60,
            token_margin_secs: 5 * 60,
        }
    }
}

impl SeaRatesSettings {
    /// Adapter configuration, or `None` when disabled or without credentials.
    #[must_use]
    pub fn provider_config(&self) -> Option<SeaRatesConfig> {
        if !self.enabled {
            return None;
        }
        let platform = non_blank(self.platform_id.as_deref())?;
        let key = non_blank(self.api_key.as_deref())?;
        let mut config = SeaRatesConfig::new(platform, key).with_timeout(self.timeout_ms);
        if let (Some(token_url), Some(graphql_url)) = (&self.token_url, &self.graphql_url) {
            config = config.with_endpoints(token_url, graphql_url);
        }
        config.token_lifetime = Duration::from_secs(self.token_lifetime_secs);
        config.token_margin = Duration::from_secs(self.token_margin_secs);
        Some(config)
    }
}

/// E-mail settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    /// Delivery mode.
    pub mode: EmailMode,
    /// SMTP host.
    pub smtp_host: String,
    /// SMTP port.
    pub smtp_port: u16,
    /// SMTP user.
    pub smtp_username: Option<String>,
    /// SMTP password.
    pub smtp_password: Option<String>,
    /// SMTP connection security.
    pub smtp_security: SmtpSecurity,
    /// `From` address.
    pub from: String,
    /// Dashboard base URL used in e-mail links.
    pub dashboard_url: String,
    /// Outbox queue capacity.
    pub outbox_capacity: usize,
    /// Delivery attempts per message.
    pub max_attempts: usize,
    /// Linear backoff step in milliseconds.
    pub base_backoff_ms: u64,
}

impl Default for EmailSettings {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            mode: EmailMode::default(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_security: SmtpSecurity::default(),
            from: "freightcode Logistics <bookings@freightcode.co.uk>".to_string(),
            dashboard_url: BookingWorkflowConfig::default().dashboard_url,
            outbox_capacity: 1024,
            max_attempts: retry.max_attempts,
            base_backoff_ms: retry.base_backoff_ms,
        }
    }
}

impl EmailSettings {
    /// SMTP transport settings.
    #[must_use]
    pub fn smtp(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            security: self.smtp_security,
            from: self.from.clone(),
        }
    }

    /// Outbox retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.base_backoff_ms)
    }
}

/// Plan limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlanSettings {
    /// Quotes per calendar month on the free tier.
    pub free_monthly_quotes: u32,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            free_monthly_quotes: crate::application::services::DEFAULT_FREE_MONTHLY_QUOTES,
        }
    }
}

/// Payment settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    /// Who may confirm a payment.
    pub confirmation_policy: PaymentConfirmationPolicy,
}

impl AppConfig {
    /// Loads `.env`, then the layered sources.
    ///
    /// # Errors
    ///
    /// - `MissingFile` if `FREIGHT_QUOTE_CONFIG` names a missing file
    /// - `Load` if a source is malformed
    /// - `Validation` if values are inconsistent
    pub fn load() -> ConfigResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, ".env file could not be read");
            }
        }
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from(Some(Path::new(&path)), true),
            Err(_) => Self::load_from(Some(Path::new(DEFAULT_CONFIG_FILE)), false),
        }
    }

    /// Loads from an optional TOML file plus the environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load`].
    pub fn load_from(path: Option<&Path>, require_file: bool) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            if require_file && !path.exists() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(require_file),
            );
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without consulting the environment.
    ///
    /// # Errors
    ///
    /// `Load` if the document is malformed, `Validation` if inconsistent.
    pub fn from_toml(document: &str) -> ConfigResult<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field rules.
    ///
    /// # Errors
    ///
    /// `Validation` describing the first violated rule.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind_address `{}` is not a socket address",
                self.server.bind_address
            )));
        }
        if self.aggregation.timeout_ms == 0 || self.aggregation.per_provider_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "aggregation timeouts must be positive".to_string(),
            ));
        }
        if self.aggregation.estimate_validity_hours <= 0 {
            return Err(ConfigError::Validation(
                "aggregation.estimate_validity_hours must be positive".to_string(),
            ));
        }
        if self.email.outbox_capacity == 0 {
            return Err(ConfigError::Validation(
                "email.outbox_capacity must be positive".to_string(),
            ));
        }
        if self.email.mode == EmailMode::Smtp && self.email.smtp_host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "email.smtp_host is required in smtp mode".to_string(),
            ));
        }
        Ok(())
    }

    /// Booking workflow settings.
    #[must_use]
    pub fn booking_workflow(&self) -> BookingWorkflowConfig {
        BookingWorkflowConfig {
            payment_policy: self.payments.confirmation_policy,
            dashboard_url: self.email.dashboard_url.clone(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.plans.free_monthly_quotes, 5);
        assert_eq!(config.payments.confirmation_policy, PaymentConfirmationPolicy::OwnerOrAdmin);
        assert!(config.freightos.provider_config().is_none());
        assert!(config.searates.provider_config().is_none());
    }

    #[test]
    fn aggregation_settings_carry_into_config() {
        let config = AggregationSettings::default().to_config();
        let defaults = AggregationConfig::default();
        assert_eq!(config.timeout_ms, defaults.timeout_ms);
        assert_eq!(config.per_provider_timeout_ms, defaults.per_provider_timeout_ms);
        assert_eq!(config.estimate_validity_hours, defaults.estimate_validity_hours);
        assert!(config.include_estimate);

        let tuned = AggregationSettings {
            timeout_ms: 3000,
            per_provider_timeout_ms: 1200,
            estimate_validity_hours: 6,
        }
        .to_config();
        assert_eq!(tuned.timeout_ms, 3000);
        assert_eq!(tuned.per_provider_timeout_ms, 1200);
        assert_eq!(tuned.estimate_validity_hours, 6);
    }

    #[test]
    fn toml_overrides_sections() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            bind_address = "127.0.0.1:9000"

            [logging]
            format = "json"

            [aggregation]
            per_provider_timeout_ms = 1500

            [freightos]
            api_key = "fk"

            [searates]
            platform_id = "p"
            api_key = "k"
            token_url = "http://localhost/token"
            graphql_url = "http://localhost/graphql"

            [email]
            mode = "smtp"
            smtp_security = "tls"

            [payments]
            confirmation_policy = "admin_only"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.aggregation.to_config().per_provider_timeout_ms, 1500);
        assert_eq!(config.aggregation.to_config().timeout_ms, 10_000);
        assert_eq!(config.freightos.provider_config().unwrap().api_key, "fk");
        let searates = config.searates.provider_config().unwrap();
        assert_eq!(searates.graphql_url, "http://localhost/graphql");
        assert_eq!(config.email.smtp().security, SmtpSecurity::Tls);
        assert_eq!(config.booking_workflow().payment_policy, PaymentConfirmationPolicy::AdminOnly);
    }

    #[test]
    fn disabled_provider_is_not_configured() {
        let config = AppConfig::from_toml(
            r#"
            [freightos]
            enabled = false
            api_key = "fk"
            "#,
        )
        .unwrap();
        assert!(config.freightos.provider_config().is_none());
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let settings = SeaRatesSettings {
            platform_id: Some("p".to_string()),
            api_key: Some("  ".to_string()),
            ..SeaRatesSettings::default()
        };
        assert!(settings.provider_config().is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AppConfig::from_toml("[server]\nbind_address = \"nowhere\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = AppConfig::from_toml("[aggregation]\ntimeout_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = AppConfig::from_toml("[payments]\nconfirmation_policy = \"everyone\"").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn explicit_missing_file_fails() {
        let err = AppConfig::load_from(Some(Path::new("/nonexistent/freight-quote.toml")), true)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }
}
