use chrono::Duration;
use config::{Config, ConfigError, Environment, File};
use gatekeep_application::SessionConfig;
use secrecy::Secret;
use serde::Deserialize;

const ENV_PREFIX: &str = "GATEKEEP";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub session: SessionSettings,
    pub postgres: PostgresSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub max_token_retries: u32,
    pub session_ttl_seconds: i64,
    pub access_token_ttl_seconds: i64,
    pub token_secret: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
    pub max_connections: u32,
}

impl Settings {
    /// Load settings from `config/default`, `config/local` and `GATEKEEP__*`
    /// environment variables, later sources overriding earlier ones.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("session.max_token_retries", 3)?
            .set_default("session.session_ttl_seconds", 30 * 24 * 60 * 60)?
            .set_default("session.access_token_ttl_seconds", 15 * 60)?
            .set_default("postgres.max_connections", 5)
    }
}

impl SessionSettings {
    /// Build the service config, rejecting TTLs that are not positive or too
    /// large to represent.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        Ok(SessionConfig {
            max_token_retries: self.max_token_retries,
            session_duration: ttl("session.session_ttl_seconds", self.session_ttl_seconds)?,
            access_token_duration: ttl(
                "session.access_token_ttl_seconds",
                self.access_token_ttl_seconds,
            )?,
            token_secret: self.token_secret.clone(),
        })
    }
}

fn ttl(key: &str, seconds: i64) -> Result<Duration, ConfigError> {
    Duration::try_seconds(seconds)
        .filter(|duration| *duration > Duration::zero())
        .ok_or_else(|| ConfigError::Message(format!("{key} is out of range: {seconds}")))
}
