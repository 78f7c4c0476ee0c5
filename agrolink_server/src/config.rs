use std::env;

use agl_common::Secret;
use chrono::Duration;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_AGL_HOST: &str = "127.0.0.1";
const DEFAULT_AGL_PORT: u16 = 4000;
const DEFAULT_TOKEN_VALIDITY: Duration = Duration::days(1);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub mail: MailConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_AGL_HOST.to_string(),
            port: DEFAULT_AGL_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("AGL_HOST").ok().unwrap_or_else(|| DEFAULT_AGL_HOST.into());
        let port = env::var("AGL_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for AGL_PORT. {e} Using the default, {DEFAULT_AGL_PORT}, instead."
                    );
                    DEFAULT_AGL_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_AGL_PORT);
        let database_url = env::var("AGL_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ AGL_DATABASE_URL is not set. Please set it to the URL for the AgroLink database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let mail = MailConfig::from_env_or_default();
        Self { host, port, database_url, auth, mail }
    }
}

//-------------------------------------------------  AuthConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify HS256 access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an issued access token stays valid. Tokens do not refresh.
    pub token_validity: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO NOT \
             operate on production like this, since every issued token dies with the process. Set AGL_JWT_SECRET \
             instead. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret), token_validity: DEFAULT_TOKEN_VALIDITY }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("AGL_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [AGL_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("AGL_JWT_SECRET is empty".to_string()));
        }
        let token_validity = env::var("AGL_TOKEN_VALIDITY_HOURS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for AGL_TOKEN_VALIDITY_HOURS. {e}"))
                    .ok()
            })
            .map(Duration::hours)
            .unwrap_or(DEFAULT_TOKEN_VALIDITY);
        Ok(Self { jwt_secret: Secret::new(secret), token_validity })
    }
}

//-------------------------------------------------  MailConfig  ------------------------------------------------------
/// SMTP settings for the best-effort notifier. An empty host disables outbound mail entirely;
/// nothing else in the system depends on it.
#[derive(Clone, Debug, Default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: Secret<String>,
    pub mail_from: String,
}

impl MailConfig {
    pub fn from_env_or_default() -> Self {
        let smtp_host = env::var("AGL_SMTP_HOST").ok().unwrap_or_else(|| {
            info!("🪛️ AGL_SMTP_HOST is not set. Mail notifications are disabled.");
            String::default()
        });
        let smtp_port = env::var("AGL_SMTP_PORT").ok().and_then(|s| s.parse::<u16>().ok()).unwrap_or(587);
        let smtp_user = env::var("AGL_SMTP_USER").ok().unwrap_or_default();
        let smtp_pass = Secret::new(env::var("AGL_SMTP_PASS").ok().unwrap_or_default());
        let mail_from =
            env::var("AGL_MAIL_FROM").ok().unwrap_or_else(|| "\"AgroLink\" <no-reply@agrolink.cl>".to_string());
        Self { smtp_host, smtp_port, smtp_user, smtp_pass, mail_from }
    }

    pub fn is_enabled(&self) -> bool {
        !self.smtp_host.is_empty()
    }
}
