use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::Duration;
use tenura_application::InviteSettings;
use tenura_core::AppError;
use tenura_domain::Role;
use tracing_subscriber::EnvFilter;

const MIN_INTERNAL_TOKEN_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpRuntimeConfig),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub email_provider: EmailProviderConfig,
    pub invite_ttl_hours: i64,
    pub policy_reload_seconds: u64,
    pub invite_default_role: Role,
    pub internal_api_token: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };
        let required_non_empty = |name: &str| {
            let value = required(name)?;
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{name} must not be empty")));
            }

            Ok(value)
        };

        let database_url = required("DATABASE_URL")?;
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let email_provider = match lookup("EMAIL_PROVIDER")
            .unwrap_or_else(|| "console".to_owned())
            .as_str()
        {
            "console" => EmailProviderConfig::Console,
            "smtp" => {
                let port = required_non_empty("SMTP_PORT")?
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;
                EmailProviderConfig::Smtp(SmtpRuntimeConfig {
                    host: required_non_empty("SMTP_HOST")?,
                    port,
                    username: required_non_empty("SMTP_USERNAME")?,
                    password: required_non_empty("SMTP_PASSWORD")?,
                    from_address: required_non_empty("SMTP_FROM_ADDRESS")?,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{other}'"
                )));
            }
        };

        let invite_ttl_hours = match lookup("INVITE_TTL_HOURS") {
            Some(value) => value.trim().parse::<i64>().map_err(|error| {
                AppError::Validation(format!("invalid INVITE_TTL_HOURS: {error}"))
            })?,
            None => 168,
        };
        let policy_reload_seconds = match lookup("POLICY_RELOAD_SECONDS") {
            Some(value) => value.trim().parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid POLICY_RELOAD_SECONDS: {error}"))
            })?,
            None => 30,
        };
        if policy_reload_seconds == 0 {
            return Err(AppError::Validation(
                "POLICY_RELOAD_SECONDS must be positive".to_owned(),
            ));
        }

        let invite_default_role = match lookup("INVITE_DEFAULT_ROLE") {
            Some(value) => Role::from_transport(value.as_str())?,
            None => Role::Moderator,
        };

        let internal_api_token = required("INTERNAL_API_TOKEN")?;
        if internal_api_token.len() < MIN_INTERNAL_TOKEN_LENGTH {
            return Err(AppError::Validation(format!(
                "INTERNAL_API_TOKEN must be at least {MIN_INTERNAL_TOKEN_LENGTH} characters"
            )));
        }

        let config = Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            email_provider,
            invite_ttl_hours,
            policy_reload_seconds,
            invite_default_role,
            internal_api_token,
        };
        config.invite_settings()?;

        Ok(config)
    }

    pub fn invite_settings(&self) -> Result<InviteSettings, AppError> {
        let ttl = Duration::try_hours(self.invite_ttl_hours).ok_or_else(|| {
            AppError::Validation(format!(
                "INVITE_TTL_HOURS is out of range: {}",
                self.invite_ttl_hours
            ))
        })?;
        InviteSettings::new(ttl, self.invite_default_role)
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
