use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use clinica_core::{AppError, OrganizationId};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub session_idle_minutes: i64,
    pub bootstrap_organization_id: Option<OrganizationId>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let database_max_connections = positive_env_number("DATABASE_MAX_CONNECTIONS", 10)?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = positive_env_number("API_PORT", 3001)?;

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let session_idle_minutes = positive_env_number("SESSION_IDLE_MINUTES", 30)?;

        let bootstrap_organization_id = env::var("BOOTSTRAP_ORGANIZATION_ID")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_organization_id(value.as_str()))
            .transpose()?;

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            session_idle_minutes,
            bootstrap_organization_id,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::InvalidInput(format!("invalid API_HOST '{}': {error}", self.api_host))
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

fn parse_organization_id(value: &str) -> Result<OrganizationId, AppError> {
    value.trim().parse::<OrganizationId>().map_err(|error| {
        AppError::InvalidInput(format!("invalid BOOTSTRAP_ORGANIZATION_ID: {error}"))
    })
}

fn positive_env_number<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => parse_positive(name, value.as_str()),
        Err(_) => Ok(default),
    }
}

fn parse_positive<T>(name: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let parsed = value
        .trim()
        .parse::<T>()
        .map_err(|error| AppError::InvalidInput(format!("invalid {name} '{value}': {error}")))?;
    if parsed <= T::default() {
        return Err(AppError::InvalidInput(format!("{name} must be positive")));
    }

    Ok(parsed)
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value =
        env::var(name).map_err(|_| AppError::InvalidInput(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{name} must not be empty")));
    }

    Ok(value)
}
