use serde::Deserialize;
use std::net::IpAddr;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yatube_common::util::PositiveDuration;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("SESSION_LIFETIME_SECONDS must be positive, was {0}")]
    SessionLifetime(i64),
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Env {
    pub server_address: IpAddr,
    pub server_port: u16,
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    pub session_lifetime_seconds: Option<i64>,
}

impl Env {
    pub fn session_lifetime(&self) -> Result<Option<PositiveDuration>, ConfigError> {
        self.session_lifetime_seconds
            .map(|seconds| {
                PositiveDuration::new(time::Duration::seconds(seconds))
                    .ok_or(ConfigError::SessionLifetime(seconds))
            })
            .transpose()
    }
}

pub fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "yatube_api=debug,\
                yatube_db=debug,\
                yatube_common=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Loads `.env` if there is one, then reads `T` from the environment.
pub fn load_env<T: for<'de> Deserialize<'de>>() -> Result<T, ConfigError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(ConfigError::from)
}
