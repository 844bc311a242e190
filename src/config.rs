use std::env;
use std::net::SocketAddr;

use axum::http::HeaderName;
use dotenv::dotenv;
use tracing::info;

use crate::domain::services::feed::FeedDelivery;

const BIND_ADDR: &str = "BIND_ADDR";
const FANOUT_CHANNEL_CAPACITY: &str = "FANOUT_CHANNEL_CAPACITY";
const FEED_DELIVERY: &str = "FEED_DELIVERY";
const CORS_ORIGINS: &str = "CORS_ORIGINS";
const AUTH_HEADER: &str = "AUTH_HEADER";

const DEFAULT_CHANNEL_CAPACITY: usize = 100;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_AUTH_HEADER: &str = "x-user-id";

pub(crate) const WILDCARD_ORIGIN: &str = "*";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Buffer size of every subscriber channel, in events.
    pub channel_capacity: usize,
    pub feed_delivery: FeedDelivery,
    pub cors_origins: Vec<String>,
    /// Header carrying the authenticated user id, set by the upstream gateway.
    pub auth_header: HeaderName,
}

impl Config {
    pub fn from_env() -> Config {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_from_env() -> Result<Config, String> {
        // Load .env file
        dotenv().ok();

        let defaults = Config::default();

        let bind_addr = match env::var(BIND_ADDR) {
            Ok(value) => value
                .trim()
                .parse::<SocketAddr>()
                .map_err(|_| format!("failed to parse {}: {}", BIND_ADDR, value))?,
            Err(_) => defaults.bind_addr,
        };

        let channel_capacity = match env::var(FANOUT_CHANNEL_CAPACITY) {
            Ok(value) => parse_capacity(&value)?,
            Err(_) => defaults.channel_capacity,
        };

        let feed_delivery = match env::var(FEED_DELIVERY) {
            Ok(value) => value.parse::<FeedDelivery>()?,
            Err(_) => defaults.feed_delivery,
        };

        let cors_origins = match env::var(CORS_ORIGINS) {
            Ok(value) => parse_cors_origins(&value)?,
            Err(_) => defaults.cors_origins,
        };

        let auth_header = match env::var(AUTH_HEADER) {
            Ok(value) => HeaderName::from_bytes(value.trim().to_ascii_lowercase().as_bytes())
                .map_err(|_| format!("failed to parse {}: {}", AUTH_HEADER, value))?,
            Err(_) => defaults.auth_header,
        };

        info!(
            %bind_addr,
            channel_capacity,
            %feed_delivery,
            "Loaded configuration"
        );

        Ok(Config {
            bind_addr,
            channel_capacity,
            feed_delivery,
            cors_origins,
            auth_header,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            feed_delivery: FeedDelivery::default(),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            auth_header: HeaderName::from_static(DEFAULT_AUTH_HEADER),
        }
    }
}

/// Parses a subscriber buffer size. Zero is rejected.
pub fn parse_capacity(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(format!("{} must be greater than zero", FANOUT_CHANNEL_CAPACITY)),
        Ok(capacity) => Ok(capacity),
        Err(_) => Err(format!("failed to parse {}: {}", FANOUT_CHANNEL_CAPACITY, value)),
    }
}

/// Parses a comma-separated origin list.
///
/// The API allows credentials, so the `*` wildcard is rejected.
pub fn parse_cors_origins(value: &str) -> Result<Vec<String>, String> {
    let mut origins = Vec::new();
    for origin in value.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        if origin == WILDCARD_ORIGIN {
            return Err(format!(
                "{} cannot contain `*`: credentialed requests need explicit origins",
                CORS_ORIGINS
            ));
        }
        origins.push(origin.to_string());
    }
    Ok(origins)
}
