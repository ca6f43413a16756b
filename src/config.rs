use std::net::SocketAddr;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Load configuration from environment variables.
    /// LISTEN_ADDR defaults to "0.0.0.0:3000"; PORT, when set, overrides
    /// just the port part.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("LISTEN_ADDR", "must be a valid socket address"))?;

        if let Ok(raw) = std::env::var("PORT") {
            let port = raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", "must be a port number"))?;
            listen_addr.set_port(port);
        }

        Ok(Config { listen_addr })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}
