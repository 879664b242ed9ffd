//! Service settings from command-line flags and environment variables.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use clap::{Parser, ValueEnum};
use thiserror::Error;

/// Deployment environment reported by the healthcheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("port must be between 1 and 65535")]
    InvalidPort,
}

/// HTTP service settings.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "userapi", about = "User management JSON API")]
pub struct ServiceConfig {
    /// Port to listen on.
    #[arg(long, env = "SERVICE_PORT", default_value_t = 4000)]
    pub port: u16,

    /// Deployment environment.
    #[arg(long = "env", env = "APP_ENV", value_enum, default_value_t = Environment::Development)]
    pub environment: Environment,
}

impl ServiceConfig {
    /// Parse from the process arguments and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(std::env::args_os())
    }

    pub fn load_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Self::try_parse_from(args)?;
        if config.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(config)
    }

    /// Address to bind: all interfaces on the configured port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
