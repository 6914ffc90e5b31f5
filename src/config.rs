//! Configuration, read once from the environment at startup

use core::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::mirror::TwitterConfig;
use crate::storage::DatabaseConfig;
use crate::utils::env_var_or_else;
use crate::utils::non_empty_var;

/// Listen address when `ADDRESS` is not set
const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

/// Configuration errors, all of them are fatal
#[derive(Debug)]
pub enum Error {
    /// A required variable is not set
    Missing(&'static str),

    /// A variable has an unusable value
    Invalid {
        /// Name of the variable
        name: &'static str,

        /// What is wrong with it
        reason: String,
    },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Missing(name) => write!(f, "`{name}` is required but not set"),
            Error::Invalid { name, reason } => write!(f, "`{name}` is invalid: {reason}"),
        }
    }
}

/// Everything needed to start the service
pub struct Config {
    /// Where the notes are stored
    pub database: DatabaseConfig,

    /// The account notes are mirrored to
    pub twitter: TwitterConfig,

    /// Base for the URLs in responses, the `Host` header is used when not set
    pub public_url: Option<Url>,

    /// Address to listen on
    pub address: SocketAddr,
}

impl Config {
    /// Read the configuration from the environment
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration with a custom variable lookup
    pub fn from_lookup<L>(lookup: L) -> Result<Self, Error>
    where
        L: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| non_empty_var(&lookup, name).ok_or(Error::Missing(name));

        let database = DatabaseConfig::from_database_url(required("DATABASE_URL")?);

        let twitter = TwitterConfig {
            consumer_key: required("CONSUMER_KEY")?,
            consumer_secret: required("CONSUMER_SECRET")?,
            access_key: required("ACCESS_KEY")?,
            access_secret: required("ACCESS_SECRET")?,
            account: required("TWITTER_USER")?,
        };

        let public_url = non_empty_var(&lookup, "PUBLIC_URL")
            .map(|public_url| parse_public_url(&public_url))
            .transpose()?;

        let address = parse_address(
            &env_var_or_else(&lookup, "ADDRESS", || String::from(DEFAULT_ADDRESS)),
            non_empty_var(&lookup, "PORT").as_deref(),
        )?;

        Ok(Self {
            database,
            twitter,
            public_url,
            address,
        })
    }
}

/// Parse the public URL, it needs to be a base for other URLs
fn parse_public_url(public_url: &str) -> Result<Url, Error> {
    let public_url = Url::parse(public_url).map_err(|err| Error::Invalid {
        name: "PUBLIC_URL",
        reason: err.to_string(),
    })?;

    if public_url.cannot_be_a_base() {
        return Err(Error::Invalid {
            name: "PUBLIC_URL",
            reason: "not a base URL".to_string(),
        });
    }

    Ok(public_url)
}

/// Parse the listen address, with an optional override of just the port
fn parse_address(address: &str, port: Option<&str>) -> Result<SocketAddr, Error> {
    let mut address = address.parse::<SocketAddr>().map_err(|err| Error::Invalid {
        name: "ADDRESS",
        reason: err.to_string(),
    })?;

    if let Some(port) = port {
        let port = port.parse::<u16>().map_err(|err| Error::Invalid {
            name: "PORT",
            reason: err.to_string(),
        })?;

        address.set_port(port);
    }

    Ok(address)
}
