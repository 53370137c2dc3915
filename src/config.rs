//! Database configuration read from environment variables.
//!
//! | Variable              | Default          |
//! |-----------------------|------------------|
//! | `DATABASE_HOST`       | `localhost`      |
//! | `DATABASE_PORT`       | `5432`           |
//! | `DATABASE_USER`       | `studydesk`      |
//! | `DATABASE_PASSWORD`   | unset            |
//! | `DATABASE_NAME`       | `studydesk`      |
//! | `DATABASE_NAME_TEST`  | `studydesk_test` |
//! | `DATABASE_POOL_SIZE`  | `10`             |
//! | `APP_ENV`             | unset            |
//!
//! `APP_ENV=test` selects `DATABASE_NAME_TEST` instead of `DATABASE_NAME`.

use crate::task::adapters::postgres::TaskPgPool;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::fmt;
use thiserror::Error;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "studydesk";
const DEFAULT_DATABASE: &str = "studydesk";
const DEFAULT_TEST_DATABASE: &str = "studydesk_test";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors returned while reading configuration or opening the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

/// `PostgreSQL` connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Login password, if any.
    pub password: Option<String>,
    /// Database name.
    pub database: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

impl DatabaseConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the port or pool size is
    /// not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the port or pool size is
    /// not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let is_test = read("APP_ENV").is_some_and(|env| env.trim().eq_ignore_ascii_case("test"));
        let database = if is_test {
            read("DATABASE_NAME_TEST").unwrap_or_else(|| DEFAULT_TEST_DATABASE.to_owned())
        } else {
            read("DATABASE_NAME").unwrap_or_else(|| DEFAULT_DATABASE.to_owned())
        };

        Ok(Self {
            host: read("DATABASE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: parse_positive("DATABASE_PORT", read("DATABASE_PORT"), DEFAULT_PORT)?,
            user: read("DATABASE_USER").unwrap_or_else(|| DEFAULT_USER.to_owned()),
            password: read("DATABASE_PASSWORD"),
            database,
            pool_size: parse_positive(
                "DATABASE_POOL_SIZE",
                read("DATABASE_POOL_SIZE"),
                DEFAULT_POOL_SIZE,
            )?,
        })
    }

    /// Returns the `postgres://` connection URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        let user = urlencoding::encode(&self.user);
        let credentials = match &self.password {
            Some(password) => format!("{user}:{}", urlencoding::encode(password)),
            None => user.into_owned(),
        };
        format!(
            "postgres://{credentials}@{}:{}/{}",
            self.host,
            self.port,
            urlencoding::encode(&self.database)
        )
    }

    /// Builds the connection pool shared by the `PostgreSQL` adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot open its initial
    /// connections.
    pub fn build_pool(&self) -> Result<TaskPgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(self.database_url());
        Ok(Pool::builder().max_size(self.pool_size).build(manager)?)
    }
}

fn parse_positive<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed != T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}
