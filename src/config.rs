use crate::error::{BadEnvVarSnafu, MissingEnvVarSnafu, ParseEnvNumberSnafu, RosterResult};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::{OptionExt, ResultExt};
use sqlx::postgres::PgConnectOptions;
use std::{env::VarError, str::FromStr, sync::Arc};

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_config: ServerConfig,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> RosterResult<Option<String>>,
    ) -> RosterResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::from_lookup(&lookup)?),
            server_config: ServerConfig::from_lookup(&lookup)?,
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub const fn server_config(&self) -> &ServerConfig {
        &self.server_config
    }
}

fn env_var(name: &'static str) -> RosterResult<Option<String>> {
    match var(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(e) => Err(e).context(BadEnvVarSnafu { name }),
    }
}

fn parse_or<T: FromStr<Err = std::num::ParseIntError>>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> RosterResult<T> {
    value.map_or(Ok(default), |v| {
        v.trim().parse().context(ParseEnvNumberSnafu { name })
    })
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    host: String,
    port: u16,
    database: String,
    max_connections: u32,
}

impl DbConfig {
    fn from_lookup(
        lookup: &impl Fn(&'static str) -> RosterResult<Option<String>>,
    ) -> RosterResult<Self> {
        let required = |name: &'static str| -> RosterResult<String> {
            lookup(name)?.context(MissingEnvVarSnafu { name })
        };

        Ok(Self {
            user: required("DB_USER")?,
            password: SecretString::from(required("DB_PASSWORD")?),
            host: lookup("DB_HOST")?.unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(lookup("DB_PORT")?, "DB_PORT", 5432)?,
            database: lookup("DB_NAME")?.unwrap_or_else(|| "course_management".to_string()),
            max_connections: parse_or(lookup("DB_MAX_CONNECTIONS")?, "DB_MAX_CONNECTIONS", 15)?,
        })
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.database)
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    host: String,
    port: u16,
}

impl ServerConfig {
    fn from_lookup(
        lookup: &impl Fn(&'static str) -> RosterResult<Option<String>>,
    ) -> RosterResult<Self> {
        Ok(Self {
            host: lookup("SERVER_HOST")?.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(lookup("PORT")?, "PORT", 3001)?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
