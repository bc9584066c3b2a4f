use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("{0} environment variable is required when PG_DSN is not set")]
    MissingDatabaseSetting(&'static str),
}

/// Backing store for the notes table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pg_dsn: Option<String>,
    pub db_host: Option<String>,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub notes_store: StoreKind,
}

const fn default_db_port() -> u16 {
    5432
}

const fn default_port() -> u16 {
    3001
}

impl Config {
    pub fn database_dsn(&self) -> Result<String, ConfigError> {
        if let Some(dsn) = &self.pg_dsn {
            return Ok(dsn.clone());
        }

        let host = self
            .db_host
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseSetting("DB_HOST"))?;
        let user = self
            .db_user
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseSetting("DB_USER"))?;
        let name = self
            .db_name
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseSetting("DB_NAME"))?;

        let mut dsn = format!(
            "host={} port={} user={} dbname={}",
            quote(host),
            self.db_port,
            quote(user),
            quote(name)
        );
        if let Some(password) = &self.db_password {
            dsn.push_str(" password=");
            dsn.push_str(&quote(password));
        }

        Ok(dsn)
    }
}

// Key/value connection strings take single-quoted values with backslash escapes.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config: Config = envy::from_env()?;

    match config.notes_store {
        StoreKind::Postgres => {
            // Fail at startup rather than on first connection attempt
            config.database_dsn()?;
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory note store, notes will not survive a restart");
        }
    }

    Ok(config)
}
