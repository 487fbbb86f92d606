//! Configuration loading from the process environment and a dotenv file.

use crate::defaults::{
    DEFAULT_ENV_FILE, ENV_CATEGORY_NAME, ENV_GLOBAL_ACCESS_ROLE, ENV_GUILD_ID,
    ENV_PARTICIPANT_ROLE, ENV_ROSTER_FILE, ENV_TOKEN, REQUIRED_VARS,
};
use crate::schema::Config;
use crate::validator::{non_empty, parse_guild_id, token_looks_valid};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required variables are unset or blank
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// The guild id is not a positive integer
    #[error("{var} is not a valid integer guild id: {value:?}")]
    InvalidGuildId {
        /// Variable that held the value.
        var: &'static str,
        /// The rejected raw value.
        value: String,
    },

    /// The dotenv file exists but could not be read or parsed
    #[error("Failed to read environment file '{}': {source}", .path.display())]
    EnvFile {
        /// Path of the dotenv file.
        path: PathBuf,
        /// Underlying dotenv error.
        #[source]
        source: dotenvy::Error,
    },
}

/// Configuration loader for the application
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_file: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
        }
    }
}

impl ConfigLoader {
    /// Creates a loader that reads `.env` from the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads variables from `path` instead of `.env`.
    #[must_use]
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    /// Loads configuration. Process environment values take precedence over
    /// the dotenv file, and a missing dotenv file is ignored.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let file_vars = read_env_file(&self.env_file)?;

        Self::from_lookup(|key| env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Builds a configuration from an arbitrary variable source.
    ///
    /// Every missing variable is collected before failing so the diagnostic
    /// names all of them at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values: HashMap<&'static str, String> = HashMap::new();
        let mut missing = Vec::new();

        for var in REQUIRED_VARS {
            match non_empty(lookup(var)) {
                Some(value) => {
                    values.insert(var, value);
                }
                None => missing.push(var),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let mut take = |var: &str| values.remove(var).unwrap_or_default();

        let guild_id = parse_guild_id(&take(ENV_GUILD_ID))?;
        let token = take(ENV_TOKEN);
        if !token_looks_valid(&token) {
            warn!("{ENV_TOKEN} does not look like a bot token; login will likely fail");
        }

        Ok(Config {
            token,
            guild_id,
            category_name: take(ENV_CATEGORY_NAME),
            roster_path: PathBuf::from(take(ENV_ROSTER_FILE)),
            participant_role_name: take(ENV_PARTICIPANT_ROLE),
            global_access_role_name: take(ENV_GLOBAL_ACCESS_ROLE),
        })
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), "No environment file found");
            return Ok(HashMap::new());
        }
        Err(source) => {
            return Err(ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        })?;
        vars.insert(key, value);
    }

    debug!(path = %path.display(), count = vars.len(), "Loaded environment file");
    Ok(vars)
}
