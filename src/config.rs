use std::str::FromStr;

use tracing::Level;

use crate::error::Error;

const DATABASE_URI: &str = "FUNDRAISER_DATABASE_URI";
const DATABASE_NAME: &str = "FUNDRAISER_DATABASE_NAME";
const BIND_ADDRESS: &str = "FUNDRAISER_BIND_ADDRESS";
const LOG_LEVEL: &str = "FUNDRAISER_LOG_LEVEL";
const STORAGE: &str = "FUNDRAISER_STORAGE";
const SEED: &str = "FUNDRAISER_SEED";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Storage {
    Mongo,
    Memory,
}

impl FromStr for Storage {
    type Err = ();
    fn from_str(s: &str) -> Result<Storage, ()> {
        match s {
            "mongo" => Ok(Storage::Mongo),
            "memory" => Ok(Storage::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_uri: String,
    pub database_name: String,
    pub bind_address: String,
    pub log_level: Level,
    pub storage: Storage,
    pub seed: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            database_uri: "mongodb://localhost:27017".to_string(),
            database_name: "fundraiser".to_string(),
            bind_address: "127.0.0.1:8080".to_string(),
            log_level: Level::INFO,
            storage: Storage::Mongo,
            seed: false,
        }
    }
}

impl Config {
    /// Builds the configuration from the defaults overridden by any
    /// `FUNDRAISER_*` environment variables that are set.
    pub fn from_env() -> Result<Config, Error> {
        Config::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Config, Error>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(uri) = var(DATABASE_URI) {
            config.database_uri = uri;
        }
        if let Some(name) = var(DATABASE_NAME) {
            config.database_name = name;
        }
        if let Some(address) = var(BIND_ADDRESS) {
            config.bind_address = address;
        }
        if let Some(level) = var(LOG_LEVEL) {
            config.log_level = parse(LOG_LEVEL, level)?;
        }
        if let Some(storage) = var(STORAGE) {
            config.storage = parse(STORAGE, storage)?;
        }
        if let Some(seed) = var(SEED) {
            config.seed = parse(SEED, seed)?;
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| Error::InvalidConfig { key, value })
}
