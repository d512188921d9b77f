use std::{env, path::PathBuf};

use anyhow::{Context, Error};

use crate::lookup::DEFAULT_API_URL;

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

pub const API_URL_VAR: &str = "GITHUB_EXPLORER_API_URL";
pub const DATA_DIR_VAR: &str = "GITHUB_EXPLORER_DATA_DIR";
pub const PORT_VAR: &str = "PORT";

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Base of the GitHub REST API.
    pub api_url: String,
    /// Directory holding the persisted repository list.
    pub data_dir: PathBuf,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let data_dir = lookup(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let port = match lookup(PORT_VAR) {
            Some(value) => value
                .parse()
                .with_context(|| format!("{} is not a valid port: {}", PORT_VAR, value))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_url,
            data_dir,
            port,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
