//! Environment-driven settings for the server and the terminal client.
//!
//! Both binaries call `dotenvy::dotenv()` first, so a `.env` file next to
//! the working directory is honoured. Values are read through a lookup
//! function which keeps parsing testable without mutating the process
//! environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://family-todo.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_CACHE_PATH: &str = ".family-todo/todos.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Insert the default members and todos into empty tables on startup.
    pub seed_defaults: bool,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse().with_context(|| format!("invalid BIND_ADDR `{bind_addr}`"))?;
        let seed_defaults = match lookup("SEED_DEFAULTS") {
            Some(raw) => parse_flag(&raw).with_context(|| format!("invalid SEED_DEFAULTS `{raw}`"))?,
            None => true,
        };
        Ok(Self { database_url, bind_addr, seed_defaults })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub cache_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_base_url: lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            cache_path: lookup("CACHE_PATH").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
        }
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("expected a boolean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn server_defaults() {
        let cfg = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(cfg.seed_defaults);
    }

    #[test]
    fn server_overrides_and_bad_values() {
        let cfg = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:"), ("BIND_ADDR", "0.0.0.0:8080"), ("SEED_DEFAULTS", "off")])).unwrap();
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert!(!cfg.seed_defaults);

        assert!(ServerConfig::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("SEED_DEFAULTS", "maybe")])).is_err());
    }

    #[test]
    fn client_overrides() {
        let cfg = ClientConfig::from_lookup(lookup(&[("CACHE_PATH", "/tmp/todos.json")]));
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.cache_path, PathBuf::from("/tmp/todos.json"));
    }
}
