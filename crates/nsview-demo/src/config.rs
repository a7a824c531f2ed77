//! Demo server configuration (`nsview.toml`).
//!
//! Discovery order:
//! 1. `--config <path>` (must exist)
//! 2. `./nsview.toml` (project-local, optional)
//! 3. built-in defaults

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

const CONFIG_FILENAME: &str = "nsview.toml";

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_views_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("domains")
}

fn default_globals() -> BTreeMap<String, toml::Value> {
    BTreeMap::from([("title".to_string(), toml::Value::from("nsview quotes"))])
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DemoConfig {
    /// Socket address the server binds.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// URL path the root template is served at.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Directory holding one `<domain>/views/` tree per domain.
    #[serde(default = "default_views_root")]
    pub views_root: PathBuf,

    /// Constants exposed to templates through `global(key=...)`.
    #[serde(default = "default_globals")]
    pub globals: BTreeMap<String, toml::Value>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            base_path: default_base_path(),
            views_root: default_views_root(),
            globals: default_globals(),
        }
    }
}

impl DemoConfig {
    /// Parse a config document.
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("parse demo config")
    }

    /// Load the config from `explicit`, else `./nsview.toml`, else defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(CONFIG_FILENAME);
                if !local.is_file() {
                    tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
                    return Ok(Self::default());
                }
                local
            }
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("load config {}", path.display()))?;
        tracing::debug!(?path, "Loaded demo config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DemoConfig::default();
        assert_eq!(config.listen.to_string(), "127.0.0.1:8080");
        assert_eq!(config.base_path, "/");
        assert!(config.views_root.ends_with("domains"));
        assert_eq!(
            config.globals.get("title").and_then(|v| v.as_str()),
            Some("nsview quotes")
        );
    }

    #[test]
    fn test_parse_config_toml() {
        let config = DemoConfig::from_toml(
            r#"
listen = "0.0.0.0:3000"
base-path = "/app"
views-root = "./domains"

[globals]
title = "Flight"
year = 2026
"#,
        )
        .unwrap();
        assert_eq!(config.listen.port(), 3000);
        assert_eq!(config.base_path, "/app");
        assert_eq!(config.views_root, PathBuf::from("./domains"));
        assert_eq!(config.globals["year"].as_integer(), Some(2026));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = DemoConfig::from_toml("base-path = \"/app\"\n").unwrap();
        assert_eq!(config.base_path, "/app");
        assert_eq!(config.listen, default_listen());
        assert!(config.globals.contains_key("title"));
    }

    #[test]
    fn test_parse_rejects_bad_listen() {
        assert!(DemoConfig::from_toml("listen = \"not an address\"\n").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.toml");
        std::fs::write(&path, "listen = \"127.0.0.1:9090\"\n").unwrap();

        let config = DemoConfig::load(Some(&path)).unwrap();
        assert_eq!(config.listen.port(), 9090);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = DemoConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
