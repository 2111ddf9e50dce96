//! Runtime configuration from env vars, with a minimal .npmrc fallback
//! for the registry URL and auth token. Env and explicit setters win.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

const ONE_GIGABYTE: u64 = 1 << 30;
/// Default total byte budget for cached package files.
pub const DEFAULT_MAX_CACHE_BYTES: u64 = 20 * ONE_GIGABYTE;

const DEFAULT_HTTP_TIMEOUT_MS: u64 = 60_000;

/// Everything the engine needs from its environment. Built once at startup
/// and passed down explicitly; no module reads ambient global state.
#[derive(Debug, Clone)]
pub struct Config {
    pub registry_url: String,
    pub auth_token: Option<String>,
    pub cache_dir: PathBuf,
    pub max_cache_bytes: u64,
    /// Whole-request bound: a registry fetch that exceeds this is abandoned.
    pub http_timeout: Duration,
}

impl Config {
    /// Read configuration from the process environment, falling back to
    /// `.npmrc` (cwd, then home) for registry and token, then defaults.
    pub fn from_env() -> Config {
        let npmrc = load_npmrc();

        let registry_url = first_env(&["UNBOX_REGISTRY", "NPM_CONFIG_REGISTRY", "NPM_REGISTRY"])
            .or(npmrc.registry)
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string());

        let auth_token = first_env(&["NODE_AUTH_TOKEN", "NPM_TOKEN"]).or(npmrc.auth_token);

        let cache_dir = std::env::var("UNBOX_CACHE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);

        let max_cache_bytes = std::env::var("UNBOX_MAX_CACHE_BYTES")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_CACHE_BYTES);

        let http_timeout = std::env::var("UNBOX_HTTP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS));

        Config {
            registry_url: registry_url.trim_end_matches('/').to_string(),
            auth_token,
            cache_dir,
            max_cache_bytes,
            http_timeout,
        }
    }

    pub fn with_registry_url(mut self, url: &str) -> Config {
        self.registry_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Config {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_max_cache_bytes(mut self, bytes: u64) -> Config {
        self.max_cache_bytes = bytes;
        self
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            registry_url: DEFAULT_REGISTRY.to_string(),
            auth_token: None,
            cache_dir: default_cache_dir(),
            max_cache_bytes: DEFAULT_MAX_CACHE_BYTES,
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("unbox")
}

fn first_env(keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Ok(v) = std::env::var(key) {
            let v = v.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    None
}

#[derive(Default)]
struct NpmRc {
    registry: Option<String>,
    auth_token: Option<String>,
}

/// Project .npmrc wins over ~/.npmrc. Only `registry=` and `:_authToken=`
/// lines are honored; anything else is ignored.
fn load_npmrc() -> NpmRc {
    let mut merged = NpmRc::default();
    let home = std::env::var("HOME").ok().map(PathBuf::from);
    let candidates = [
        home.map(|h| h.join(".npmrc")),
        Some(PathBuf::from(".npmrc")),
    ];
    for path in candidates.into_iter().flatten() {
        let part = read_npmrc(&path);
        if part.registry.is_some() {
            merged.registry = part.registry;
        }
        if part.auth_token.is_some() {
            merged.auth_token = part.auth_token;
        }
    }
    merged
}

fn read_npmrc(path: &Path) -> NpmRc {
    let mut out = NpmRc::default();
    let Ok(content) = std::fs::read_to_string(path) else {
        return out;
    };
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key == "registry" {
            out.registry = Some(value.trim_end_matches('/').to_string());
        } else if key.ends_with(":_authToken") && !value.is_empty() {
            out.auth_token = Some(value.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.registry_url, DEFAULT_REGISTRY);
        assert_eq!(config.max_cache_bytes, 20 * (1 << 30));
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_builders_normalize_registry_url() {
        let config = Config::default().with_registry_url("https://npm.example.com/");
        assert_eq!(config.registry_url, "https://npm.example.com");
    }

    #[test]
    fn test_read_npmrc_registry_and_token() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".npmrc");
        std::fs::write(
            &path,
            "# comment\nregistry=https://npm.example.com/\n//npm.example.com/:_authToken=tok123\nfund=false\n",
        )
        .unwrap();

        let rc = read_npmrc(&path);
        assert_eq!(rc.registry.as_deref(), Some("https://npm.example.com"));
        assert_eq!(rc.auth_token.as_deref(), Some("tok123"));
    }
}
