//! npm registry client: packument fetch, version resolution, and streaming
//! tarball downloads through one shared `ureq::Agent` (TCP connection reuse).

use crate::config::Config;
use crate::error::UnboxError;
use crate::spec::PackageSpec;
use semver::{Version, VersionReq};
use std::io::Read;

const ABBREVIATED_PACKUMENT: &str = "application/vnd.npm.install-v1+json";
const CONNECT_TIMEOUT_MS: u64 = 10_000;

/// The registry's resolution of a spec to one concrete published version,
/// along with where to fetch its archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub tarball: String,
    pub integrity: Option<String>,
}

pub struct RegistryClient {
    base_url: String,
    auth_token: Option<String>,
    agent: ureq::Agent,
}

impl RegistryClient {
    pub fn new(config: &Config) -> RegistryClient {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(std::time::Duration::from_millis(CONNECT_TIMEOUT_MS))
            .timeout(config.http_timeout)
            .build();
        RegistryClient {
            base_url: config.registry_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            agent,
        }
    }

    /// Resolve a spec to a concrete version via the packument. Returns
    /// `Ok(None)` when the package does not exist or no published version
    /// satisfies the range; transport and server errors propagate.
    pub fn resolve_manifest(&self, spec: &PackageSpec) -> Result<Option<Manifest>, UnboxError> {
        let Some(packument) = self.fetch_packument(&spec.name)? else {
            return Ok(None);
        };

        let Some(version) = resolve_version(&packument, &spec.range) else {
            return Ok(None);
        };

        let dist = packument
            .get("versions")
            .and_then(|v| v.get(&version))
            .and_then(|v| v.get("dist"));
        let Some(tarball) = dist.and_then(|d| d.get("tarball")).and_then(|t| t.as_str()) else {
            return Err(UnboxError::Registry {
                url: self.packument_url(&spec.name),
                status: None,
                source: format!("no dist.tarball for {}@{}", spec.name, version),
            });
        };
        let integrity = dist
            .and_then(|d| d.get("integrity"))
            .and_then(|i| i.as_str())
            .map(String::from);

        Ok(Some(Manifest {
            name: spec.name.clone(),
            version,
            tarball: tarball.to_string(),
            integrity,
        }))
    }

    /// Open a streaming download of the version's archive. The caller
    /// consumes the reader incrementally; the whole tarball is never
    /// buffered here. `Ok(None)` means the exact version disappeared
    /// between manifest resolution and fetch.
    pub fn fetch_tarball(
        &self,
        manifest: &Manifest,
    ) -> Result<Option<Box<dyn Read + Send + Sync + 'static>>, UnboxError> {
        match self.get(&manifest.tarball, None) {
            Ok(response) => Ok(Some(response.into_reader())),
            Err(UnboxError::Registry {
                status: Some(404), ..
            }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn packument_url(&self, name: &str) -> String {
        // Scoped names keep their @ but encode the inner slash.
        let path = if name.starts_with('@') {
            name.replace('/', "%2F")
        } else {
            name.to_string()
        };
        format!("{}/{}", self.base_url, path)
    }

    fn fetch_packument(&self, name: &str) -> Result<Option<serde_json::Value>, UnboxError> {
        let url = self.packument_url(name);
        let response = match self.get(&url, Some(ABBREVIATED_PACKUMENT)) {
            Ok(response) => response,
            Err(UnboxError::Registry {
                status: Some(404), ..
            }) => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| UnboxError::Registry {
                url: url.clone(),
                status: None,
                source: e.to_string(),
            })?;

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| UnboxError::Registry {
                url,
                status: None,
                source: format!("invalid packument JSON: {}", e),
            })
    }

    fn get(&self, url: &str, accept: Option<&str>) -> Result<ureq::Response, UnboxError> {
        let mut request = self.agent.get(url);
        if let Some(accept) = accept {
            request = request.set("Accept", accept);
        }
        if let Some(token) = self.auth_token.as_deref().filter(|t| !t.is_empty()) {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        match request.call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, _)) => Err(UnboxError::Registry {
                url: url.to_string(),
                status: Some(status),
                source: format!("HTTP {}", status),
            }),
            Err(err) => Err(UnboxError::Registry {
                url: url.to_string(),
                status: None,
                source: err.to_string(),
            }),
        }
    }
}

/// Resolve a range string against a packument: exact published version
/// first, then dist-tags (`latest` included), then the highest version
/// satisfying the range.
pub fn resolve_version(packument: &serde_json::Value, range: &str) -> Option<String> {
    let range = range.trim();
    let dist_tags = packument.get("dist-tags").and_then(|t| t.as_object());

    if range.is_empty() || range == "latest" {
        return dist_tags?
            .get("latest")
            .and_then(|v| v.as_str())
            .map(String::from);
    }

    let versions = packument.get("versions")?.as_object()?;
    if versions.contains_key(range) {
        return Some(range.to_string());
    }

    if let Some(tagged) = dist_tags.and_then(|t| t.get(range)).and_then(|v| v.as_str()) {
        return Some(tagged.to_string());
    }

    let all: Vec<String> = versions.keys().cloned().collect();
    resolve_range(&all, range)
}

/// Highest version from `versions` satisfying `range` (empty is treated as
/// `*`; prereleases only match when the range names one). None when the
/// range does not parse or nothing satisfies it.
pub fn resolve_range(versions: &[String], range: &str) -> Option<String> {
    let range = range.trim();
    let range = if range.is_empty() { "*" } else { range };
    let req = VersionReq::parse(range).ok()?;
    let mut satisfying: Vec<Version> = versions
        .iter()
        .filter_map(|s| Version::parse(s).ok())
        .filter(|v| req.matches(v))
        .collect();
    satisfying.sort();
    satisfying.pop().map(|v| v.to_string())
}
