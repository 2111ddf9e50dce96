//! The engine surface consumed by a serving layer: resolve a spec to a
//! concrete version, make sure that version is cached, then answer path
//! resolution, metadata, and file-content requests out of the store.

use crate::config::Config;
use crate::error::UnboxError;
use crate::metadata::{build_metadata, MetadataNode};
use crate::registry::{Manifest, RegistryClient};
use crate::resolve::resolve_path;
use crate::spec::PackageSpec;
use crate::store::{CacheStore, PackageInfo, StoredFile};

pub struct Cdn {
    registry: RegistryClient,
    store: CacheStore,
}

impl Cdn {
    /// Open the cache store under the configured directory and stand up a
    /// registry client. The store handle lives as long as the engine; there
    /// is no ambient global state.
    pub fn open(config: Config) -> Result<Cdn, UnboxError> {
        let store = CacheStore::open(&config.cache_dir, config.max_cache_bytes)?;
        Ok(Cdn {
            registry: RegistryClient::new(&config),
            store,
        })
    }

    /// Resolve `name[@versionOrRange]` to a concrete published version.
    /// Repeated calls with no intervening publish return the same version.
    pub fn resolve_manifest(&self, raw_spec: &str) -> Result<Manifest, UnboxError> {
        let spec = PackageSpec::parse(raw_spec)?;
        self.resolve_spec(&spec)
    }

    fn resolve_spec(&self, spec: &PackageSpec) -> Result<Manifest, UnboxError> {
        self.registry
            .resolve_manifest(spec)?
            .ok_or_else(|| UnboxError::PackageNotFound {
                package: spec.name.clone(),
                range: spec.range.clone(),
            })
    }

    /// Idempotent: download and ingest the version's tarball on a miss,
    /// refresh its last-used timestamp on a hit. Concurrent calls for the
    /// same version coalesce onto one download.
    pub fn ensure_cached(&self, name: &str, version: &str) -> Result<(), UnboxError> {
        self.store.ensure_package(name, version, || {
            let manifest = self.tarball_manifest(name, version)?;
            match self.registry.fetch_tarball(&manifest)? {
                Some(stream) => Ok((stream, manifest.integrity)),
                None => {
                    // The exact version 404ed between resolution and fetch;
                    // re-resolve once before giving up.
                    let manifest = self.tarball_manifest(name, version)?;
                    match self.registry.fetch_tarball(&manifest)? {
                        Some(stream) => Ok((stream, manifest.integrity)),
                        None => Err(UnboxError::VersionNotFound {
                            package: name.to_string(),
                            version: version.to_string(),
                        }),
                    }
                }
            }
        })?;
        Ok(())
    }

    fn tarball_manifest(&self, name: &str, version: &str) -> Result<Manifest, UnboxError> {
        let spec = PackageSpec::exact(name, version);
        self.registry
            .resolve_manifest(&spec)?
            .ok_or_else(|| UnboxError::VersionNotFound {
                package: name.to_string(),
                version: version.to_string(),
            })
    }

    /// Resolve a requested path inside the package to its canonical stored
    /// path, triggering ingest on a cache miss.
    pub fn resolve(&self, name: &str, version: &str, path: &str) -> Result<String, UnboxError> {
        self.ensure_cached(name, version)?;
        resolve_path(&self.store, name, version, path)?.ok_or_else(|| UnboxError::PathNotFound {
            package: name.to_string(),
            version: version.to_string(),
            path: path.to_string(),
        })
    }

    /// File or directory metadata for a base path (empty means the root).
    pub fn get_metadata(
        &self,
        name: &str,
        version: &str,
        path: &str,
    ) -> Result<MetadataNode, UnboxError> {
        self.ensure_cached(name, version)?;
        let listings = self.store.list_files(name, version).unwrap_or_default();
        build_metadata(&listings, path).ok_or_else(|| UnboxError::PathNotFound {
            package: name.to_string(),
            version: version.to_string(),
            path: path.to_string(),
        })
    }

    /// Content and metadata of one stored file by its literal path.
    pub fn get_file(
        &self,
        name: &str,
        version: &str,
        path: &str,
    ) -> Result<StoredFile, UnboxError> {
        self.ensure_cached(name, version)?;
        self.store
            .get_file(name, version, path)?
            .ok_or_else(|| UnboxError::PathNotFound {
                package: name.to_string(),
                version: version.to_string(),
                path: path.to_string(),
            })
    }

    /// Cached package versions, least recently used first.
    pub fn list_cached(&self) -> Vec<PackageInfo> {
        self.store.list_packages()
    }

    pub fn cache_size_bytes(&self) -> u64 {
        self.store.total_bytes()
    }

    pub fn clear_cache(&self) -> Result<(), UnboxError> {
        self.store.clear()
    }
}
