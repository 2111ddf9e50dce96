//! Structured error type for unbox operations.
//! Not-found and retryable conditions are distinguishable without string
//! matching so the serving layer can pick the right response.

use std::fmt;

#[derive(Debug, Clone)]
pub enum UnboxError {
    /// Malformed package identifier. Client error, never retried.
    InvalidSpec { spec: String, reason: String },
    /// Package name unknown to the registry, or no published version
    /// satisfies the requested range.
    PackageNotFound { package: String, range: String },
    /// Exact version 404ed after manifest resolution succeeded
    /// (race with unpublish).
    VersionNotFound { package: String, version: String },
    /// Resolution or metadata lookup matched no stored file or directory.
    PathNotFound {
        package: String,
        version: String,
        path: String,
    },
    /// Transport or server error from the upstream registry.
    Registry {
        url: String,
        status: Option<u16>,
        source: String,
    },
    /// Gzip/tar framing error or integrity mismatch during extraction.
    /// Aborts the whole ingest for that version.
    CorruptArchive { detail: String },
    /// Local I/O failure (cache directory, index file).
    Io { context: String, source: String },
}

impl UnboxError {
    /// Wrap a std::io::Error with the operation it interrupted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        UnboxError::Io {
            context: context.into(),
            source: source.to_string(),
        }
    }

    /// Ordinary absence: maps to a "not found" response, never retried.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            UnboxError::PackageNotFound { .. }
                | UnboxError::VersionNotFound { .. }
                | UnboxError::PathNotFound { .. }
        )
    }

    /// Transient upstream failure: the caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            UnboxError::Registry { status, .. } => {
                status.map_or(true, |s| s >= 500 || s == 429)
            }
            _ => false,
        }
    }
}

impl fmt::Display for UnboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnboxError::InvalidSpec { spec, reason } => {
                write!(f, "invalid package spec {:?}: {}", spec, reason)
            }
            UnboxError::PackageNotFound { package, range } => {
                write!(f, "package not found: {}@{}", package, range)
            }
            UnboxError::VersionNotFound { package, version } => {
                write!(f, "version not found: {}@{}", package, version)
            }
            UnboxError::PathNotFound {
                package,
                version,
                path,
            } => {
                write!(f, "no file at {} in {}@{}", path, package, version)
            }
            UnboxError::Registry {
                url,
                status,
                source,
            } => {
                write!(f, "registry error for {}: {}", url, source)?;
                if let Some(status) = status {
                    write!(f, " (status: {})", status)?;
                }
                Ok(())
            }
            UnboxError::CorruptArchive { detail } => {
                write!(f, "corrupt package archive: {}", detail)
            }
            UnboxError::Io { context, source } => {
                write!(f, "I/O error in {}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for UnboxError {}
