//! Core library for unbox: package specs, registry client, tarball ingest,
//! size-bounded cache store, module-style path resolution, and metadata
//! trees. Used by the CLI binary; can be reused by a server front end.

pub mod cdn;
pub mod config;
pub mod content_type;
pub mod error;
pub mod extract;
pub mod integrity;
pub mod metadata;
pub mod registry;
pub mod resolve;
pub mod spec;
pub mod store;

// Re-export the main API surface.
pub use cdn::Cdn;
pub use config::Config;
pub use error::UnboxError;
pub use metadata::MetadataNode;
pub use registry::{Manifest, RegistryClient};
pub use spec::{parse_package_pathname, PackageSpec, ParsedPathname};
pub use store::{CacheStore, FileListing, PackageInfo, StoredFile};
