//! Disk-backed package cache. Each cached package version owns a directory
//! of extracted files plus an entry in an in-memory index that is mirrored
//! to `index.json`. Ingest is all-or-nothing: files are extracted into a
//! staging directory, renamed into place, and only then published in the
//! index, so readers never observe a half-ingested package. A size budget
//! over the whole store is enforced by a least-recently-used sweep at
//! package-version granularity after every successful ingest.

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::content_type::content_type;
use crate::error::UnboxError;
use crate::extract::{extract_files, read_entry};
use crate::integrity::{integrity, HashingReader, SriVerifier};

const INDEX_FILE: &str = "index.json";
const PACKAGES_DIR: &str = "packages";
const STAGE_DIR: &str = "stage";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PackageKey {
    name: String,
    version: String,
}

impl PackageKey {
    fn new(name: &str, version: &str) -> PackageKey {
        PackageKey {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// Directory name for this package version. Scoped names contain a
    /// slash, which becomes `%` on disk.
    fn dir_name(&self) -> String {
        format!("{}@{}", self.name, self.version).replace('/', "%")
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileMeta {
    content_type: String,
    integrity: String,
    size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PackageEntry {
    last_used_at: i64,
    /// Insertion sequence number; breaks last_used_at ties deterministically.
    seq: u64,
    bytes: u64,
    files: BTreeMap<String, FileMeta>,
}

#[derive(Default)]
struct StoreState {
    packages: HashMap<PackageKey, PackageEntry>,
    total_bytes: u64,
}

#[derive(Serialize, Deserialize)]
struct IndexRecord {
    name: String,
    version: String,
    #[serde(flatten)]
    entry: PackageEntry,
}

/// File metadata row without content, for listings and metadata trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListing {
    pub path: String,
    pub content_type: String,
    pub integrity: String,
    pub size: u64,
}

/// A stored file with its content loaded.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub integrity: String,
    pub size: u64,
}

/// Summary row for one cached package version.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub bytes: u64,
    pub last_used_at: i64,
}

pub struct CacheStore {
    root: PathBuf,
    max_bytes: u64,
    state: RwLock<StoreState>,
    /// Per-(name, version) ingest locks: concurrent requests for one key
    /// coalesce onto a single download and extraction.
    ingest_locks: DashMap<PackageKey, Arc<Mutex<()>>>,
    seq: AtomicU64,
    stage_counter: AtomicU64,
}

impl CacheStore {
    /// Open (or create) a store rooted at `root`. The index is reloaded
    /// from disk; entries whose package directory went missing are dropped.
    /// Leftover staging directories from interrupted ingests are cleared.
    pub fn open(root: impl Into<PathBuf>, max_bytes: u64) -> Result<CacheStore, UnboxError> {
        let root = root.into();
        fs::create_dir_all(root.join(PACKAGES_DIR))
            .map_err(|e| UnboxError::io("create cache directory", e))?;
        let stage_root = root.join(STAGE_DIR);
        let _ = fs::remove_dir_all(&stage_root);
        fs::create_dir_all(&stage_root)
            .map_err(|e| UnboxError::io("create staging directory", e))?;

        let mut state = StoreState::default();
        let mut max_seq = 0u64;
        if let Ok(bytes) = fs::read(root.join(INDEX_FILE)) {
            if let Ok(records) = serde_json::from_slice::<Vec<IndexRecord>>(&bytes) {
                for record in records {
                    let key = PackageKey::new(&record.name, &record.version);
                    if !root.join(PACKAGES_DIR).join(key.dir_name()).is_dir() {
                        continue;
                    }
                    max_seq = max_seq.max(record.entry.seq);
                    state.total_bytes += record.entry.bytes;
                    state.packages.insert(key, record.entry);
                }
            }
        }

        Ok(CacheStore {
            root,
            max_bytes,
            state: RwLock::new(state),
            ingest_locks: DashMap::new(),
            seq: AtomicU64::new(max_seq + 1),
            stage_counter: AtomicU64::new(0),
        })
    }

    pub fn has_package(&self, name: &str, version: &str) -> bool {
        let state = self.state.read().unwrap();
        state.packages.contains_key(&PackageKey::new(name, version))
    }

    /// Refresh the package's last-used timestamp. No-op if absent.
    pub fn touch_package(&self, name: &str, version: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(entry) = state.packages.get_mut(&PackageKey::new(name, version)) {
            entry.last_used_at = Utc::now().timestamp_millis();
            // Recency only orders future evictions; failing to persist it
            // is harmless, so this write is best-effort.
            let _ = self.save_index(&state);
        }
    }

    /// Make sure the package version is cached, fetching and ingesting it
    /// at most once no matter how many callers arrive concurrently. `fetch`
    /// yields the tarball stream and the registry's expected SRI digest;
    /// it only runs on a miss, under this key's ingest lock. Returns true
    /// when this call performed the ingest.
    pub fn ensure_package<R, F>(
        &self,
        name: &str,
        version: &str,
        fetch: F,
    ) -> Result<bool, UnboxError>
    where
        R: Read,
        F: FnOnce() -> Result<(R, Option<String>), UnboxError>,
    {
        let key = PackageKey::new(name, version);
        let lock = self
            .ingest_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard: MutexGuard<'_, ()> = match lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if self.has_package(name, version) {
            self.touch_package(name, version);
            return Ok(false);
        }

        let (stream, expected_sri) = fetch()?;
        self.ingest(&key, stream, expected_sri.as_deref())?;
        Ok(true)
    }

    /// Whether this literal rooted path exists among the package's files.
    pub fn contains_file(&self, name: &str, version: &str, path: &str) -> bool {
        let state = self.state.read().unwrap();
        state
            .packages
            .get(&PackageKey::new(name, version))
            .map_or(false, |entry| entry.files.contains_key(path))
    }

    /// Load one stored file with its content. `Ok(None)` when the package
    /// or path is not cached.
    pub fn get_file(
        &self,
        name: &str,
        version: &str,
        path: &str,
    ) -> Result<Option<StoredFile>, UnboxError> {
        let key = PackageKey::new(name, version);
        let (dir, meta) = {
            let state = self.state.read().unwrap();
            let Some(entry) = state.packages.get(&key) else {
                return Ok(None);
            };
            let Some(meta) = entry.files.get(path) else {
                return Ok(None);
            };
            (self.package_dir(&key), meta.clone())
        };

        let content = fs::read(dir.join(path.trim_start_matches('/')))
            .map_err(|e| UnboxError::io(format!("read cached file {}{}", key, path), e))?;
        Ok(Some(StoredFile {
            path: path.to_string(),
            content,
            content_type: meta.content_type,
            integrity: meta.integrity,
            size: meta.size,
        }))
    }

    /// Metadata rows (no content) for every file of the package version,
    /// sorted by path. `None` when the package version is not cached.
    pub fn list_files(&self, name: &str, version: &str) -> Option<Vec<FileListing>> {
        let state = self.state.read().unwrap();
        let entry = state.packages.get(&PackageKey::new(name, version))?;
        Some(
            entry
                .files
                .iter()
                .map(|(path, meta)| FileListing {
                    path: path.clone(),
                    content_type: meta.content_type.clone(),
                    integrity: meta.integrity.clone(),
                    size: meta.size,
                })
                .collect(),
        )
    }

    /// Every cached package version, least recently used first.
    pub fn list_packages(&self) -> Vec<PackageInfo> {
        let state = self.state.read().unwrap();
        let mut out: Vec<PackageInfo> = state
            .packages
            .iter()
            .map(|(key, entry)| PackageInfo {
                name: key.name.clone(),
                version: key.version.clone(),
                bytes: entry.bytes,
                last_used_at: entry.last_used_at,
            })
            .collect();
        out.sort_by_key(|p| p.last_used_at);
        out
    }

    pub fn total_bytes(&self) -> u64 {
        self.state.read().unwrap().total_bytes
    }

    pub fn package_count(&self) -> usize {
        self.state.read().unwrap().packages.len()
    }

    /// Drop every cached package and reset the index.
    pub fn clear(&self) -> Result<(), UnboxError> {
        let mut state = self.state.write().unwrap();
        let packages_root = self.root.join(PACKAGES_DIR);
        fs::remove_dir_all(&packages_root)
            .and_then(|_| fs::create_dir_all(&packages_root))
            .map_err(|e| UnboxError::io("clear cache", e))?;
        state.packages.clear();
        state.total_bytes = 0;
        self.save_index(&state)
    }

    fn package_dir(&self, key: &PackageKey) -> PathBuf {
        self.root.join(PACKAGES_DIR).join(key.dir_name())
    }

    fn ingest(
        &self,
        key: &PackageKey,
        stream: impl Read,
        expected_sri: Option<&str>,
    ) -> Result<(), UnboxError> {
        let stage = self.root.join(STAGE_DIR).join(format!(
            "{}-{}",
            std::process::id(),
            self.stage_counter.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&stage)
            .map_err(|e| UnboxError::io("create staging directory", e))?;

        match self.extract_to_stage(&stage, stream, expected_sri) {
            Ok((files, bytes)) => self.commit(key, &stage, files, bytes),
            Err(err) => {
                let _ = fs::remove_dir_all(&stage);
                Err(err)
            }
        }
    }

    fn extract_to_stage(
        &self,
        stage: &Path,
        stream: impl Read,
        expected_sri: Option<&str>,
    ) -> Result<(BTreeMap<String, FileMeta>, u64), UnboxError> {
        let mut files: BTreeMap<String, FileMeta> = BTreeMap::new();
        let mut bytes = 0u64;
        let mut handler = |path: &str, reader: &mut dyn Read| -> Result<(), UnboxError> {
            let content = read_entry(reader)?;
            let meta = FileMeta {
                content_type: content_type(path).to_string(),
                integrity: integrity(&content),
                size: content.len() as u64,
            };

            let dest = stage.join(path.trim_start_matches('/'));
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| UnboxError::io(format!("stage {}", path), e))?;
            }
            fs::write(&dest, &content)
                .map_err(|e| UnboxError::io(format!("stage {}", path), e))?;

            bytes += meta.size;
            if let Some(previous) = files.insert(path.to_string(), meta) {
                // Archives can repeat an entry; the later one wins.
                bytes -= previous.size;
            }
            Ok(())
        };

        match expected_sri.and_then(SriVerifier::parse) {
            Some(mut verifier) => {
                extract_files(HashingReader::new(stream, &mut verifier), &mut handler)?;
                if !verifier.verify() {
                    return Err(UnboxError::CorruptArchive {
                        detail: "tarball does not match its published integrity".to_string(),
                    });
                }
            }
            None => extract_files(stream, &mut handler)?,
        }

        Ok((files, bytes))
    }

    /// Publish a fully staged package: rename into place, insert the index
    /// entry, then sweep the size budget. Everything under one write lock,
    /// so readers see the package only once it is complete.
    fn commit(
        &self,
        key: &PackageKey,
        stage: &Path,
        files: BTreeMap<String, FileMeta>,
        bytes: u64,
    ) -> Result<(), UnboxError> {
        let final_dir = self.package_dir(key);
        let mut state = self.state.write().unwrap();

        if state.packages.contains_key(key) {
            // Callers hold the per-key ingest lock, so this only happens if
            // someone bypassed ensure_package; keep the existing entry.
            let _ = fs::remove_dir_all(stage);
            return Ok(());
        }

        if final_dir.exists() {
            // Directory without an index entry: residue from a lost index.
            let _ = fs::remove_dir_all(&final_dir);
        }
        if let Err(err) = fs::rename(stage, &final_dir) {
            let _ = fs::remove_dir_all(stage);
            return Err(UnboxError::io(format!("publish {}", key), err));
        }

        state.total_bytes += bytes;
        state.packages.insert(
            key.clone(),
            PackageEntry {
                last_used_at: Utc::now().timestamp_millis(),
                seq: self.seq.fetch_add(1, Ordering::Relaxed),
                bytes,
                files,
            },
        );

        self.sweep(&mut state, key);
        self.save_index(&state)
    }

    /// Evict least-recently-used package versions until the store is back
    /// under budget. The package that triggered the sweep is never evicted,
    /// so one request always succeeds even under a budget smaller than a
    /// single package. Ties on last_used_at break by insertion order.
    fn sweep(&self, state: &mut StoreState, just_ingested: &PackageKey) {
        while state.total_bytes > self.max_bytes {
            let victim = state
                .packages
                .iter()
                .min_by_key(|(_, entry)| (entry.last_used_at, entry.seq))
                .map(|(key, _)| key.clone());
            let Some(victim) = victim else {
                break;
            };
            if victim == *just_ingested {
                break;
            }
            if let Some(entry) = state.packages.remove(&victim) {
                state.total_bytes = state.total_bytes.saturating_sub(entry.bytes);
                let _ = fs::remove_dir_all(self.package_dir(&victim));
            }
        }
    }

    fn save_index(&self, state: &StoreState) -> Result<(), UnboxError> {
        let mut records: Vec<IndexRecord> = state
            .packages
            .iter()
            .map(|(key, entry)| IndexRecord {
                name: key.name.clone(),
                version: key.version.clone(),
                entry: entry.clone(),
            })
            .collect();
        records.sort_by_key(|r| r.entry.seq);

        let body = serde_json::to_vec_pretty(&records)
            .map_err(|e| UnboxError::Io {
                context: "serialize cache index".to_string(),
                source: e.to_string(),
            })?;
        let tmp = self.root.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&tmp, body).map_err(|e| UnboxError::io("write cache index", e))?;
        fs::rename(&tmp, self.root.join(INDEX_FILE))
            .map_err(|e| UnboxError::io("write cache index", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};
    use std::sync::atomic::AtomicUsize;

    fn tarball(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }
        let tar = builder.into_inner().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }

    fn demo_tarball() -> Vec<u8> {
        tarball(&[
            ("package/package.json", br#"{"name":"demo","main":"lib/entry.js"}"#),
            ("package/index.js", b"module.exports = require('./lib/entry');\n"),
            ("package/lib/entry.js", b"exports.answer = 42;\n"),
        ])
    }

    fn open_store(dir: &Path, max_bytes: u64) -> CacheStore {
        CacheStore::open(dir, max_bytes).unwrap()
    }

    fn ingest(store: &CacheStore, name: &str, version: &str, tarball: Vec<u8>) {
        store
            .ensure_package(name, version, || Ok((Cursor::new(tarball), None)))
            .unwrap();
    }

    #[test]
    fn test_ingest_and_lookup() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(tmp.path(), u64::MAX);

        ingest(&store, "demo", "1.0.0", demo_tarball());

        assert!(store.has_package("demo", "1.0.0"));
        assert!(store.contains_file("demo", "1.0.0", "/index.js"));
        assert!(!store.contains_file("demo", "1.0.0", "/missing.js"));

        let listings = store.list_files("demo", "1.0.0").unwrap();
        let paths: Vec<&str> = listings.iter().map(|l| l.path.as_str()).collect();
        assert_eq!(paths, vec!["/index.js", "/lib/entry.js", "/package.json"]);

        let file = store.get_file("demo", "1.0.0", "/lib/entry.js").unwrap().unwrap();
        assert_eq!(file.content, b"exports.answer = 42;\n");
        assert_eq!(file.content_type, "application/javascript");
        assert_eq!(file.integrity, integrity(b"exports.answer = 42;\n"));
        assert_eq!(file.size, file.content.len() as u64);

        let manifest = store.get_file("demo", "1.0.0", "/package.json").unwrap().unwrap();
        assert_eq!(manifest.content_type, "application/json");
    }

    #[test]
    fn test_index_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let store = open_store(tmp.path(), u64::MAX);
            ingest(&store, "demo", "1.0.0", demo_tarball());
        }

        let reopened = open_store(tmp.path(), u64::MAX);
        assert!(reopened.has_package("demo", "1.0.0"));
        let file = reopened.get_file("demo", "1.0.0", "/index.js").unwrap().unwrap();
        assert!(!file.content.is_empty());
    }

    #[test]
    fn test_corrupt_archive_leaves_no_state() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(tmp.path(), u64::MAX);

        let gz = demo_tarball();
        let truncated = gz[..gz.len() / 3].to_vec();
        let result =
            store.ensure_package("demo", "1.0.0", || Ok((Cursor::new(truncated), None)));

        assert!(matches!(result, Err(UnboxError::CorruptArchive { .. })));
        assert!(!store.has_package("demo", "1.0.0"));
        assert!(store.list_files("demo", "1.0.0").is_none());
        assert_eq!(store.total_bytes(), 0);

        // A later attempt with a good archive succeeds.
        ingest(&store, "demo", "1.0.0", demo_tarball());
        assert!(store.has_package("demo", "1.0.0"));
    }

    #[test]
    fn test_integrity_mismatch_rolls_back() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(tmp.path(), u64::MAX);

        let wrong_sri = integrity(b"some other tarball");
        let result = store.ensure_package("demo", "1.0.0", || {
            Ok((Cursor::new(demo_tarball()), Some(wrong_sri.clone())))
        });

        assert!(matches!(result, Err(UnboxError::CorruptArchive { .. })));
        assert!(!store.has_package("demo", "1.0.0"));
        assert_eq!(store.total_bytes(), 0);
    }

    #[test]
    fn test_matching_tarball_integrity_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(tmp.path(), u64::MAX);

        let gz = demo_tarball();
        let sri = integrity(&gz);
        store
            .ensure_package("demo", "1.0.0", || Ok((Cursor::new(gz.clone()), Some(sri.clone()))))
            .unwrap();
        assert!(store.has_package("demo", "1.0.0"));
    }

    #[test]
    fn test_eviction_is_least_recently_used() {
        let tmp = tempfile::tempdir().unwrap();
        let payload = vec![b'x'; 4096];
        let budget = 10 * 1024;
        let store = open_store(tmp.path(), budget);

        ingest(&store, "a", "1.0.0", tarball(&[("package/big.js", &payload)]));
        std::thread::sleep(std::time::Duration::from_millis(5));
        ingest(&store, "b", "1.0.0", tarball(&[("package/big.js", &payload)]));
        std::thread::sleep(std::time::Duration::from_millis(5));

        // Third package pushes the total over budget; "a" is oldest.
        ingest(&store, "c", "1.0.0", tarball(&[("package/big.js", &payload)]));

        assert!(!store.has_package("a", "1.0.0"));
        assert!(store.has_package("b", "1.0.0"));
        assert!(store.has_package("c", "1.0.0"));
        assert!(store.total_bytes() <= budget);
    }

    #[test]
    fn test_touch_protects_a_package_from_eviction() {
        let tmp = tempfile::tempdir().unwrap();
        let payload = vec![b'x'; 4096];
        let store = open_store(tmp.path(), 10 * 1024);

        ingest(&store, "a", "1.0.0", tarball(&[("package/big.js", &payload)]));
        std::thread::sleep(std::time::Duration::from_millis(5));
        ingest(&store, "b", "1.0.0", tarball(&[("package/big.js", &payload)]));
        std::thread::sleep(std::time::Duration::from_millis(5));

        store.touch_package("a", "1.0.0");
        std::thread::sleep(std::time::Duration::from_millis(5));

        ingest(&store, "c", "1.0.0", tarball(&[("package/big.js", &payload)]));

        assert!(store.has_package("a", "1.0.0"));
        assert!(!store.has_package("b", "1.0.0"));
        assert!(store.has_package("c", "1.0.0"));
    }

    #[test]
    fn test_sweep_never_evicts_the_package_it_just_ingested() {
        let tmp = tempfile::tempdir().unwrap();
        let payload = vec![b'x'; 8192];
        // Budget smaller than a single package.
        let store = open_store(tmp.path(), 1024);

        ingest(&store, "huge", "1.0.0", tarball(&[("package/big.js", &payload)]));

        assert!(store.has_package("huge", "1.0.0"));
        assert_eq!(store.package_count(), 1);

        // The next ingest evicts the previous tenant but keeps itself.
        std::thread::sleep(std::time::Duration::from_millis(5));
        ingest(&store, "huge2", "1.0.0", tarball(&[("package/big.js", &payload)]));
        assert!(!store.has_package("huge", "1.0.0"));
        assert!(store.has_package("huge2", "1.0.0"));
    }

    #[test]
    fn test_concurrent_ensure_coalesces_to_one_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(open_store(tmp.path(), u64::MAX));
        let fetches = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            let fetches = Arc::clone(&fetches);
            handles.push(std::thread::spawn(move || {
                store.ensure_package("demo", "1.0.0", || {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok((Cursor::new(demo_tarball()), None))
                })
            }));
        }

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(store.has_package("demo", "1.0.0"));
    }

    #[test]
    fn test_list_packages_and_clear() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(tmp.path(), u64::MAX);

        ingest(&store, "a", "1.0.0", demo_tarball());
        ingest(&store, "b", "2.0.0", demo_tarball());
        assert_eq!(store.package_count(), 2);
        assert!(store.total_bytes() > 0);

        let names: Vec<String> = store
            .list_packages()
            .into_iter()
            .map(|p| format!("{}@{}", p.name, p.version))
            .collect();
        assert!(names.contains(&"a@1.0.0".to_string()));
        assert!(names.contains(&"b@2.0.0".to_string()));

        store.clear().unwrap();
        assert_eq!(store.package_count(), 0);
        assert_eq!(store.total_bytes(), 0);
        assert!(!store.has_package("a", "1.0.0"));
    }

    #[test]
    fn test_scoped_package_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(tmp.path(), u64::MAX);

        ingest(&store, "@scope/demo", "1.0.0", demo_tarball());
        assert!(store.has_package("@scope/demo", "1.0.0"));
        let file = store
            .get_file("@scope/demo", "1.0.0", "/index.js")
            .unwrap()
            .unwrap();
        assert_eq!(file.content_type, "application/javascript");
    }
}
