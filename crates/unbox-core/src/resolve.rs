//! Module-resolution fallback over a cached package's stored paths: a
//! request for `/lib` can land on `/lib.js`, `/lib/index.js`, or whatever
//! `/lib/package.json`'s `main` field points at.

use crate::error::UnboxError;
use crate::store::CacheStore;
use std::collections::HashSet;

/// Resolve `requested` to the canonical stored path for the package
/// version, or `Ok(None)` when nothing matches. Lookup order: literal,
/// `.js`/`.json` extension, nested `package.json` `main` target, then
/// `index.js`/`index.json` of the originally requested path.
pub fn resolve_path(
    store: &CacheStore,
    name: &str,
    version: &str,
    requested: &str,
) -> Result<Option<String>, UnboxError> {
    let Some(listings) = store.list_files(name, version) else {
        return Ok(None);
    };
    let paths: HashSet<String> = listings.into_iter().map(|l| l.path).collect();

    if let Some(hit) = find_file(requested, &paths) {
        return Ok(Some(hit));
    }
    find_in_directory(store, name, version, requested, &paths)
}

/// Literal match first, then extension fallback. An exact path always wins,
/// whether or not the request already carried an extension.
fn find_file(path: &str, paths: &HashSet<String>) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    for candidate in [
        path.to_string(),
        format!("{}.js", path),
        format!("{}.json", path),
    ] {
        if paths.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn find_in_directory(
    store: &CacheStore,
    name: &str,
    version: &str,
    path: &str,
    paths: &HashSet<String>,
) -> Result<Option<String>, UnboxError> {
    let manifest_path = format!("{}/package.json", path);
    if paths.contains(&manifest_path) {
        if let Some(main) = read_main_field(store, name, version, &manifest_path)? {
            let main_path = join_rooted(path, &main);
            if let Some(hit) = find_file(&main_path, paths) {
                return Ok(Some(hit));
            }
            // A broken main falls back to the index of the requested path,
            // not the index of the main target.
        }
    }
    Ok(find_index(path, paths))
}

fn find_index(path: &str, paths: &HashSet<String>) -> Option<String> {
    for candidate in [format!("{}/index.js", path), format!("{}/index.json", path)] {
        if paths.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn read_main_field(
    store: &CacheStore,
    name: &str,
    version: &str,
    manifest_path: &str,
) -> Result<Option<String>, UnboxError> {
    let Some(file) = store.get_file(name, version, manifest_path)? else {
        return Ok(None);
    };
    let Ok(manifest) = serde_json::from_slice::<serde_json::Value>(&file.content) else {
        // Unparseable package.json is treated as having no main field.
        return Ok(None);
    };
    Ok(manifest
        .get("main")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(String::from))
}

/// `/nested` + `./lib/main.js` -> `/nested/lib/main.js`, with duplicate
/// slashes collapsed.
fn join_rooted(base: &str, relative: &str) -> String {
    let joined = format!("/{}/{}", base.trim_matches('/'), relative.trim_start_matches("./"));
    let mut out = String::with_capacity(joined.len());
    let mut prev_slash = false;
    for c in joined.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    out
}
