//! Hierarchical metadata over a cached package version: file nodes carry
//! content type, integrity and size; directory nodes group stored paths by
//! their next segment. Rebuilt per request from the store's listings.

use crate::store::FileListing;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataNode {
    File {
        path: String,
        #[serde(rename = "contentType")]
        content_type: String,
        integrity: String,
        size: u64,
    },
    Directory {
        path: String,
        files: Vec<MetadataNode>,
    },
}

/// Build the metadata tree rooted at `base` (empty means `/`). `None` when
/// the base path matches neither a stored file nor any directory prefix;
/// the root of a cached package is always a directory node, even when the
/// package somehow has no files under it.
pub fn build_metadata(listings: &[FileListing], base: &str) -> Option<MetadataNode> {
    let base = if base.is_empty() { "/" } else { base };

    if let Some(file) = listings.iter().find(|l| l.path == base) {
        return Some(MetadataNode::File {
            path: file.path.clone(),
            content_type: file.content_type.clone(),
            integrity: file.integrity.clone(),
            size: file.size,
        });
    }

    let prefix = if base == "/" {
        "/".to_string()
    } else {
        format!("{}/", base)
    };
    if base != "/" && !listings.iter().any(|l| l.path.starts_with(&prefix)) {
        return None;
    }

    // Immediate children, deduplicated, in order of first appearance.
    let mut children: Vec<String> = Vec::new();
    for listing in listings {
        if let Some(rest) = listing.path.strip_prefix(&prefix) {
            let segment = rest.split('/').next().unwrap_or(rest);
            let child = format!("{}{}", prefix, segment);
            if !children.contains(&child) {
                children.push(child);
            }
        }
    }

    Some(MetadataNode::Directory {
        path: base.to_string(),
        files: children
            .iter()
            .filter_map(|child| build_metadata(listings, child))
            .collect(),
    })
}
