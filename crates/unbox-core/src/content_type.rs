//! Content-type classification by extension and basename. Registry packages
//! ship plenty of extensionless text (LICENSE, Makefile, rc-files); those all
//! classify as text/plain, as does anything unrecognized.

/// Content type for a stored file path, decided at ingest time.
pub fn content_type(path: &str) -> &'static str {
    let name = path.rsplit('/').next().unwrap_or(path);
    let lower = name.to_ascii_lowercase();

    if is_well_known_text(&lower) {
        return "text/plain";
    }

    match lower.rsplit_once('.').map(|(_, ext)| ext) {
        Some("js") | Some("mjs") | Some("cjs") | Some("jsx") => "application/javascript",
        Some("json") | Some("map") => "application/json",
        Some("css") => "text/css",
        Some("html") | Some("htm") => "text/html",
        Some("md") | Some("markdown") => "text/markdown",
        Some("xml") => "application/xml",
        Some("yml") | Some("yaml") => "text/yaml",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        // TypeScript and Flow sources are served as plain text, not scripts.
        Some("ts") | Some("tsx") | Some("flow") => "text/plain",
        _ => "text/plain",
    }
}

/// Extensionless or dotfile names that are always plain text: license and
/// changelog files, Makefiles, `.babelrc`-style rc-files, `.gitignore`-style
/// ignore files, lockfiles.
fn is_well_known_text(lower_name: &str) -> bool {
    let stem = lower_name.split('.').next().unwrap_or(lower_name);
    if matches!(
        stem,
        "license" | "licence" | "readme" | "changes" | "changelog" | "authors" | "makefile"
            | "patents" | "notice"
    ) {
        return true;
    }

    if let Some(dotted) = lower_name.strip_prefix('.') {
        return dotted.ends_with("rc")
            || dotted.ends_with("ignore")
            || dotted.starts_with("git")
            || dotted == "lock";
    }

    false
}
