//! Package spec parsing: `name[@versionOrRange]`, optionally scoped
//! (`@scope/name[@versionOrRange]`). Pure, no I/O.

use crate::error::UnboxError;
use std::fmt;

/// A package name plus a version or range string. The range defaults to
/// `latest` when the spec carries no `@version` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageSpec {
    pub name: String,
    pub range: String,
}

impl PackageSpec {
    /// Parse `name`, `name@range`, `@scope/name` or `@scope/name@range`.
    pub fn parse(raw: &str) -> Result<Self, UnboxError> {
        let raw = raw.trim();
        let (name, range) = split_name_and_range(raw);

        if let Err(reason) = validate_name(name) {
            return Err(UnboxError::InvalidSpec {
                spec: raw.to_string(),
                reason,
            });
        }

        let range = range.unwrap_or("latest").trim();
        if range.is_empty() {
            return Err(UnboxError::InvalidSpec {
                spec: raw.to_string(),
                reason: "empty version after @".to_string(),
            });
        }

        Ok(PackageSpec {
            name: name.to_string(),
            range: range.to_string(),
        })
    }

    /// Spec pinned to one concrete version.
    pub fn exact(name: &str, version: &str) -> Self {
        PackageSpec {
            name: name.to_string(),
            range: version.to_string(),
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.range)
    }
}

/// Split off the version suffix. Scoped names keep their leading `@`;
/// the version separator is the last `@` past position zero.
fn split_name_and_range(raw: &str) -> (&str, Option<&str>) {
    match raw.rfind('@') {
        Some(idx) if idx > 0 => (&raw[..idx], Some(&raw[idx + 1..])),
        _ => (raw, None),
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty package name".to_string());
    }
    if name.len() > 214 {
        return Err("package name exceeds 214 characters".to_string());
    }

    let bare = if let Some(scoped) = name.strip_prefix('@') {
        let Some((scope, bare)) = scoped.split_once('/') else {
            return Err("scoped name must look like @scope/name".to_string());
        };
        if scope.is_empty() {
            return Err("empty scope".to_string());
        }
        if !scope.chars().all(is_name_char) {
            return Err(format!("invalid character in scope {:?}", scope));
        }
        bare
    } else {
        name
    };

    if bare.is_empty() {
        return Err("empty package name".to_string());
    }
    if bare.starts_with('.') || bare.starts_with('_') {
        return Err("package name may not start with . or _".to_string());
    }
    if !bare.chars().all(is_name_char) {
        return Err(format!("invalid character in name {:?}", bare));
    }
    Ok(())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~')
}

/// A request pathname split into its spec and in-package filename,
/// e.g. `/@scope/name@1.2.3/lib/index.js`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPathname {
    pub spec: PackageSpec,
    pub filename: String,
}

/// Parse a full request pathname of the form `/name[@range][/file...]`.
/// Percent escapes are decoded and duplicate slashes in the filename
/// collapsed, so `/react@18.2.0//umd//react.js` and `/react%4018.2.0/...`
/// both canonicalize.
pub fn parse_package_pathname(pathname: &str) -> Result<ParsedPathname, UnboxError> {
    let invalid = |reason: &str| UnboxError::InvalidSpec {
        spec: pathname.to_string(),
        reason: reason.to_string(),
    };

    let decoded = percent_decode(pathname).ok_or_else(|| invalid("bad percent escape"))?;
    let rest = decoded
        .strip_prefix('/')
        .ok_or_else(|| invalid("pathname must start with /"))?;

    // A scoped spec spans two path segments; a bare one spans one.
    let (spec_part, filename) = if rest.starts_with('@') {
        match rest.match_indices('/').nth(1) {
            Some((idx, _)) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        }
    } else {
        match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        }
    };

    let spec = PackageSpec::parse(spec_part)?;
    Ok(ParsedPathname {
        spec,
        filename: collapse_slashes(filename),
    })
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
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

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_name_defaults_to_latest() {
        let spec = PackageSpec::parse("react").unwrap();
        assert_eq!(spec.name, "react");
        assert_eq!(spec.range, "latest");
    }

    #[test]
    fn test_parse_name_with_range() {
        let spec = PackageSpec::parse("react@^18.0.0").unwrap();
        assert_eq!(spec.name, "react");
        assert_eq!(spec.range, "^18.0.0");
    }

    #[test]
    fn test_parse_scoped_name() {
        let spec = PackageSpec::parse("@babel/core@7.22.0").unwrap();
        assert_eq!(spec.name, "@babel/core");
        assert_eq!(spec.range, "7.22.0");

        let latest = PackageSpec::parse("@babel/core").unwrap();
        assert_eq!(latest.name, "@babel/core");
        assert_eq!(latest.range, "latest");
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        assert!(PackageSpec::parse("").is_err());
        assert!(PackageSpec::parse("@scope").is_err());
        assert!(PackageSpec::parse(".hidden").is_err());
        assert!(PackageSpec::parse("_private").is_err());
        assert!(PackageSpec::parse("has space").is_err());
        assert!(PackageSpec::parse("react@").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let spec = PackageSpec::parse("@scope/pkg@1.2.3").unwrap();
        assert_eq!(spec.to_string(), "@scope/pkg@1.2.3");
    }

    #[test]
    fn test_parse_pathname_bare() {
        let parsed = parse_package_pathname("/react@18.2.0/umd/react.js").unwrap();
        assert_eq!(parsed.spec.name, "react");
        assert_eq!(parsed.spec.range, "18.2.0");
        assert_eq!(parsed.filename, "/umd/react.js");
    }

    #[test]
    fn test_parse_pathname_scoped_without_file() {
        let parsed = parse_package_pathname("/@babel/core@7.22.0").unwrap();
        assert_eq!(parsed.spec.name, "@babel/core");
        assert_eq!(parsed.spec.range, "7.22.0");
        assert_eq!(parsed.filename, "");
    }

    #[test]
    fn test_parse_pathname_collapses_duplicate_slashes() {
        let parsed = parse_package_pathname("/lodash//fp//add.js").unwrap();
        assert_eq!(parsed.spec.name, "lodash");
        assert_eq!(parsed.spec.range, "latest");
        assert_eq!(parsed.filename, "/fp/add.js");
    }

    #[test]
    fn test_parse_pathname_decodes_percent_escapes() {
        let parsed = parse_package_pathname("/react%4018.2.0/index.js").unwrap();
        assert_eq!(parsed.spec.name, "react");
        assert_eq!(parsed.spec.range, "18.2.0");
    }

    #[test]
    fn test_parse_pathname_rejects_garbage() {
        assert!(parse_package_pathname("react").is_err());
        assert!(parse_package_pathname("/react%ZZ/index.js").is_err());
    }
}
