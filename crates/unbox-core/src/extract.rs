//! Streaming tarball extraction. Accepts gzip-compressed or plain tar,
//! walks entries in stream order, and hands regular files to a callback as
//! `(rooted path, byte reader)` pairs. Registries wrap every file in one
//! top-level directory whose name varies by publisher (`package/`,
//! `firebase_npm/`, ...), so the first path segment is always stripped.

use crate::error::UnboxError;
use flate2::read::GzDecoder;
use std::io::{BufRead, BufReader, Read};
use tar::Archive;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

enum TarSource<R: BufRead> {
    Gzip(GzDecoder<R>),
    Plain(R),
}

impl<R: BufRead> Read for TarSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            TarSource::Gzip(r) => r.read(buf),
            TarSource::Plain(r) => r.read(buf),
        }
    }
}

/// Walk `stream` as a (possibly gzipped) tar archive, invoking `on_file`
/// once per regular file with its normalized rooted path. Entries are
/// visited strictly sequentially; non-file entries (directories, symlinks,
/// pax headers) are skipped. The stream is drained to EOF on success so a
/// wrapping [`crate::integrity::HashingReader`] observes every byte.
pub fn extract_files<R, F>(stream: R, mut on_file: F) -> Result<(), UnboxError>
where
    R: Read,
    F: FnMut(&str, &mut dyn Read) -> Result<(), UnboxError>,
{
    let mut buffered = BufReader::with_capacity(64 * 1024, stream);
    let head = buffered.fill_buf().map_err(framing)?;
    let source = if head.starts_with(&GZIP_MAGIC) {
        TarSource::Gzip(GzDecoder::new(buffered))
    } else {
        TarSource::Plain(buffered)
    };

    let mut archive = Archive::new(source);
    for entry in archive.entries().map_err(framing)? {
        let mut entry = entry.map_err(framing)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let raw = entry.path().map_err(framing)?.to_string_lossy().into_owned();
        let Some(path) = strip_package_prefix(&raw) else {
            continue;
        };
        if path.split('/').any(|segment| segment == "..") {
            return Err(UnboxError::CorruptArchive {
                detail: format!("path traversal in entry {:?}", raw),
            });
        }

        on_file(&path, &mut entry)?;
    }

    // Read through the end-of-archive marker and gzip trailer.
    let mut rest = archive.into_inner();
    std::io::copy(&mut rest, &mut std::io::sink()).map_err(framing)?;
    Ok(())
}

/// Buffer one entry's content. A read failure here means the archive (or
/// the transport under it) broke mid-entry, so it classifies as corrupt.
pub fn read_entry(reader: &mut dyn Read) -> Result<Vec<u8>, UnboxError> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content).map_err(framing)?;
    Ok(content)
}

/// `package/lib/index.js` -> `/lib/index.js`. Returns None for the bare
/// top-level directory entry itself.
fn strip_package_prefix(name: &str) -> Option<String> {
    let mut segments = name.split('/').filter(|s| !s.is_empty() && *s != ".");
    segments.next()?;
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        return None;
    }
    Some(format!("/{}", rest.join("/")))
}

fn framing(err: std::io::Error) -> UnboxError {
    UnboxError::CorruptArchive {
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn tarball(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn collect_files(stream: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut out = Vec::new();
        extract_files(stream, |path, reader| {
            out.push((path.to_string(), read_entry(reader)?));
            Ok(())
        })
        .unwrap();
        out
    }

    #[test]
    fn test_strips_top_level_prefix_whatever_its_name() {
        let tar = tarball(&[
            ("pkgname/index.js", b"module.exports = 1;\n"),
            ("pkgname/lib/a.js", b"exports.a = 1;\n"),
            ("pkgname/package.json", b"{}"),
        ]);
        let files = collect_files(&gzip(&tar));
        let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["/index.js", "/lib/a.js", "/package.json"]);
    }

    #[test]
    fn test_accepts_uncompressed_tar() {
        let tar = tarball(&[("package/index.js", b"x")]);
        let files = collect_files(&tar);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "/index.js");
        assert_eq!(files[0].1, b"x");
    }

    #[test]
    fn test_skips_non_file_entries() {
        let mut builder = tar::Builder::new(Vec::new());

        let mut dir = tar::Header::new_gnu();
        dir.set_entry_type(tar::EntryType::Directory);
        dir.set_size(0);
        dir.set_mode(0o755);
        dir.set_cksum();
        builder
            .append_data(&mut dir, "package/lib", &b""[..])
            .unwrap();

        let mut file = tar::Header::new_gnu();
        file.set_size(2);
        file.set_mode(0o644);
        file.set_cksum();
        builder
            .append_data(&mut file, "package/lib/b.js", &b"b\n"[..])
            .unwrap();

        let tar = builder.into_inner().unwrap();
        let files = collect_files(&gzip(&tar));
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "/lib/b.js");
    }

    #[test]
    fn test_truncated_archive_is_corrupt() {
        let tar = tarball(&[("package/index.js", &[0u8; 4096][..])]);
        let gz = gzip(&tar);
        let truncated = &gz[..gz.len() / 2];

        let result = extract_files(truncated, |_, reader| {
            read_entry(reader)?;
            Ok(())
        });
        assert!(matches!(
            result,
            Err(UnboxError::CorruptArchive { .. })
        ));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let tar = tarball(&[("package/../../etc/passwd", b"nope")]);
        let result = extract_files(gzip(&tar).as_slice(), |_, _| Ok(()));
        assert!(matches!(
            result,
            Err(UnboxError::CorruptArchive { .. })
        ));
    }

    #[test]
    fn test_handler_error_propagates() {
        let tar = tarball(&[("package/index.js", b"x")]);
        let result = extract_files(gzip(&tar).as_slice(), |path, _| {
            Err(UnboxError::Io {
                context: format!("write {}", path),
                source: "disk full".to_string(),
            })
        });
        assert!(matches!(result, Err(UnboxError::Io { .. })));
    }
}
