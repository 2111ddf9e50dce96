//! Subresource-integrity digests. Stored files are digested with sha384
//! (`sha384-<base64>`); registry-supplied SRI strings for whole tarballs
//! may use sha256/384/512 and are verified while the archive streams.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::io::Read;

/// SRI digest of file content. Deterministic, pure function of the bytes.
pub fn integrity(content: &[u8]) -> String {
    format!("sha384-{}", BASE64.encode(Sha384::digest(content)))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SriAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl SriAlgorithm {
    fn parse(name: &str) -> Option<SriAlgorithm> {
        match name {
            "sha256" => Some(SriAlgorithm::Sha256),
            "sha384" => Some(SriAlgorithm::Sha384),
            "sha512" => Some(SriAlgorithm::Sha512),
            _ => None,
        }
    }
}

enum SriHasher {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl SriHasher {
    fn new(algorithm: SriAlgorithm) -> SriHasher {
        match algorithm {
            SriAlgorithm::Sha256 => SriHasher::Sha256(Sha256::new()),
            SriAlgorithm::Sha384 => SriHasher::Sha384(Sha384::new()),
            SriAlgorithm::Sha512 => SriHasher::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            SriHasher::Sha256(h) => h.update(bytes),
            SriHasher::Sha384(h) => h.update(bytes),
            SriHasher::Sha512(h) => h.update(bytes),
        }
    }

    fn finalize_base64(self) -> String {
        match self {
            SriHasher::Sha256(h) => BASE64.encode(h.finalize()),
            SriHasher::Sha384(h) => BASE64.encode(h.finalize()),
            SriHasher::Sha512(h) => BASE64.encode(h.finalize()),
        }
    }
}

/// Incremental verifier for a registry SRI string. An SRI value may carry
/// several space-separated `algo-digest` entries; any single match passes.
pub struct SriVerifier {
    hashers: Vec<(SriHasher, String)>,
}

impl SriVerifier {
    /// Returns None when no entry uses a recognized algorithm.
    pub fn parse(sri: &str) -> Option<SriVerifier> {
        let mut hashers = Vec::new();
        for entry in sri.split_whitespace() {
            let Some((algo, digest)) = entry.split_once('-') else {
                continue;
            };
            if let Some(algorithm) = SriAlgorithm::parse(algo) {
                hashers.push((SriHasher::new(algorithm), digest.to_string()));
            }
        }
        if hashers.is_empty() {
            None
        } else {
            Some(SriVerifier { hashers })
        }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for (hasher, _) in &mut self.hashers {
            hasher.update(bytes);
        }
    }

    /// Consume the verifier and report whether any entry matched.
    pub fn verify(self) -> bool {
        self.hashers
            .into_iter()
            .any(|(hasher, expected)| hasher.finalize_base64() == expected)
    }
}

/// Reader adapter that feeds every byte it passes through into an
/// [`SriVerifier`], so a tarball can be checked in the same pass that
/// extracts it.
pub struct HashingReader<'a, R> {
    inner: R,
    verifier: &'a mut SriVerifier,
}

impl<'a, R: Read> HashingReader<'a, R> {
    pub fn new(inner: R, verifier: &'a mut SriVerifier) -> Self {
        HashingReader { inner, verifier }
    }
}

impl<R: Read> Read for HashingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.verifier.update(&buf[..n]);
        Ok(n)
    }
}
