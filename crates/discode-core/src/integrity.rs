//! Bridge script integrity verification: a `.sha256` sidecar check run
//! before a container-injected helper script is allowed to be used.
//! Verification passes when the sidecar is absent (nothing to enforce) or
//! matches; it fails only when a sidecar is present and its digest does not
//! match (trailing whitespace around the digest is tolerated).

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Compute the SHA256 hex digest of a byte slice.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Parse a `name  hex` sidecar file (same shape as a `sha256sum` manifest)
/// looking for one entry. Used when a single sidecar lists checksums for
/// multiple files.
pub fn parse_sha256_for(sidecar: &str, filename: &str) -> Option<String> {
    for line in sidecar.lines() {
        let parts: Vec<&str> = line.splitn(2, char::is_whitespace).collect();
        if parts.len() == 2 && parts[1].trim() == filename {
            return Some(parts[0].trim().to_lowercase());
        }
    }
    None
}

/// Path of the `.sha256` sidecar that ships alongside `script_path`
/// (`bridge.sh` -> `bridge.sh.sha256`).
fn sidecar_path_for(script_path: &Path) -> PathBuf {
    let mut name = script_path.as_os_str().to_os_string();
    name.push(".sha256");
    PathBuf::from(name)
}

/// A sidecar holding a single digest (no filename column), the common case
/// for a one-script-per-sidecar bundle. Whitespace around the digest is
/// tolerated.
fn parse_single_digest(sidecar: &str) -> Option<String> {
    let first_line = sidecar.lines().next()?.trim();
    if first_line.is_empty() {
        return None;
    }
    // Tolerate a `sha256sum`-style "<hex>  <filename>" line too.
    let hex = first_line.split_whitespace().next()?;
    Some(hex.trim().to_lowercase())
}

/// Verify `script_path` against its `.sha256` sidecar. Returns `true` when
/// the sidecar is absent (nothing to enforce) or its digest matches; `false`
/// when a sidecar is present and does not match. Never panics or raises —
/// a missing/unreadable script is treated as a mismatch (`false`), since the
/// caller's policy is to refuse injection on anything but a clean match.
pub fn verify_bridge_script_integrity(script_path: &Path) -> bool {
    let sidecar_path = sidecar_path_for(script_path);
    let sidecar_contents = match std::fs::read_to_string(&sidecar_path) {
        Ok(contents) => contents,
        Err(_) => return true,
    };

    let Some(expected) = parse_single_digest(&sidecar_contents) else {
        return true;
    };

    let script_bytes = match std::fs::read(script_path) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    sha256_hex(&script_bytes) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sidecar_finds_matching_filename() {
        let sidecar = "abc123  bridge.sh\ndef456  other.sh\n";
        assert_eq!(
            parse_sha256_for(sidecar, "bridge.sh"),
            Some("abc123".to_string())
        );
        assert_eq!(parse_sha256_for(sidecar, "missing.sh"), None);
    }

    #[test]
    fn absent_sidecar_verifies_true() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("bridge.sh");
        std::fs::write(&script_path, b"#!/bin/sh\necho hi\n").unwrap();
        assert!(verify_bridge_script_integrity(&script_path));
    }

    #[test]
    fn matching_sidecar_verifies_true() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("bridge.sh");
        let script = b"#!/bin/sh\necho hi\n";
        std::fs::write(&script_path, script).unwrap();
        let digest = sha256_hex(script);
        std::fs::write(format!("{}.sha256", script_path.display()), format!("{digest}\n")).unwrap();
        assert!(verify_bridge_script_integrity(&script_path));
    }

    #[test]
    fn mismatched_sidecar_verifies_false() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("bridge.sh");
        std::fs::write(&script_path, b"#!/bin/sh\necho hi\n").unwrap();
        let bogus = sha256_hex(b"something else");
        std::fs::write(format!("{}.sha256", script_path.display()), bogus).unwrap();
        assert!(!verify_bridge_script_integrity(&script_path));
    }

    #[test]
    fn trailing_whitespace_in_sidecar_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("bridge.sh");
        let script = b"#!/bin/sh\necho hi\n";
        std::fs::write(&script_path, script).unwrap();
        let digest = sha256_hex(script);
        std::fs::write(
            format!("{}.sha256", script_path.display()),
            format!("  {digest}  \n\n"),
        )
        .unwrap();
        assert!(verify_bridge_script_integrity(&script_path));
    }
}
