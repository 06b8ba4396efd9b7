//! Integrity fingerprints for the fixed rule tables.
//!
//! Every table the engine is built from (axiom registry, kernel rules, signal
//! patterns, tension syntheses, the node roster) hashes to a SHA-256 digest of
//! its canonical JSON encoding. Records written to permanent storage carry the
//! manifest of the tables that produced them, and a deployment can pin the
//! expected digests so that a corrupted table fails at start-up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{Result, TableError};

/// SHA-256 hex digest of a value's canonical JSON encoding.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let encoded = serde_json::to_vec(value)?;
    Ok(digest_bytes(&encoded))
}

/// SHA-256 hex digest of raw bytes.
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Fingerprints of every table an engine instance was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableManifest {
    /// Axiom registry version
    pub registry_version: u32,
    /// Table name -> digest
    pub tables: BTreeMap<String, String>,
}

impl TableManifest {
    /// Create an empty manifest for a registry version.
    pub fn new(registry_version: u32) -> Self {
        Self {
            registry_version,
            tables: BTreeMap::new(),
        }
    }

    /// Record a table digest.
    pub fn with_table(mut self, name: impl Into<String>, digest: impl Into<String>) -> Self {
        self.tables.insert(name.into(), digest.into());
        self
    }

    /// Digest of a single table.
    pub fn table(&self, name: &str) -> Option<&str> {
        self.tables.get(name).map(String::as_str)
    }

    /// Combined digest over the whole manifest.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.registry_version.to_be_bytes());
        for (name, digest) in &self.tables {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            hasher.update(digest.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    /// Check this manifest against pinned digests.
    ///
    /// Only tables present in `pinned` are compared; a pinned table missing
    /// from this manifest is a mismatch.
    pub fn verify_against(&self, pinned: &BTreeMap<String, String>) -> Result<()> {
        for (name, expected) in pinned {
            let actual = self.table(name).unwrap_or("<missing>");
            if actual != expected {
                return Err(TableError::FingerprintMismatch {
                    table: name.clone(),
                    expected: expected.clone(),
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint(&vec!["one", "two"]).unwrap();
        let b = fingerprint(&vec!["one", "two"]).unwrap();
        let c = fingerprint(&vec!["two", "one"]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_manifest_verification() {
        let manifest = TableManifest::new(1)
            .with_table("kernel", "abc")
            .with_table("axioms", "def");

        let mut pinned = BTreeMap::new();
        pinned.insert("kernel".to_string(), "abc".to_string());
        manifest.verify_against(&pinned).unwrap();

        pinned.insert("axioms".to_string(), "tampered".to_string());
        let err = manifest.verify_against(&pinned).unwrap_err();
        assert!(matches!(err, TableError::FingerprintMismatch { .. }));
    }

    #[test]
    fn test_manifest_digest_depends_on_version() {
        let a = TableManifest::new(1).with_table("kernel", "abc");
        let b = TableManifest::new(2).with_table("kernel", "abc");
        assert_ne!(a.digest(), b.digest());
    }
}
