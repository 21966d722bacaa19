//! ETag Generator
//!
//! Deterministic content hashing of cacheable payloads.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Number of digest bytes kept in the validator.
const DIGEST_BYTES: usize = 16;

/// Content hash and serialized size of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Quoted hex digest, e.g. `"9f86d081884c7d65..."`
    pub etag: String,
    /// Length of the canonical serialization
    pub size_bytes: usize,
}

/// Fingerprints a payload.
///
/// The payload is first converted to a `serde_json::Value`, whose object maps
/// are key-ordered, so two payloads that are deep-equal hash identically
/// regardless of field insertion order.
pub fn fingerprint<T: Serialize + ?Sized>(payload: &T) -> Result<Fingerprint> {
    let canonical = serde_json::to_vec(&serde_json::to_value(payload)?)?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let digest = hasher.finalize();

    Ok(Fingerprint {
        etag: format!("\"{}\"", hex::encode(&digest[..DIGEST_BYTES])),
        size_bytes: canonical.len(),
    })
}

/// Returns only the quoted validator for a payload.
pub fn generate_etag<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    fingerprint(payload).map(|f| f.etag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_etag_is_quoted_hex() {
        let etag = generate_etag(&json!({"title": "Morning show"})).unwrap();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), DIGEST_BYTES * 2 + 2);
        assert!(etag[1..etag.len() - 1].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_equal_payloads_hash_equal() {
        let a = json!({"id": 1, "votes": [3, 4]});
        let b = json!({"id": 1, "votes": [3, 4]});
        assert_eq!(generate_etag(&a).unwrap(), generate_etag(&b).unwrap());
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let a: serde_json::Value = serde_json::from_str(r#"{"a":1,"b":{"x":true,"y":null}}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"b":{"y":null,"x":true},"a":1}"#).unwrap();
        assert_eq!(generate_etag(&a).unwrap(), generate_etag(&b).unwrap());
    }

    #[test]
    fn test_struct_and_equivalent_json_agree() {
        #[derive(Serialize)]
        struct Poll {
            id: u32,
            question: &'static str,
        }

        let from_struct = generate_etag(&Poll { id: 5, question: "Best jingle?" }).unwrap();
        let from_json = generate_etag(&json!({"question": "Best jingle?", "id": 5})).unwrap();
        assert_eq!(from_struct, from_json);
    }

    #[test]
    fn test_different_payloads_hash_differently() {
        let a = generate_etag(&json!({"id": 5, "votes": 10})).unwrap();
        let b = generate_etag(&json!({"id": 5, "votes": 11})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_reports_size() {
        let f = fingerprint(&json!([1, 2, 3])).unwrap();
        assert_eq!(f.size_bytes, "[1,2,3]".len());
    }
}
