//! Canonical serialization for exact-match voting.
//!
//! Two payloads that differ only in object key order must compare equal, so
//! values are written as compact JSON with object keys sorted bytewise at every
//! depth. The output is plain JSON text, which keeps distinct values distinct
//! without extra type tags.
//!
//! [`form_digest`] folds a canonical form into a short, process-stable `u64`
//! used as a log field when reporting vote groups. Voting itself always
//! compares full canonical bytes, never digests.

use ahash::RandomState;
use serde::Serialize;
use serde_json::Value;
use std::{cell::RefCell, hash::BuildHasher};

thread_local! {
    /// Scratch buffer reused across canonicalizations on the same thread.
    static CANONICAL_BUFFER: RefCell<Vec<u8>> = RefCell::new(Vec::with_capacity(2048));
}

/// Fixed seeds so digests are comparable across runs and hosts.
const DIGEST_SEEDS: (u64, u64, u64, u64) =
    (0x7461_6c6c_795f_6b30, 0x7461_6c6c_795f_6b31, 0x7461_6c6c_795f_6b32, 0x7461_6c6c_795f_6b33);

/// Serializes `value` into its canonical byte form.
///
/// # Errors
///
/// Returns the serializer error if `value` cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    Ok(canonical_value_bytes(&value))
}

/// Canonical byte form of an already-built JSON value.
#[must_use]
pub fn canonical_value_bytes(value: &Value) -> Vec<u8> {
    CANONICAL_BUFFER.with(|buffer| {
        let mut buffer = buffer.borrow_mut();
        buffer.clear();
        write_canonical(value, &mut buffer);
        buffer.clone()
    })
}

/// Appends the canonical form of `value` to `out`.
pub fn write_canonical(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push(b'[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                write_canonical(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push(b'{');
            for (idx, (key, item)) in entries.into_iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                write_string(key, out);
                out.push(b':');
                write_canonical(item, out);
            }
            out.push(b'}');
        }
    }
}

fn write_string(s: &str, out: &mut Vec<u8>) {
    // Serializing a `&str` into a Vec cannot fail.
    if serde_json::to_writer(&mut *out, s).is_err() {
        out.extend_from_slice(b"\"\"");
    }
}

/// Short digest of a canonical form for log output.
#[must_use]
pub fn form_digest(form: &[u8]) -> u64 {
    let (k0, k1, k2, k3) = DIGEST_SEEDS;
    RandomState::with_seeds(k0, k1, k2, k3).hash_one(form)
}
