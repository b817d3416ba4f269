//! Utility functions shared across modules.
//!
//! ## Canonical JSON (`canonical`)
//! - Sorted-key serialization so payloads compare equal regardless of field order
//! - Thread-local scratch buffer reused across calls
//! - Stable digests of canonical forms for log fields

pub mod canonical;

pub use canonical::{canonical_value_bytes, form_digest, to_canonical_bytes};
