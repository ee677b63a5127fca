//! Input Fingerprints - SHA-256 over Canonical JSON
//!
//! Two inputs that differ only in key order get the same fingerprint, so a
//! report can be matched to the exact input it judged.
//!
//! Fingerprinting runs before validation, on input nobody has bounded yet,
//! so the canonical form is produced with an explicit work stack instead of
//! recursion.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write;

enum Step<'a> {
    Value(&'a Value),
    Key(&'a str),
    Punct(char),
}

/// Compact JSON with object keys in byte order at every level.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    let mut stack = vec![Step::Value(value)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Punct(c) => out.push(c),
            Step::Key(key) => {
                out.push_str(&Value::from(key).to_string());
                out.push(':');
            }
            Step::Value(Value::Array(items)) => {
                out.push('[');
                stack.push(Step::Punct(']'));
                for (i, item) in items.iter().enumerate().rev() {
                    stack.push(Step::Value(item));
                    if i > 0 {
                        stack.push(Step::Punct(','));
                    }
                }
            }
            Step::Value(Value::Object(map)) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                out.push('{');
                stack.push(Step::Punct('}'));
                for (i, (key, item)) in entries.into_iter().enumerate().rev() {
                    stack.push(Step::Value(item));
                    stack.push(Step::Key(key));
                    if i > 0 {
                        stack.push(Step::Punct(','));
                    }
                }
            }
            // Scalars print without recursion.
            Step::Value(scalar) => out.push_str(&scalar.to_string()),
        }
    }
    out
}

/// Fingerprint of a candidate document or options value: lowercase hex of
/// the SHA-256 of its canonical form.
pub fn fingerprint(value: &Value) -> String {
    let digest = Sha256::digest(canonical_json(value).as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    })
}
