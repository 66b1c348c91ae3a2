//! Hashing System - SHA-256 for Renders
//!
//! Identical inputs must hash identically; pixel data is hashed raw.

use image::RgbImage;
use serde::Serialize;
use serde_json::{Value, to_string};
use sha2::{Digest, Sha256};

use crate::library::ComponentLibrary;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Hash of an opaque render: dimensions then raw RGB bytes
pub fn compute_image_hash(image: &RgbImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_be_bytes());
    hasher.update(image.height().to_be_bytes());
    hasher.update(image.as_raw());
    hex::encode(hasher.finalize())
}

/// Fingerprint of every loaded component, in overlay order
pub fn library_fingerprint(library: &ComponentLibrary) -> String {
    let mut hasher = Sha256::new();
    for component in library.components() {
        let (w, h) = component.dimensions();
        hasher.update(component.key.file_name().as_bytes());
        hasher.update(w.to_be_bytes());
        hasher.update(h.to_be_bytes());
        hasher.update(component.image.as_raw());
    }
    hex::encode(hasher.finalize())
}

/// job_hash = sha256(number + library_fingerprint + canonical_config + engine_version)
pub fn compute_job_hash(
    number: u16,
    library_fingerprint: &str,
    config: &impl Serialize,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let canonical_config = canonical_json(config)?;
    let combined = format!(
        "{}:{}:{}:{}",
        number, library_fingerprint, canonical_config, engine_version
    );
    Ok(sha256_hex(combined.as_bytes()))
}
