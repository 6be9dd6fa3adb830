use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Keylist, KeylistEntry};

/// Loads and validates a keylist file.
///
/// The document must be JSON of the shape `{"keys": [{"fingerprint": "..."}]}`.
/// Fingerprints themselves are validated later, one by one.
pub fn load(path: &Path) -> Result<Keylist> {
    if !path.exists() {
        return Err(Error::KeylistNotFound(path.to_path_buf()));
    }

    let raw = fs::read(path).map_err(|e| Error::InvalidJson(e.to_string()))?;
    let keylist = parse(&raw)?;
    debug!(path = %path.display(), entries = keylist.keys.len(), "loaded keylist");
    Ok(keylist)
}

/// Parses keylist bytes; see [`load`].
///
/// Only the document shape is checked here. Malformed entries are kept as
/// [`KeylistEntry::Invalid`] or [`KeylistEntry::Missing`] for the resolver to skip.
pub fn parse(raw: &[u8]) -> Result<Keylist> {
    let mut document: Value =
        serde_json::from_slice(raw).map_err(|e| Error::InvalidJson(e.to_string()))?;

    let Some(Value::Array(entries)) = document.get_mut("keys").map(Value::take) else {
        return Err(Error::InvalidKeylist);
    };

    Ok(Keylist {
        keys: entries.into_iter().map(KeylistEntry::from).collect(),
    })
}
