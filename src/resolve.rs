use tracing::{debug, info, warn};

use crate::error::Error;
use crate::keyring::Keyring;
use crate::keyserver::KeyServer;
use crate::parse::addresses;
use crate::types::{Fingerprint, KeyRecord, Keylist, KeylistEntry};
use crate::validation::validate_fingerprint;

/// Finds the ASCII-armored public key for `fingerprint`.
///
/// The local keyring is asked first. Only if it has nothing is the keyserver
/// queried; a key found there is imported into the local keyring. Every
/// failure is logged and yields an empty string.
pub async fn resolve_pubkey(
    keyring: &Keyring,
    keyserver: &KeyServer,
    fingerprint: &Fingerprint,
) -> String {
    match keyring.export_armored(fingerprint).await {
        Ok(armored) if !armored.trim().is_empty() => return armored,
        Ok(_) => debug!(fingerprint = %fingerprint, "key not in local keyring"),
        Err(e) => warn!(fingerprint = %fingerprint, error = %e, "local export failed"),
    }

    match keyserver.lookup_url(fingerprint) {
        Ok(url) => println!("Loading {url}"),
        Err(e) => {
            warn!(fingerprint = %fingerprint, error = %e, "cannot build keyserver URL");
            return String::new();
        }
    }

    let armored = match keyserver.get(fingerprint).await {
        Ok(armored) => armored,
        Err(Error::NotFound) => {
            debug!(fingerprint = %fingerprint, "key not on keyserver");
            return String::new();
        }
        Err(e) => {
            warn!(fingerprint = %fingerprint, error = %e, "keyserver lookup failed");
            return String::new();
        }
    };

    match keyring.import(armored.as_bytes()).await {
        Ok(()) => info!(fingerprint = %fingerprint, "imported key from keyserver"),
        Err(e) => warn!(fingerprint = %fingerprint, error = %e, "importing fetched key failed"),
    }

    armored
}

/// Lists the addresses on the local key for `fingerprint`.
///
/// User IDs without an `@` are returned as they are. Every failure is logged
/// and yields an empty list.
pub async fn resolve_addresses(keyring: &Keyring, fingerprint: &Fingerprint) -> Vec<String> {
    let keys = match keyring.list_keys(fingerprint).await {
        Ok(keys) => keys,
        Err(Error::KeyNotFound(_)) => {
            debug!(fingerprint = %fingerprint, "key not in local keyring");
            return Vec::new();
        }
        Err(e) => {
            warn!(fingerprint = %fingerprint, error = %e, "listing key failed");
            return Vec::new();
        }
    };

    let Some(key) = keys
        .iter()
        .find(|k| k.fingerprint.eq_ignore_ascii_case(fingerprint.as_str()))
    else {
        debug!(fingerprint = %fingerprint, listed = keys.len(), "fingerprint not among listed keys");
        return Vec::new();
    };

    if key.validity.is_unusable() {
        let until = key
            .expires
            .map(|d| format!(" (expired {d})"))
            .unwrap_or_default();
        println!("{fingerprint} is {:?}{until}", key.validity);
    }

    addresses(key)
}

/// Validated, de-duplicated fingerprints of `keylist`, in order of first appearance.
pub fn fingerprints(keylist: &Keylist) -> Vec<Fingerprint> {
    let mut out: Vec<Fingerprint> = Vec::with_capacity(keylist.keys.len());

    for entry in &keylist.keys {
        let raw = match entry {
            KeylistEntry::Fingerprint(raw) => raw,
            KeylistEntry::Missing => {
                println!("Skipping keylist entry without a fingerprint");
                continue;
            }
            KeylistEntry::Invalid(value) => {
                println!("Skipping invalid fingerprint: {value}");
                continue;
            }
        };

        match validate_fingerprint(raw) {
            Ok(fpr) if out.contains(&fpr) => {
                debug!(fingerprint = %fpr, "duplicate fingerprint in keylist");
            }
            Ok(fpr) => out.push(fpr),
            Err(e) => {
                debug!(error = %e, "invalid fingerprint");
                println!("Skipping invalid fingerprint: {raw}");
            }
        }
    }

    out
}

/// Resolves the public key of every valid fingerprint in `keylist`.
pub async fn resolve_all(
    keyring: &Keyring,
    keyserver: &KeyServer,
    keylist: &Keylist,
) -> Vec<KeyRecord> {
    let mut records = Vec::new();
    for fingerprint in fingerprints(keylist) {
        let pubkey = resolve_pubkey(keyring, keyserver, &fingerprint).await;
        records.push(KeyRecord {
            pubkey,
            ..KeyRecord::new(fingerprint)
        });
    }
    records
}

/// Lists the addresses of every valid fingerprint in `keylist`.
pub async fn list_all(keyring: &Keyring, keylist: &Keylist) -> Vec<KeyRecord> {
    let mut records = Vec::new();
    for fingerprint in fingerprints(keylist) {
        let addresses = resolve_addresses(keyring, &fingerprint).await;
        records.push(KeyRecord {
            addresses: Some(addresses),
            ..KeyRecord::new(fingerprint)
        });
    }
    records
}
