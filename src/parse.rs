use chrono::NaiveDate;
use tracing::debug;

use crate::types::{KeyValidity, LocalKey};

pub fn parse_keys(output: &str) -> Vec<LocalKey> {
    let mut keys = Vec::new();
    let mut current_key: Option<KeyBuilder> = None;

    for line in output.lines() {
        let fields: Vec<&str> = line.split(':').collect();

        match fields[0] {
            "pub" => {
                if let Some(builder) = current_key.take() {
                    push_built(&mut keys, builder);
                }
                current_key = Some(KeyBuilder::from_pub_fields(&fields));
            }
            "fpr" if current_key.is_some() => {
                if let Some(ref mut builder) = current_key
                    && builder.fingerprint.is_none()
                    && fields.len() > 9
                {
                    builder.fingerprint = Some(fields[9].to_string());
                }
            }
            "uid" if current_key.is_some() => {
                if let Some(ref mut builder) = current_key
                    && fields.len() > 9
                    && !fields[9].is_empty()
                {
                    builder.uids.push(unescape_colon_field(fields[9]));
                }
            }
            "sub" | "ssb" | "uat" | "rev" | "tru" | "sig" | "grp" => {
                debug!(
                    record_type = fields[0],
                    "skipping unhandled GPG record type"
                );
            }
            _ if !fields[0].is_empty() => {
                debug!(record_type = fields[0], "skipping unknown GPG record type");
            }
            _ => {}
        }
    }

    if let Some(builder) = current_key {
        push_built(&mut keys, builder);
    }

    keys
}

fn push_built(keys: &mut Vec<LocalKey>, builder: KeyBuilder) {
    match builder.build() {
        Some(key) => keys.push(key),
        None => debug!("skipping key: missing fingerprint"),
    }
}

/// Reduces a user ID to the address a verification email would go to.
///
/// `Name <user@example.org>` yields `user@example.org`. A bare address is
/// returned trimmed. A user ID without `@` is returned unchanged.
pub fn extract_address(uid: &str) -> String {
    if !uid.contains('@') {
        return uid.to_string();
    }

    if let Some(start) = uid.rfind('<')
        && let Some(len) = uid[start + 1..].find('>')
    {
        let inner = &uid[start + 1..start + 1 + len];
        if inner.contains('@') {
            return inner.trim().to_string();
        }
    }

    uid.trim().to_string()
}

/// The addresses of every user ID on `key`, in listing order, without duplicates.
pub fn addresses(key: &LocalKey) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(key.uids.len());
    for uid in &key.uids {
        let address = extract_address(uid);
        if !out.contains(&address) {
            out.push(address);
        }
    }
    out
}

// GPG escapes ':' and other specials in colon listings as `\xNN`.
fn unescape_colon_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;

    while let Some(pos) = rest.find("\\x") {
        out.push_str(&rest[..pos]);
        let hex = rest.get(pos + 2..pos + 4);
        match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
            Some(byte) if byte.is_ascii() => {
                out.push(byte as char);
                rest = &rest[pos + 4..];
            }
            _ => {
                out.push_str("\\x");
                rest = &rest[pos + 2..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_timestamp(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.date_naive())
}

#[derive(Default)]
struct KeyBuilder {
    fingerprint: Option<String>,
    uids: Vec<String>,
    created: Option<NaiveDate>,
    expires: Option<NaiveDate>,
    validity: KeyValidity,
}

impl KeyBuilder {
    fn from_pub_fields(fields: &[&str]) -> Self {
        let mut builder = Self::default();

        if fields.len() > 1 {
            builder.validity = fields[1]
                .chars()
                .next()
                .map(KeyValidity::from_gpg_char)
                .unwrap_or_default();
        }

        if fields.len() > 5 {
            builder.created = parse_timestamp(fields[5]);
        }

        if fields.len() > 6 {
            builder.expires = parse_timestamp(fields[6]);
        }

        builder
    }

    fn build(self) -> Option<LocalKey> {
        Some(LocalKey {
            fingerprint: self.fingerprint?,
            uids: self.uids,
            created: self.created,
            expires: self.expires,
            validity: self.validity,
        })
    }
}
