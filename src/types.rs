use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated, uppercase 40-digit hex key fingerprint.
///
/// Obtain one through [`validate_fingerprint`](crate::validate_fingerprint).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub(crate) fn new_unchecked(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The parsed keylist document: `{"keys": [{"fingerprint": "..."}]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keylist {
    pub keys: Vec<KeylistEntry>,
}

/// One entry of a [`Keylist`].
///
/// Malformed entries are kept so the resolver can report and skip them
/// without failing the whole keylist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeylistEntry {
    /// An object with a string `fingerprint`, not yet validated.
    Fingerprint(String),
    /// An object without a `fingerprint` field, or with `null`.
    Missing,
    /// A non-string `fingerprint`, or an entry that is not an object.
    Invalid(Value),
}

impl From<Value> for KeylistEntry {
    fn from(entry: Value) -> Self {
        match entry {
            Value::Object(mut fields) => match fields.remove("fingerprint") {
                None | Some(Value::Null) => Self::Missing,
                Some(Value::String(fingerprint)) => Self::Fingerprint(fingerprint),
                Some(other) => Self::Invalid(other),
            },
            other => Self::Invalid(other),
        }
    }
}

/// Publication state of one address, as reported by the verification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum AddressStatus {
    /// Verified and searchable.
    Published,
    /// Known to the service but never verified.
    Unpublished,
    /// A verification email was sent and not yet confirmed.
    Pending,
    /// The address' user ID is revoked.
    Revoked,
    /// Any value this client does not know about.
    #[serde(other)]
    Unknown,
}

impl AddressStatus {
    pub fn needs_verification(self) -> bool {
        matches!(self, Self::Unpublished | Self::Pending)
    }
}

impl fmt::Display for AddressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Published => "published",
            Self::Unpublished => "unpublished",
            Self::Pending => "pending",
            Self::Revoked => "revoked",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Everything learned about one fingerprint during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub fingerprint: Fingerprint,
    /// ASCII-armored public key, empty when the key could not be found.
    pub pubkey: String,
    /// Upload token returned by the verification service.
    pub token: Option<String>,
    /// Per-address publication status returned alongside the token.
    pub status: Option<BTreeMap<String, AddressStatus>>,
    /// Addresses still to verify, or the key's addresses in listing mode.
    pub addresses: Option<Vec<String>>,
}

impl KeyRecord {
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            pubkey: String::new(),
            token: None,
            status: None,
            addresses: None,
        }
    }

    pub fn has_pubkey(&self) -> bool {
        !self.pubkey.is_empty()
    }

    /// Addresses recorded on this key, or an empty slice.
    pub fn addresses(&self) -> &[String] {
        self.addresses.as_deref().unwrap_or_default()
    }
}

/// A key as listed by the local keyring tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalKey {
    pub fingerprint: String,
    pub uids: Vec<String>,
    pub created: Option<NaiveDate>,
    pub expires: Option<NaiveDate>,
    pub validity: KeyValidity,
}

/// GPG key validity level.
///
/// Values correspond to GPG's validity field in `--with-colons` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[non_exhaustive]
pub enum KeyValidity {
    /// Validity unknown (new key or insufficient data)
    #[default]
    Unknown,
    /// Validity undefined (not yet computed)
    Undefined,
    /// Key is explicitly distrusted
    Never,
    /// Marginally valid (some trust path exists)
    Marginal,
    /// Fully valid (strong trust path)
    Full,
    /// Ultimately valid (user's own key or explicitly trusted)
    Ultimate,
    /// Key has expired
    Expired,
    /// Key has been revoked
    Revoked,
}

impl KeyValidity {
    pub fn from_gpg_char(c: char) -> Self {
        match c {
            'o' => Self::Unknown,
            'q' => Self::Undefined,
            'n' => Self::Never,
            'm' => Self::Marginal,
            'f' => Self::Full,
            'u' => Self::Ultimate,
            'e' => Self::Expired,
            'r' => Self::Revoked,
            _ => Self::Unknown,
        }
    }

    /// Whether the service would refuse to publish this key's addresses.
    pub fn is_unusable(self) -> bool {
        matches!(self, Self::Expired | Self::Revoked)
    }
}

/// What a run does after loading the keylist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Resolve, upload, and request verification.
    #[default]
    Publish,
    /// Only list each key's addresses from the local keyring.
    ListAddresses,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validity_from_gpg_char() {
        assert_eq!(KeyValidity::from_gpg_char('o'), KeyValidity::Unknown);
        assert_eq!(KeyValidity::from_gpg_char('q'), KeyValidity::Undefined);
        assert_eq!(KeyValidity::from_gpg_char('n'), KeyValidity::Never);
        assert_eq!(KeyValidity::from_gpg_char('m'), KeyValidity::Marginal);
        assert_eq!(KeyValidity::from_gpg_char('f'), KeyValidity::Full);
        assert_eq!(KeyValidity::from_gpg_char('u'), KeyValidity::Ultimate);
        assert_eq!(KeyValidity::from_gpg_char('e'), KeyValidity::Expired);
        assert_eq!(KeyValidity::from_gpg_char('r'), KeyValidity::Revoked);
        assert_eq!(KeyValidity::from_gpg_char('-'), KeyValidity::Unknown);
    }

    #[test]
    fn test_address_status_deserialize() {
        let status: BTreeMap<String, AddressStatus> = serde_json::from_str(
            r#"{"a@example.org":"published","b@example.org":"unpublished",
                "c@example.org":"pending","d@example.org":"revoked",
                "e@example.org":"something-new"}"#,
        )
        .unwrap();

        assert_eq!(status["a@example.org"], AddressStatus::Published);
        assert_eq!(status["b@example.org"], AddressStatus::Unpublished);
        assert_eq!(status["c@example.org"], AddressStatus::Pending);
        assert_eq!(status["d@example.org"], AddressStatus::Revoked);
        assert_eq!(status["e@example.org"], AddressStatus::Unknown);
    }

    #[test]
    fn test_needs_verification() {
        assert!(AddressStatus::Unpublished.needs_verification());
        assert!(AddressStatus::Pending.needs_verification());
        assert!(!AddressStatus::Published.needs_verification());
        assert!(!AddressStatus::Revoked.needs_verification());
        assert!(!AddressStatus::Unknown.needs_verification());
    }

    #[test]
    fn test_keylist_entry_from_value() {
        assert_eq!(
            KeylistEntry::from(serde_json::json!({"fingerprint": "AB"})),
            KeylistEntry::Fingerprint("AB".to_string())
        );
        assert_eq!(
            KeylistEntry::from(serde_json::json!({"name": "x"})),
            KeylistEntry::Missing
        );
        assert_eq!(
            KeylistEntry::from(serde_json::json!({"fingerprint": null})),
            KeylistEntry::Missing
        );
        assert_eq!(
            KeylistEntry::from(serde_json::json!({"fingerprint": 42})),
            KeylistEntry::Invalid(serde_json::json!(42))
        );
        assert_eq!(
            KeylistEntry::from(serde_json::json!("junk")),
            KeylistEntry::Invalid(serde_json::json!("junk"))
        );
    }

    #[test]
    fn test_key_record_defaults() {
        let fpr = Fingerprint::new_unchecked("A".repeat(40));
        let record = KeyRecord::new(fpr.clone());
        assert_eq!(record.fingerprint, fpr);
        assert!(!record.has_pubkey());
        assert!(record.addresses().is_empty());
        assert!(record.token.is_none());
    }
}
