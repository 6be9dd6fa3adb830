use hyper::StatusCode;
use tracing::{debug, warn};

use crate::types::{Fingerprint, KeyRecord};
use crate::vks::VerifyingKeyServer;

/// Fills in `addresses` for every uploaded record and returns the pending ones.
///
/// An address is pending when its status is `unpublished` or `pending`.
/// Records that were never uploaded keep `addresses` unset.
pub fn collect_pending(records: &mut [KeyRecord]) -> Vec<(Fingerprint, Vec<String>)> {
    let mut pending = Vec::new();

    for record in records.iter_mut() {
        let Some(ref status) = record.status else {
            continue;
        };

        let addresses: Vec<String> = status
            .iter()
            .filter(|(_, s)| s.needs_verification())
            .map(|(address, _)| address.clone())
            .collect();

        if !addresses.is_empty() {
            pending.push((record.fingerprint.clone(), addresses.clone()));
        }
        record.addresses = Some(addresses);
    }

    pending
}

/// Prints which keys were not found and which addresses await verification.
pub fn report(records: &[KeyRecord]) {
    for record in records {
        if !record.has_pubkey() {
            println!(
                "{} not found in local keyring or keyserver, skipping",
                record.fingerprint
            );
        }

        let addresses = record.addresses();
        if !addresses.is_empty() {
            println!("{} needs verification: {:?}", record.fingerprint, addresses);
        }
    }
}

/// Requests verification emails for every record with pending addresses.
///
/// `confirm` is asked once, and only if there is something to request.
/// Errors reported by the service are printed and do not stop the loop.
/// Returns the number of requests the service accepted.
pub async fn request_all<F>(vks: &VerifyingKeyServer, records: &[KeyRecord], confirm: F) -> usize
where
    F: FnOnce() -> bool,
{
    let requestable: Vec<(&KeyRecord, &str)> = records
        .iter()
        .filter(|r| !r.addresses().is_empty())
        .filter_map(|r| r.token.as_deref().map(|token| (r, token)))
        .collect();

    if requestable.is_empty() {
        debug!("no addresses need verification");
        return 0;
    }

    if !confirm() {
        debug!("verification requests declined");
        return 0;
    }

    let mut accepted = 0;
    for (record, token) in requestable {
        let addresses = record.addresses();
        println!("requesting verification for {:?}", addresses);

        match vks.request_verify(token, addresses).await {
            Ok(outcome) => {
                if outcome.status != StatusCode::OK {
                    println!("status_code: {}", outcome.status.as_u16());
                }
                if let Some(ref error) = outcome.error {
                    println!("Error: {error}");
                }
                if outcome.is_success() {
                    accepted += 1;
                }
            }
            Err(e) => {
                warn!(fingerprint = %record.fingerprint, error = %e, "verification request failed");
                println!("Error: {e}");
            }
        }
    }

    accepted
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::AddressStatus;
    use crate::validate_fingerprint;

    fn record(hex: char, status: Option<&[(&str, AddressStatus)]>) -> KeyRecord {
        let mut record = KeyRecord::new(validate_fingerprint(&hex.to_string().repeat(40)).unwrap());
        record.pubkey = "-----BEGIN PGP PUBLIC KEY BLOCK-----".to_string();
        if let Some(status) = status {
            record.token = Some(format!("token-{hex}"));
            record.status = Some(
                status
                    .iter()
                    .map(|(a, s)| (a.to_string(), *s))
                    .collect::<BTreeMap<_, _>>(),
            );
        }
        record
    }

    #[test]
    fn test_collect_pending_filters_statuses() {
        let mut records = vec![record(
            'A',
            Some(&[
                ("a@example.org", AddressStatus::Published),
                ("b@example.org", AddressStatus::Unpublished),
                ("c@example.org", AddressStatus::Pending),
                ("d@example.org", AddressStatus::Revoked),
            ]),
        )];

        let pending = collect_pending(&mut records);
        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending[0].1,
            vec!["b@example.org".to_string(), "c@example.org".to_string()]
        );
        assert_eq!(records[0].addresses(), pending[0].1.as_slice());
    }

    #[test]
    fn test_collect_pending_skips_records_without_status() {
        let mut records = vec![
            record('A', None),
            record('B', Some(&[("b@example.org", AddressStatus::Published)])),
        ];

        let pending = collect_pending(&mut records);
        assert!(pending.is_empty());
        assert!(records[0].addresses.is_none());
        assert_eq!(records[1].addresses, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_request_all_without_pending_never_prompts() {
        let vks = VerifyingKeyServer::new(url::Url::parse("http://127.0.0.1:9/vks/v1").unwrap());
        let mut records = vec![record('A', Some(&[("a@example.org", AddressStatus::Published)]))];
        collect_pending(&mut records);

        let sent = request_all(&vks, &records, || panic!("must not prompt")).await;
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_request_all_declined_sends_nothing() {
        // Port 9 is discard; nothing should ever connect there.
        let vks = VerifyingKeyServer::new(url::Url::parse("http://127.0.0.1:9/vks/v1").unwrap());
        let mut records = vec![record('A', Some(&[("a@example.org", AddressStatus::Pending)]))];
        collect_pending(&mut records);

        let mut asked = false;
        let sent = request_all(&vks, &records, || {
            asked = true;
            false
        })
        .await;
        assert!(asked);
        assert_eq!(sent, 0);
    }
}
