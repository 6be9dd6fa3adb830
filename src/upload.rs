use tracing::{debug, warn};

use crate::types::KeyRecord;
use crate::vks::VerifyingKeyServer;

/// Uploads every resolved key and records the returned token and status.
///
/// Records without a public key are left untouched. A failed upload is
/// reported and leaves its record without a token; the remaining records are
/// still uploaded. Returns the number of successful uploads.
pub async fn upload_all(vks: &VerifyingKeyServer, records: &mut [KeyRecord]) -> usize {
    let mut uploaded = 0;

    for record in records.iter_mut().filter(|r| r.has_pubkey()) {
        println!("uploading {}", record.fingerprint);

        match vks.upload(&record.pubkey).await {
            Ok(key) => {
                debug!(
                    fingerprint = %record.fingerprint,
                    addresses = key.status.len(),
                    "upload accepted"
                );
                record.token = Some(key.token);
                record.status = Some(key.status);
                uploaded += 1;
            }
            Err(e) => {
                warn!(fingerprint = %record.fingerprint, error = %e, "upload failed");
                println!("Upload failed ({}): {e}", record.fingerprint);
            }
        }
    }

    uploaded
}
