use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::keylist;
use crate::keyring::Keyring;
use crate::keyserver::KeyServer;
use crate::resolve::{list_all, resolve_all};
use crate::types::{KeyRecord, Mode};
use crate::upload::upload_all;
use crate::verify::{collect_pending, report, request_all};
use crate::vks::VerifyingKeyServer;

/// The full run: load, resolve, upload, request verification.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> hagrid_verify::Result<()> {
/// use std::path::Path;
/// use hagrid_verify::{Config, Mode, Pipeline};
///
/// let pipeline = Pipeline::from_config(&Config::new()?);
/// let records = pipeline
///     .run(Path::new("keylist.json"), Mode::Publish, || true)
///     .await?;
/// println!("{} keys processed", records.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    keyring: Keyring,
    keyserver: KeyServer,
    vks: VerifyingKeyServer,
}

impl Pipeline {
    pub fn new(keyring: Keyring, keyserver: KeyServer, vks: VerifyingKeyServer) -> Self {
        Self {
            keyring,
            keyserver,
            vks,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.keyring(), config.keyserver(), config.vks())
    }

    /// Processes the keylist at `path` and returns what was learned per key.
    ///
    /// Only a bad keylist is an error; problems with individual keys are
    /// reported and skipped. `confirm` is consulted before any verification
    /// email is requested.
    pub async fn run<F>(&self, path: &Path, mode: Mode, confirm: F) -> Result<Vec<KeyRecord>>
    where
        F: FnOnce() -> bool,
    {
        let keylist = keylist::load(path)?;

        match mode {
            Mode::ListAddresses => {
                let records = list_all(&self.keyring, &keylist).await;
                for record in &records {
                    println!("{}: {:?}", record.fingerprint, record.addresses());
                }
                Ok(records)
            }
            Mode::Publish => {
                let mut records = resolve_all(&self.keyring, &self.keyserver, &keylist).await;

                let uploaded = upload_all(&self.vks, &mut records).await;
                info!(keys = records.len(), uploaded, "upload finished");
                println!();

                let pending = collect_pending(&mut records);
                report(&records);
                println!();

                let requested = request_all(&self.vks, &records, confirm).await;
                info!(pending = pending.len(), requested, "verification finished");

                Ok(records)
            }
        }
    }
}
