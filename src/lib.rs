//! Publish keys on keys.openpgp.org from a keylist.
//!
//! Reads a JSON keylist of fingerprints, finds each public key in the local
//! GnuPG keyring (falling back to an HKP keyserver), uploads the keys to a
//! verifying keyserver, and requests verification emails for addresses that
//! are not yet published.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use hagrid_verify::{Config, Mode, Pipeline};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> hagrid_verify::Result<()> {
//!     let pipeline = Pipeline::from_config(&Config::new()?);
//!     let records = pipeline
//!         .run(Path::new("keylist.json"), Mode::Publish, || false)
//!         .await?;
//!
//!     for record in records {
//!         println!("{}: token={:?}", record.fingerprint, record.token);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Requirements
//!
//! - `gpg2` (or another GnuPG binary, see [`Keyring::with_program`])
//! - Network access to the keyserver and the verifying keyserver

mod config;
mod error;
mod http;
pub mod keylist;
mod keyring;
mod keyserver;
mod parse;
mod pipeline;
pub mod prompt;
pub mod resolve;
mod types;
pub mod upload;
mod validation;
pub mod verify;
mod vks;

pub use config::Config;
pub use error::{Error, Result};
pub use keyring::{DEFAULT_GPG_PROGRAM, Keyring};
pub use keyserver::{DEFAULT_KEYSERVER, KeyServer};
pub use parse::{addresses, extract_address, parse_keys};
pub use pipeline::Pipeline;
pub use types::{
    AddressStatus, Fingerprint, KeyRecord, KeyValidity, Keylist, KeylistEntry, LocalKey, Mode,
};
pub use validation::{is_valid_fingerprint, validate_fingerprint};
pub use vks::{DEFAULT_API_ENDPOINT, UploadedKey, VerifyOutcome, VerifyingKeyServer};
