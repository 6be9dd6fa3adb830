//! Key lookup on an HKP keyserver.

use hyper::StatusCode;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::http::{HttpClient, join_path};
use crate::types::Fingerprint;

pub const DEFAULT_KEYSERVER: &str = "https://keyserver.ubuntu.com";

/// For fetching keys from a keyserver speaking HKP over HTTP(S).
#[derive(Debug, Clone)]
pub struct KeyServer {
    http: HttpClient,
    base: Url,
}

impl KeyServer {
    /// Returns a handle for the keyserver at `base`, e.g. `https://keyserver.ubuntu.com`.
    pub fn new(base: Url) -> Self {
        Self {
            http: HttpClient::new(),
            base,
        }
    }

    /// The lookup URL for `fingerprint`.
    pub fn lookup_url(&self, fingerprint: &Fingerprint) -> Result<Url> {
        let mut url = join_path(&self.base, "pks/lookup")?;
        url.set_query(Some(&format!("op=get&search=0x{}", fingerprint)));
        Ok(url)
    }

    /// Retrieves the ASCII-armored key for `fingerprint`.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Result<String> {
        let url = self.lookup_url(fingerprint)?;
        let res = self.http.get(&url).await?;

        match res.status {
            StatusCode::OK => {
                let text = String::from_utf8(res.body.to_vec())
                    .map_err(|_| Error::MalformedResponse("key is not valid UTF-8".into()))?;
                if text.trim().is_empty() {
                    return Err(Error::NotFound);
                }
                debug!(fingerprint = %fingerprint, bytes = text.len(), "fetched key from keyserver");
                Ok(text)
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            n => Err(Error::HttpStatus(n)),
        }
    }
}
