//! Client for the verifying keyserver API (`/vks/v1`) of keys.openpgp.org.

use std::collections::BTreeMap;

use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::http::{HttpClient, join_path};
use crate::types::AddressStatus;

pub const DEFAULT_API_ENDPOINT: &str = "https://keys.openpgp.org/vks/v1";

#[derive(Serialize)]
struct UploadRequest<'a> {
    keytext: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    token: Option<String>,
    status: Option<BTreeMap<String, AddressStatus>>,
    error: Option<String>,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
    addresses: &'a [String],
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// A successful upload: the token to refer to the key, and per-address status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedKey {
    pub token: String,
    pub status: BTreeMap<String, AddressStatus>,
}

/// What the service answered to a verification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub status: StatusCode,
    pub error: Option<String>,
}

impl VerifyOutcome {
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK && self.error.is_none()
    }
}

/// Handle for a verifying keyserver.
#[derive(Debug, Clone)]
pub struct VerifyingKeyServer {
    http: HttpClient,
    endpoint: Url,
}

impl VerifyingKeyServer {
    /// Returns a handle for the API rooted at `endpoint`, e.g. `https://keys.openpgp.org/vks/v1`.
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: HttpClient::new(),
            endpoint,
        }
    }

    /// Uploads an ASCII-armored key.
    pub async fn upload(&self, keytext: &str) -> Result<UploadedKey> {
        let url = join_path(&self.endpoint, "upload")?;
        let res = self.http.post_json(&url, &UploadRequest { keytext }).await?;

        let parsed: UploadResponse = match serde_json::from_slice(&res.body) {
            Ok(parsed) => parsed,
            Err(_) if !res.status.is_success() => return Err(Error::HttpStatus(res.status)),
            Err(e) => {
                debug!(error = %e, "upload response is not the expected JSON");
                return Err(Error::MalformedResponse(res.text()));
            }
        };

        if let Some(error) = parsed.error {
            return Err(Error::Service(error));
        }
        if !res.status.is_success() {
            return Err(Error::HttpStatus(res.status));
        }

        match (parsed.token, parsed.status) {
            (Some(token), Some(status)) => Ok(UploadedKey { token, status }),
            _ => Err(Error::MalformedResponse(res.text())),
        }
    }

    /// Asks the service to send verification emails to `addresses`.
    ///
    /// Both the HTTP status and any `error` field are returned so the caller
    /// can report each of them.
    pub async fn request_verify(&self, token: &str, addresses: &[String]) -> Result<VerifyOutcome> {
        let url = join_path(&self.endpoint, "request-verify")?;
        let res = self
            .http
            .post_json(&url, &VerifyRequest { token, addresses })
            .await?;

        let error = match serde_json::from_slice::<ErrorBody>(&res.body) {
            Ok(body) => body.error,
            Err(e) => {
                warn!(status = %res.status, error = %e, "verification response is not JSON");
                None
            }
        };

        Ok(VerifyOutcome {
            status: res.status,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_shape() {
        let body = serde_json::to_value(UploadRequest { keytext: "-----BEGIN" }).unwrap();
        assert_eq!(body, serde_json::json!({"keytext": "-----BEGIN"}));
    }

    #[test]
    fn test_verify_request_shape() {
        let addresses = vec!["a@example.org".to_string()];
        let body = serde_json::to_value(VerifyRequest {
            token: "tok",
            addresses: &addresses,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"token": "tok", "addresses": ["a@example.org"]})
        );
    }

    #[test]
    fn test_upload_response_missing_fields_parses() {
        let parsed: UploadResponse = serde_json::from_str(r#"{"key_fpr": "AAAA"}"#).unwrap();
        assert!(parsed.token.is_none());
        assert!(parsed.status.is_none());
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_verify_outcome_success() {
        let ok = VerifyOutcome {
            status: StatusCode::OK,
            error: None,
        };
        assert!(ok.is_success());

        let failed = VerifyOutcome {
            status: StatusCode::OK,
            error: Some("rate limited".into()),
        };
        assert!(!failed.is_success());

        let bad_status = VerifyOutcome {
            status: StatusCode::BAD_REQUEST,
            error: None,
        };
        assert!(!bad_status.is_success());
    }
}
