use std::path::PathBuf;

use url::Url;

use crate::error::Result;
use crate::keyring::{DEFAULT_GPG_PROGRAM, Keyring};
use crate::keyserver::{DEFAULT_KEYSERVER, KeyServer};
use crate::types::Mode;
use crate::vks::{DEFAULT_API_ENDPOINT, VerifyingKeyServer};

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the verifying keyserver API.
    pub api_endpoint: Url,
    /// HKP keyserver consulted when a key is not in the local keyring.
    pub keyserver: Url,
    /// Keyring program, `gpg2` unless overridden.
    pub gpg_program: String,
    /// GnuPG home directory; the program's default when unset.
    pub gpg_homedir: Option<PathBuf>,
    pub mode: Mode,
}

impl Config {
    /// The default configuration, talking to keys.openpgp.org and keyserver.ubuntu.com.
    pub fn new() -> Result<Self> {
        Ok(Self {
            api_endpoint: Url::parse(DEFAULT_API_ENDPOINT)?,
            keyserver: Url::parse(DEFAULT_KEYSERVER)?,
            gpg_program: DEFAULT_GPG_PROGRAM.to_string(),
            gpg_homedir: None,
            mode: Mode::default(),
        })
    }

    pub fn keyring(&self) -> Keyring {
        let keyring = Keyring::with_program(&self.gpg_program);
        match self.gpg_homedir {
            Some(ref homedir) => keyring.with_homedir(homedir),
            None => keyring,
        }
    }

    pub fn keyserver(&self) -> KeyServer {
        KeyServer::new(self.keyserver.clone())
    }

    pub fn vks(&self) -> VerifyingKeyServer {
        VerifyingKeyServer::new(self.api_endpoint.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new().unwrap();
        assert_eq!(config.api_endpoint.as_str(), "https://keys.openpgp.org/vks/v1");
        assert_eq!(config.keyserver.host_str(), Some("keyserver.ubuntu.com"));
        assert_eq!(config.gpg_program, "gpg2");
        assert_eq!(config.gpg_homedir, None);
        assert_eq!(config.mode, Mode::Publish);
    }

    #[test]
    fn test_keyserver_follows_config() {
        let mut config = Config::new().unwrap();
        config.keyserver = Url::parse("http://localhost:11371").unwrap();
        let fpr = crate::validate_fingerprint(&"C".repeat(40)).unwrap();

        let url = config.keyserver().lookup_url(&fpr).unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(11371));
    }
}
