use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::parse::parse_keys;
use crate::types::{Fingerprint, LocalKey};

pub const DEFAULT_GPG_PROGRAM: &str = "gpg2";

/// Interface to the local keyring, driven through the external `gpg` tool.
///
/// Every invocation runs with `--batch` and `LC_ALL=C` so the output can be
/// parsed reliably.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> hagrid_verify::Result<()> {
/// use hagrid_verify::{Keyring, validate_fingerprint};
///
/// let keyring = Keyring::new().with_homedir("/home/alice/.gnupg");
/// let fpr = validate_fingerprint("ABAF11C65A2970B130ABE3C479BE3E4300411886")?;
/// let armored = keyring.export_armored(&fpr).await?;
/// println!("{} bytes", armored.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Keyring {
    program: OsString,
    args: Vec<OsString>,
    homedir: Option<PathBuf>,
}

impl Default for Keyring {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyring {
    /// Uses `gpg2` from `PATH` and its default home directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(DEFAULT_GPG_PROGRAM)
    }

    /// Uses a different keyring program, e.g. `gpg` or an absolute path.
    #[must_use]
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            homedir: None,
        }
    }

    /// Uses a program plus leading arguments, e.g. a wrapper script run by `sh`.
    #[must_use]
    pub fn with_command<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            homedir: None,
        }
    }

    /// Points the tool at a specific GnuPG home directory.
    #[must_use]
    pub fn with_homedir(mut self, path: impl Into<PathBuf>) -> Self {
        self.homedir = Some(path.into());
        self
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.env("LC_ALL", "C").args(&self.args).arg("--batch");
        if let Some(ref homedir) = self.homedir {
            cmd.arg("--homedir").arg(homedir);
        }
        cmd.args(args);
        cmd
    }

    /// Exports the ASCII-armored public key for `fingerprint`.
    ///
    /// Returns an empty string if the key is not in the keyring.
    pub async fn export_armored(&self, fingerprint: &Fingerprint) -> Result<String> {
        let output = self
            .command(["--armor", "--export", fingerprint.as_str()])
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(self.check_error(output.status, &output.stderr));
        }

        debug!(
            fingerprint = %fingerprint,
            bytes = output.stdout.len(),
            "exported key from local keyring"
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Lists the key for `fingerprint` with its user IDs.
    pub async fn list_keys(&self, fingerprint: &Fingerprint) -> Result<Vec<LocalKey>> {
        let output = self
            .command(["--list-keys", "--with-colons", fingerprint.as_str()])
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No public key") || stderr.contains("not found") {
                return Err(Error::KeyNotFound(fingerprint.to_string()));
            }
            return Err(self.check_error(output.status, &output.stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_keys(&stdout))
    }

    /// Imports ASCII-armored key material, fed on stdin.
    pub async fn import(&self, armored: &[u8]) -> Result<()> {
        let mut child = self
            .command(["--import"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child.stdin.take().ok_or(Error::StdinCaptureFailed)?;
        stdin.write_all(armored).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(self.check_error(output.status, &output.stderr));
        }

        Ok(())
    }

    fn check_error(&self, status: ExitStatus, stderr: &[u8]) -> Error {
        let msg = String::from_utf8_lossy(stderr);

        if msg.contains("Permission denied") || msg.contains("permission denied") {
            return Error::PermissionDenied;
        }

        if let Some(ref homedir) = self.homedir
            && msg.contains("No such file or directory")
            && msg.contains(homedir.to_string_lossy().as_ref())
        {
            return Error::KeyringNotInitialized;
        }

        Error::Gpg {
            program: self.program.to_string_lossy().into_owned(),
            status: status.code().unwrap_or(-1),
            stderr: msg.trim_end().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_status() -> ExitStatus {
        std::process::Command::new("false").status().unwrap()
    }

    #[test]
    fn test_check_error_permission_denied() {
        let keyring = Keyring::new();
        let err = keyring.check_error(failed_status(), b"gpg: Permission denied");
        assert!(matches!(err, Error::PermissionDenied));
    }

    #[test]
    fn test_check_error_permission_denied_lowercase() {
        let keyring = Keyring::new();
        let err = keyring.check_error(
            failed_status(),
            b"gpg: fatal: can't open '/root/.gnupg': permission denied",
        );
        assert!(matches!(err, Error::PermissionDenied));
    }

    #[test]
    fn test_check_error_keyring_not_initialized() {
        let keyring = Keyring::new().with_homedir("/tmp/hv-missing-home");
        let err = keyring.check_error(
            failed_status(),
            b"gpg: keybox '/tmp/hv-missing-home/pubring.kbx': No such file or directory",
        );
        assert!(matches!(err, Error::KeyringNotInitialized));
    }

    #[test]
    fn test_check_error_missing_file_without_homedir_is_generic() {
        let keyring = Keyring::new();
        let err = keyring.check_error(
            failed_status(),
            b"gpg: keybox '/x/pubring.kbx': No such file or directory",
        );
        assert!(matches!(err, Error::Gpg { .. }));
    }

    #[test]
    fn test_check_error_generic() {
        let keyring = Keyring::with_program("gpg");
        let err = keyring.check_error(failed_status(), b"gpg: some unknown error\n");
        match err {
            Error::Gpg {
                program,
                status,
                stderr,
            } => {
                assert_eq!(program, "gpg");
                assert_eq!(status, 1);
                assert_eq!(stderr, "gpg: some unknown error");
            }
            _ => panic!("expected Gpg error"),
        }
    }

    #[test]
    fn test_command_arguments() {
        let keyring = Keyring::with_command("sh", ["fake-gpg.sh"]).with_homedir("/tmp/home");
        let cmd = keyring.command(["--list-keys"]);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "sh");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(
            args,
            ["fake-gpg.sh", "--batch", "--homedir", "/tmp/home", "--list-keys"]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_command_error() {
        let keyring = Keyring::with_program("/nonexistent/hv-gpg");
        let fpr = crate::validate_fingerprint(&"A".repeat(40)).unwrap();
        let result = keyring.export_armored(&fpr).await;
        assert!(matches!(result, Err(Error::Command(_))));
    }
}
