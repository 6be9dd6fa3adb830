use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use url::Url;

use hagrid_verify::{
    Config, DEFAULT_API_ENDPOINT, DEFAULT_GPG_PROGRAM, DEFAULT_KEYSERVER, Mode, Pipeline, prompt,
};

const QUESTION: &str = "Do you want to request verification emails for all of these keys?";

#[derive(Parser)]
#[command(
    name = "hv",
    version,
    about = "Upload the keys of a keylist to keys.openpgp.org and request verification",
    long_about = "Reads {\"keys\": [{\"fingerprint\": ...}]} from KEYLIST, exports each key from the \
                  local keyring (falling back to a keyserver), uploads it to the verifying keyserver \
                  and, after confirmation, requests verification emails for unpublished addresses."
)]
struct Cli {
    /// Path to the JSON keylist
    keylist: PathBuf,

    /// Root of the verifying keyserver API
    #[arg(long, env = "HV_API_ENDPOINT", default_value = DEFAULT_API_ENDPOINT)]
    api_endpoint: Url,

    /// Keyserver consulted for keys missing from the local keyring
    #[arg(long, env = "HV_KEYSERVER", default_value = DEFAULT_KEYSERVER)]
    keyserver: Url,

    /// Keyring program to run
    #[arg(long, env = "HV_GPG", default_value = DEFAULT_GPG_PROGRAM)]
    gpg: String,

    /// GnuPG home directory
    #[arg(long, env = "GNUPGHOME")]
    homedir: Option<PathBuf>,

    /// Only list the addresses of each key in the local keyring
    #[arg(long)]
    list_addresses: bool,

    /// Request verification without asking
    #[arg(short, long)]
    yes: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            api_endpoint: self.api_endpoint.clone(),
            keyserver: self.keyserver.clone(),
            gpg_program: self.gpg.clone(),
            gpg_homedir: self.homedir.clone(),
            mode: if self.list_addresses {
                Mode::ListAddresses
            } else {
                Mode::Publish
            },
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config();
    let pipeline = Pipeline::from_config(&config);
    let assume_yes = cli.yes;

    let confirm = move || {
        assume_yes
            || prompt::confirm(io::stdin().lock(), io::stdout(), QUESTION).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "reading confirmation failed");
                false
            })
    };

    match pipeline.run(&cli.keylist, config.mode, confirm).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}
