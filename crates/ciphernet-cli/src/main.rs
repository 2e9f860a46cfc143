//! CipherNet command-line client.
//!
//! # Usage
//!
//! ```bash
//! ciphernet register alice
//! ciphernet contacts add Bob <bob-identity>
//! CIPHERNET_SECRET='correct horse' ciphernet send --peer Bob --message hello
//! ciphernet export --peer Bob --output to-bob.jsonl
//! ```

use ciphernet_app::Runtime;
use ciphernet_cli::{Args, ConsoleDriver, SystemEnv, execute};
use ciphernet_core::{OfflineAdvisor, SharedSecret};
use ciphernet_store::RedbStore;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let store = RedbStore::open(&args.data)?;
    tracing::debug!(data = %args.data.display(), "session file opened");

    let driver = ConsoleDriver::new(std::io::stderr());
    let mut runtime = Runtime::new(driver, store, SystemEnv::new(), OfflineAdvisor);
    let secret = args.secret.map(SharedSecret::new);

    execute(&mut runtime, args.command, secret, &mut std::io::stdout().lock()).await?;
    Ok(())
}
