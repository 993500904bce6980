use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pod_sso::import_public_key;
use pod_sso_stub::{AppState, StubConfig, fixtures, run};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
struct Args {
    #[clap(long, default_value = "127.0.0.1")]
    host: String,
    #[clap(long, default_value = "3000")]
    port: u16,
    /// XML public key the `Signature` header is checked against.
    #[clap(long, env = "STUB_PUBLIC_KEY_FILE")]
    public_key_file: PathBuf,
    /// Host name clients sign, usually the host of their base URL.
    #[clap(long, env = "STUB_HOST_NAME", default_value = "127.0.0.1")]
    host_name: String,
    /// Seed of the key handed out by the private key handshake.
    #[clap(long, env = "STUB_USER_KEY_SEED")]
    user_key_seed: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let xml = std::fs::read(&args.public_key_file)
        .with_context(|| format!("reading {}", args.public_key_file.display()))?;
    let host_key = import_public_key(&xml).context("importing host public key")?;

    let mut config = StubConfig::new(args.host_name, host_key);
    if let Some(seed) = &args.user_key_seed {
        config = config.with_user_key(fixtures::key_from_seed(seed, 2048)?);
    }

    run(args.host, args.port, AppState::new(config)).await
}
