use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pod_sso::{
    CanonicalPayload, PodClient, SignatureHeader, SsoConfig, get_signature,
    signing::sign_with_key_file,
    types::{TokenInfoRequest, TokenRequest},
};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[clap(name = "pod-sso", about = "Pod SSO client")]
struct Args {
    #[clap(long, env = "POD_BASE_URL")]
    base_url: String,
    #[clap(long, env = "POD_CLIENT_ID", default_value = "")]
    client_id: String,
    #[clap(long, env = "POD_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    client_secret: String,
    #[clap(long, env = "POD_ACCESS_TOKEN", hide_env_values = true)]
    service_access_token: Option<String>,
    #[clap(long, env = "POD_SIGNATURE", hide_env_values = true)]
    signature: Option<String>,
    #[clap(long, env = "POD_PRIVATE_KEY_FILE")]
    private_key_file: Option<PathBuf>,
    #[clap(long, env = "POD_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the `host` signature and the Authorization header built from it.
    SignHost {
        #[clap(long)]
        key_id: String,
    },
    /// Sign an auto-login payload with a user's key file.
    SignAutoLogin {
        #[clap(long)]
        access_token: String,
        #[clap(long)]
        key_id: String,
        #[clap(long)]
        private_key_file: PathBuf,
        /// Milliseconds since the epoch; defaults to now.
        #[clap(long)]
        timestamp: Option<i64>,
    },
    UserInfo {
        #[clap(long)]
        access_token: String,
    },
    TokenInfo {
        #[clap(long)]
        access_token: String,
    },
    RefreshToken {
        #[clap(long)]
        refresh_token: String,
    },
}

impl Args {
    fn config(&self) -> SsoConfig {
        let mut config = SsoConfig::new(&self.base_url, &self.client_id, &self.client_secret);
        if let Some(token) = &self.service_access_token {
            config = config.with_service_access_token(token);
        }
        if let Some(signature) = &self.signature {
            config = config.with_signature(signature);
        }
        if let Some(path) = &self.private_key_file {
            config = config.with_private_key_file(path);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = args.config();

    let output = match args.command {
        Command::SignHost { key_id } => {
            let signature = get_signature(&config)?;
            let header = SignatureHeader::new(key_id, &signature);
            json!({
                "host": config.host(),
                "signature": signature,
                "authorization": header.to_string(),
            })
        }
        Command::SignAutoLogin {
            access_token,
            key_id,
            private_key_file,
            timestamp,
        } => {
            let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
            let payload = CanonicalPayload::auto_login(&access_token, &key_id, timestamp);
            let signature = sign_with_key_file(&private_key_file, &payload)
                .with_context(|| format!("signing with {}", private_key_file.display()))?;
            json!({
                "keyId": key_id,
                "timestamp": timestamp,
                "signature": signature,
            })
        }
        Command::UserInfo { access_token } => {
            let client = PodClient::new(config)?;
            serde_json::to_value(client.user_info(&access_token)?)?
        }
        Command::TokenInfo { access_token } => {
            let client = PodClient::new(config)?;
            serde_json::to_value(client.token_info(&TokenInfoRequest::new(access_token))?)?
        }
        Command::RefreshToken { refresh_token } => {
            let client = PodClient::new(config)?;
            serde_json::to_value(client.refresh_token(&TokenRequest::refresh(refresh_token))?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
