use anyhow::{bail, ensure, Context};
use base64::Engine;
use clap::{Parser, Subcommand};
use messaging_token::jwt::key::MIN_RECOMMENDED_KEY_LEN;
use messaging_token::messaging::MESSAGING_TOKEN_HEADER;
use messaging_token::{observability, Config};
use rand::RngCore;
use std::io::{self, Read};
use tracing::info;

/// Issue and verify internal messaging tokens.
#[derive(Debug, Parser)]
#[command(name = "messaging-token", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Mint a token from this service
    Issue {
        /// Destination service, used as the audience
        #[arg(required_unless_present = "bus")]
        destination: Option<String>,
        /// Address the token to the shared bus audience
        #[arg(long, conflicts_with = "destination")]
        bus: bool,
        /// Print the token as a message header line
        #[arg(long)]
        header: bool,
    },
    /// Validate a token against the bus policy and print its claims
    Verify {
        /// Token text, or `-` to read it from stdin
        token: String,
    },
    /// Print a random base64 secret for MESSAGING_TOKEN_SECRET
    Keygen {
        /// Secret length in bytes
        #[arg(long, default_value_t = MIN_RECOMMENDED_KEY_LEN)]
        bytes: usize,
    },
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Keygen { bytes } => keygen(bytes),
        Command::Issue {
            destination,
            bus,
            header,
        } => issue(&load_config()?, destination.as_deref(), bus, header),
        Command::Verify { token } => verify(&load_config()?, token),
    }
}

fn keygen(len: usize) -> anyhow::Result<()> {
    ensure!(
        len >= MIN_RECOMMENDED_KEY_LEN,
        "secret must be at least {MIN_RECOMMENDED_KEY_LEN} bytes"
    );
    let mut secret = zeroize::Zeroizing::new(vec![0u8; len]);
    rand::thread_rng().fill_bytes(&mut secret);
    println!("{}", base64::engine::general_purpose::STANDARD.encode(secret.as_slice()));
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;
    observability::init_tracing(&config.log).context("Failed to initialize tracing")?;

    info!(service = %config.service_name, "Starting messaging-token");
    Ok(config)
}

fn issue(config: &Config, destination: Option<&str>, bus: bool, header: bool) -> anyhow::Result<()> {
    let factory = config.issuance()?;
    let token = match (bus, destination) {
        (true, _) => factory.create_for_bus()?,
        (false, Some(destination)) => factory.create_for(destination)?,
        (false, None) => bail!("a destination service or --bus is required"),
    };
    if header {
        println!("{MESSAGING_TOKEN_HEADER}: {token}");
    } else {
        println!("{token}");
    }
    Ok(())
}

fn verify(config: &Config, token: String) -> anyhow::Result<()> {
    let token = if token == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("Failed to read token from stdin")?;
        buf
    } else {
        token
    };
    let claims = config.validation()?.validate(token.trim())?;
    println!("{}", serde_json::to_string_pretty(&claims)?);
    Ok(())
}
