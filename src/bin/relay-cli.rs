use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use contact_relay::config::loader::ENV_JWT_SECRET;
use contact_relay::config::SigningConfig;
use contact_relay::signing::CredentialMinter;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the contact relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the relay is up
    Health,
    /// Send a contact submission through the relay
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Send privacyConsent = false
        #[arg(long)]
        no_consent: bool,
    },
    /// Mint a credential locally, for testing the webhook's JWT check
    Token {
        #[arg(long, env = ENV_JWT_SECRET, hide_env_values = true)]
        secret: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Submit {
            name,
            email,
            subject,
            message,
            company,
            phone,
            no_consent,
        } => {
            let body = json!({
                "name": name,
                "email": email,
                "subject": subject,
                "message": message,
                "company": company,
                "phone": phone,
                "privacyConsent": !no_consent,
                "userAgent": format!("relay-cli/{}", env!("CARGO_PKG_VERSION")),
            });
            let res = client
                .post(format!("{}/contact", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Token { secret } => {
            let minter = CredentialMinter::new(&SigningConfig {
                secret,
                ..Default::default()
            })?;
            let credential = minter.mint()?;
            println!("{}", credential.token());
            eprintln!(
                "iat={} exp={}",
                credential.claims.iat, credential.claims.exp
            );
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(retry_after) = res.headers().get("retry-after") {
        eprintln!("Retry-After: {}", retry_after.to_str().unwrap_or("?"));
    }

    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
