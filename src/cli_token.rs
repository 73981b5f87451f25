//! Offline helper for scripted uploads: mints or checks upload tokens using
//! the same `JWT_SECRET` the server reads.

use anyhow::{anyhow, Result};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};

use portfolio_server::auth::Credentials;
use portfolio_server::config::Secrets;

#[derive(Parser, Debug)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints a new upload token valid for 30 days.
    Mint,

    /// Checks a token and prints its expiry.
    Verify { token: String },
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let secrets = Secrets::from_env();
    let credentials = Credentials::new(secrets.upload_password, secrets.jwt_secret);

    match args.command {
        Command::Mint => {
            let issued = credentials
                .mint_token(Utc::now())
                .map_err(|e| anyhow!("Cannot mint token: {}", e))?;
            println!("{}", issued.token);
            eprintln!("expires in {}", issued.expires_in);
        }
        Command::Verify { token } => {
            let claims = credentials
                .verify_token(&token)
                .map_err(|e| anyhow!("Token rejected: {}", e))?;
            let expires = Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| claims.exp.to_string());
            println!("valid, expires {}", expires);
        }
    }
    Ok(())
}
