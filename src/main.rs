// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use enerdit_client::audit::{AuditDraft, ChartData};
use enerdit_client::auth::{LoginForm, SignupForm};
use enerdit_client::{logging, ApiError, ClientConfig, EnerditClient, UserAction};

#[derive(Parser, Debug)]
#[command(name = "enerdit")]
#[command(version, about = "Command-line client for the Enerdit energy audit API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ENERDIT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account; a verification link is mailed afterwards
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ENERDIT_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Verify an email address from the link's query string (`?token=...`)
    VerifyEmail { search: String },
    /// Print the Google consent URL
    GoogleUrl,
    /// Finish Google sign-in from the callback URL
    GoogleCallback { location: String },
    /// Restore the stored session and print it
    Status,
    /// Forget the stored session
    Logout,
    /// Submit an audit draft (JSON) and print the report
    Audit { draft: PathBuf },
}

impl Command {
    fn action(&self) -> Option<UserAction> {
        match self {
            Command::Login { .. } => Some(UserAction::Login),
            Command::Signup { .. } => Some(UserAction::Signup),
            Command::VerifyEmail { .. } => Some(UserAction::VerifyEmail),
            Command::GoogleUrl | Command::GoogleCallback { .. } => Some(UserAction::GoogleLogin),
            Command::Audit { .. } => Some(UserAction::GenerateReport),
            Command::Status | Command::Logout => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let action = cli.command.action();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            match (err.downcast_ref::<ApiError>(), action) {
                (Some(api_err), Some(action)) => eprintln!("{}", api_err.user_message(action)),
                _ => eprintln!("{err}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let client = EnerditClient::from_config(ClientConfig::from_env()?)?;

    match command {
        Command::Login { email, password } => {
            let session = client.login(&LoginForm::new(email, password)).await?;
            print_json(&session)?;
        }
        Command::Signup {
            name,
            email,
            password,
            confirm_password,
        } => {
            let form = SignupForm {
                name,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
            };
            client.signup(&form).await?;
            println!("Signup successful! Please check your email to verify your account.");
        }
        Command::VerifyEmail { search } => {
            client.verify_email(&search).await?;
            println!("Email verified successfully! You can now log in.");
        }
        Command::GoogleUrl => println!("{}", client.google_authorization_url()?),
        Command::GoogleCallback { location } => {
            let session = client.complete_google_login(&location).await?;
            print_json(&session)?;
        }
        Command::Status => {
            let session = client.restore().await;
            print_json(&session)?;
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out.");
        }
        Command::Audit { draft } => {
            let draft: AuditDraft = serde_json::from_reader(BufReader::new(File::open(&draft)?))?;
            client.restore().await;
            let report = client.generate_audit_report(&draft).await?;
            print!("{}", report.summary());
            print_json(&ChartData::from_report(&report))?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
