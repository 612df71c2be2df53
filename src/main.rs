// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym client command-line front end.
//!
//! Drives the session manager against a running gym backend. Results go
//! to stdout as JSON; logs go to stderr.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gym_client::{
    auth::{FileCredentialStore, SessionManager},
    config::Config,
    models::ProfileCompletion,
    services::ApiClient,
};
use reqwest::Url;
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "gym-client",
    about = "Gym management backend client",
    after_help = "Backends with CSRF protection disabled need GYM_CSRF_STRATEGIES=none, \
                  otherwise every create, update and delete fails."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with username and password
    Login {
        username: String,
        #[arg(long, env = "GYM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Finish a Google sign-in from the URL the backend redirected to.
    ///
    /// New users can complete (or `--skip`) their profile in the same step.
    Oauth {
        redirect_url: String,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Print the URL that starts Google sign-in
    GoogleUrl,
    /// Forget the stored credential token
    Logout,
    /// Show the current identity
    Whoami,
    /// Show the full account record of the current identity
    Profile,
    /// Complete (or skip) the new-member profile.
    ///
    /// The new-user flag only travels in the OAuth redirect, so pass the
    /// redirect URL again when completing in a later invocation.
    CompleteProfile {
        #[arg(long)]
        redirect_url: Option<String>,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// List accounts of one kind
    List { kind: AccountKind },
    /// List the members assigned to a trainer
    Trainees { trainer_id: i64 },
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    trainer_id: Option<i64>,
    /// Submit the profile with every field empty
    #[arg(long, conflicts_with_all = ["phone", "gender", "trainer_id"])]
    skip: bool,
}

impl ProfileArgs {
    fn requested(&self) -> bool {
        self.skip || self.phone.is_some() || self.gender.is_some() || self.trainer_id.is_some()
    }

    fn into_completion(self) -> ProfileCompletion {
        if self.skip {
            return ProfileCompletion::skip();
        }
        ProfileCompletion {
            phone_number: self.phone,
            gender: self.gender,
            trainer_id: self.trainer_id,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AccountKind {
    Admins,
    Trainers,
    Members,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api_url = %config.api_url, "Configuration loaded");

    let api = Arc::new(ApiClient::new(&config)?);
    let store = Arc::new(FileCredentialStore::new(&config.credential_path));
    let mut session = SessionManager::new(api.clone(), store);

    // Only an OAuth hand-off carries a location to inspect.
    let redirect_url = match &cli.command {
        Command::Oauth { redirect_url, .. } => Some(redirect_url.as_str()),
        Command::CompleteProfile { redirect_url, .. } => redirect_url.as_deref(),
        _ => None,
    };
    let mut location = redirect_url
        .map(|url| Url::parse(url).context("Invalid redirect URL"))
        .transpose()?;
    session.initialize(location.as_mut()).await;

    run(cli.command, &mut session, &api, location).await
}

async fn run(
    command: Command,
    session: &mut SessionManager,
    api: &ApiClient,
    location: Option<Url>,
) -> anyhow::Result<()> {
    match command {
        Command::Oauth { profile, .. } => {
            if profile.requested() && session.needs_profile_completion() {
                complete_profile(session, api, profile).await?;
            }
            print_json(&serde_json::json!({
                "identity": session.identity(),
                "needs_profile_completion": session.needs_profile_completion(),
                "location": location.as_ref().map(Url::as_str),
            }))?
        }
        Command::Login { username, password } => {
            let identity = session.login(&username, &password).await?;
            print_json(&identity)?;
        }
        Command::GoogleUrl => println!("{}", api.google_login_url()),
        Command::Logout => session.logout().await,
        Command::Whoami => print_json(&serde_json::json!({
            "identity": session.identity(),
            "needs_profile_completion": session.needs_profile_completion(),
        }))?,
        Command::Profile => match api.resolve_current_record().await? {
            Some(record) => print_json(&record)?,
            None => anyhow::bail!("No account record found for the current identity"),
        },
        Command::CompleteProfile { profile, .. } => {
            if session.is_authenticated() && !session.needs_profile_completion() {
                anyhow::bail!(
                    "No profile completion pending; pass --redirect-url with the OAuth redirect"
                );
            }
            complete_profile(session, api, profile).await?;
        }
        Command::List { kind } => match kind {
            AccountKind::Admins => print_json(&api.list_admins().await?)?,
            AccountKind::Trainers => print_json(&api.list_trainers().await?)?,
            AccountKind::Members => print_json(&api.list_members().await?)?,
        },
        Command::Trainees { trainer_id } => {
            print_json(&api.list_members_by_trainer(trainer_id).await?)?
        }
    }
    Ok(())
}

async fn complete_profile(
    session: &mut SessionManager,
    api: &ApiClient,
    profile: ProfileArgs,
) -> anyhow::Result<()> {
    if let Some(id) = profile.trainer_id {
        if !api.trainer_exists(id).await {
            anyhow::bail!("Trainer {} does not exist", id);
        }
    }
    session.complete_profile(&profile.into_completion()).await?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gym_client=debug,info")),
        )
        .with(format)
        .init();
}
