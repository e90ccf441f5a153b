mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use riskbird_http::{HttpClient, HttpClientBuilder};
use riskbird_user::UserAccountClient;
use riskbird_user_sdk::{
    ApiEnvelope, BalanceUpdateRequest, PointAmountChange, PointUpdateRequest, UserAccountClientV1,
};

use crate::config::{AppConfig, CliOverrides};

/// RiskBird admin - adjust user balances and points
#[derive(Parser)]
#[command(name = "riskbird-admin")]
#[command(about = "RiskBird admin - adjust user balances and points")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout, e.g. `10s` (overrides config)
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Session token sent as `x-token` (overrides config)
    #[arg(long)]
    token: Option<String>,

    /// User id sent as `x-user-id` (overrides config)
    #[arg(long)]
    user_id: Option<String>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Change a user's balance
    Balance(BalanceArgs),
    /// Change a user's points
    Point(PointArgs),
    /// Validate configuration and exit
    Check,
}

#[derive(Args)]
struct BalanceArgs {
    #[arg(long)]
    phone: String,

    #[arg(long)]
    password: String,

    /// Recharge amount, at most two decimals
    #[arg(long, allow_hyphen_values = true)]
    recharge: serde_json::Number,

    /// Gift amount, at most two decimals
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    gift: serde_json::Number,

    /// Send even if the backend would reject the request
    #[arg(long)]
    skip_validation: bool,
}

#[derive(Args)]
struct PointArgs {
    #[arg(long, required_unless_present = "body")]
    phone: Option<String>,

    #[arg(long, required_unless_present = "body")]
    password: Option<String>,

    /// Point amount, a multiple of 5
    #[arg(long, required_unless_present = "body", allow_negative_numbers = true)]
    points: Option<i64>,

    /// Raw JSON object sent as-is instead of the typed fields
    #[arg(long, conflicts_with_all = ["phone", "password", "points"])]
    body: Option<String>,

    /// Send even if the backend would reject the request
    #[arg(long)]
    skip_validation: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (RISKBIRD__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides {
        base_url: cli.base_url,
        timeout: cli.timeout,
        token: cli.token,
        user_id: cli.user_id,
        verbose: cli.verbose,
    });

    logging::init(&config.logging)?;

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_config(&config),
        Commands::Balance(args) => {
            let accounts = connect(&config)?;
            let request =
                BalanceUpdateRequest::new(args.phone, args.password, args.recharge, args.gift);
            if !args.skip_validation {
                request.validate().context("refusing to send balance update")?;
            }
            let reply = accounts
                .modify_user_balance(request)
                .await
                .context("balance update failed")?;
            report(&reply)
        }
        Commands::Point(args) => {
            let accounts = connect(&config)?;
            let request = point_request(args)?;
            let reply = accounts
                .modify_user_point(request)
                .await
                .context("point update failed")?;
            report(&reply)
        }
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("checking configuration");
    if config.transport.base_url.is_none() {
        anyhow::bail!("transport.base_url is not configured");
    }
    build_client(config)?;
    println!("Configuration is valid");
    Ok(())
}

fn build_client(config: &AppConfig) -> Result<HttpClient> {
    HttpClientBuilder::with_config(config.transport.clone())
        .and_then(HttpClientBuilder::build)
        .context("failed to build HTTP client")
}

fn connect(config: &AppConfig) -> Result<Arc<dyn UserAccountClientV1>> {
    let client = build_client(config)?;
    Ok(Arc::new(UserAccountClient::new(Arc::new(client))))
}

fn point_request(args: PointArgs) -> Result<PointUpdateRequest> {
    if let Some(raw) = args.body {
        let value: serde_json::Value =
            serde_json::from_str(&raw).context("--body is not valid JSON")?;
        if !value.is_object() {
            anyhow::bail!("--body must be a JSON object");
        }
        return Ok(value.into());
    }

    let change = PointAmountChange::new(
        args.phone.unwrap_or_default(),
        args.password.unwrap_or_default(),
        args.points.unwrap_or_default(),
    );
    if !args.skip_validation {
        change.validate().context("refusing to send point update")?;
    }
    Ok(change.into())
}

/// Print the backend's reply and fail unless its envelope reports success.
fn report(reply: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(reply)?);

    match ApiEnvelope::from_value(reply) {
        Ok(envelope) if envelope.is_success() => Ok(()),
        Ok(envelope) => anyhow::bail!(
            "backend rejected the request (code {}): {}",
            envelope.code,
            envelope.msg
        ),
        Err(_) => {
            tracing::warn!("response body is not a standard envelope");
            Ok(())
        }
    }
}
