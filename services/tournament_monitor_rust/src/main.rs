use anyhow::{anyhow, Context, Result};
use dotenv::dotenv;
use matchplay_rust_core::clients::MatchPlayClient;
use matchplay_rust_core::config::{load_config, DEFAULT_CONFIG_PATH};
use matchplay_rust_core::notify::SlackNotifier;
use matchplay_rust_core::utils::extract_tournament_id;
use pico_args::Arguments;
use std::env;
use std::path::PathBuf;
use tournament_monitor_rust::logging::{init_logging, DEFAULT_LOG_DIR};
use tournament_monitor_rust::TournamentMonitor;
use tracing::{error, info, warn};

const HELP: &str = "\
Watch a MatchPlay Events tournament and post updates to Slack

USAGE:
  tournament_monitor [OPTIONS] <TOURNAMENT_URL>

ARGS:
  <TOURNAMENT_URL>         e.g. https://app.matchplay.events/tournaments/12345

OPTIONS:
  --config      PATH       JSON config file             [default: config.json]
  --webhook-url URL        Slack incoming webhook       [default: env SLACK_WEBHOOK_URL]
  --api-token   TOKEN      MatchPlay API token          [default: env MATCHPLAY_API_TOKEN]
  --log-dir     DIR        Directory for the log file   [default: logs]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SLACK_WEBHOOK_URL        Slack incoming webhook URL
  MATCHPLAY_API_TOKEN      MatchPlay API token (optional)
  RUST_LOG                 Log filter (default: info)
";

struct Args {
    tournament_url: String,
    config_path: PathBuf,
    webhook_url: Option<String>,
    api_token: Option<String>,
    log_dir: PathBuf,
}

fn parse_args(mut pargs: Arguments) -> Result<Args> {
    let config_path = pargs
        .opt_value_from_str("--config")?
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let webhook_url: Option<String> = pargs.opt_value_from_str("--webhook-url")?;
    let api_token: Option<String> = pargs.opt_value_from_str("--api-token")?;
    let log_dir = pargs
        .opt_value_from_str("--log-dir")?
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
    let tournament_url: String = pargs
        .free_from_str()
        .context("missing <TOURNAMENT_URL> (see --help)")?;

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        return Err(anyhow!("unexpected arguments: {:?}", remaining));
    }

    Ok(Args {
        tournament_url,
        config_path,
        webhook_url,
        api_token,
        log_dir,
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }
    let args = parse_args(pargs)?;

    let log_path = init_logging(&args.log_dir)?;
    info!("Starting MatchPlay tournament monitor (log file: {})", log_path.display());

    let Some(tournament_id) = extract_tournament_id(&args.tournament_url) else {
        error!("Could not extract tournament id from {}", args.tournament_url);
        return Err(anyhow!(
            "could not extract a tournament id from {:?} (expected .../tournaments/<id>/...)",
            args.tournament_url
        ));
    };

    let config = load_config(&args.config_path);
    info!(
        "Config: poll={}s standings={}m top_n={} api={}",
        config.api.poll_interval_seconds,
        config.notifications.standings_update_interval_minutes,
        config.notifications.standings_top_n,
        config.api.base_url
    );

    let webhook_url = args
        .webhook_url
        .or_else(|| non_empty_env("SLACK_WEBHOOK_URL"))
        .context("SLACK_WEBHOOK_URL must be set (or pass --webhook-url)")?;
    let api_token = args
        .api_token
        .or_else(|| non_empty_env("MATCHPLAY_API_TOKEN"));
    if api_token.is_none() {
        warn!("MATCHPLAY_API_TOKEN not set; using unauthenticated API access");
    }

    let api = MatchPlayClient::from_config(&config, api_token);
    let notifier = SlackNotifier::from_config(webhook_url, &config);
    let mut monitor = TournamentMonitor::new(api, notifier, tournament_id, &config);

    tokio::select! {
        result = monitor.run() => {
            result.with_context(|| format!("monitoring tournament {} failed", tournament_id))?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted; shutting down");
        }
    }

    Ok(())
}
