use clap::Parser;
use std::net::SocketAddr;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use witness_health_monitor::config::{MonitorConfig, Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "witness-health-monitor")]
#[command(about = "Witness node health monitor")]
struct Args {
    /// Witness node's websocket address
    #[arg(long)]
    node: Option<String>,

    /// Witness node's account name
    #[arg(long)]
    account: Option<String>,

    /// Timeout of witness node checking (sec)
    #[arg(long = "checking_timeout")]
    checking_timeout: Option<u64>,

    /// Symbol of the chain the node must serve
    #[arg(long)]
    chain: Option<String>,

    /// Consecutive transient node errors tolerated before giving up
    #[arg(long = "max_retries")]
    max_retries: Option<u32>,

    /// Serve /health, /status and /metrics on this address
    #[arg(long = "status_addr")]
    status_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "witness_health_monitor=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load settings: {}", e);
            return ExitCode::from(2);
        }
    };
    if args.status_addr.is_some() {
        settings.status_addr = args.status_addr;
    }

    let overrides = Overrides {
        node: args.node,
        account: args.account,
        checking_timeout: args.checking_timeout,
        chain: args.chain,
        max_retries: args.max_retries,
    };

    let config = match MonitorConfig::from_settings(&settings, overrides) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    match witness_health_monitor::start(&settings, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Monitor terminated: {}", e);
            ExitCode::FAILURE
        }
    }
}
