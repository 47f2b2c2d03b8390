use clap::Parser;

use evm_balances::config::AppConfig;
use evm_balances::networks::ReportTarget;
use evm_balances::services::BalanceService;

/// Report native and stablecoin balances for a wallet list on EVM chains.
#[derive(Debug, Parser)]
#[command(name = "evm-balances", version)]
struct Cli {
    /// Chain name (ETH, Arbitrum, opBNB, ...) or `all`. Defaults to ETH.
    chain: Option<String>,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    init_tracing(config.debug, config.log_json);

    let target = ReportTarget::parse(cli.chain.as_deref())?;
    tracing::info!(
        target = target.name(),
        wallets = %config.wallets_path.display(),
        "Loading native prices..."
    );

    let mut service = BalanceService::connect(&config, target).await?;

    if cli.json {
        let report = service.fetch_and_save(target).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let path = service.fetch_print_and_save(target).await?;
        tracing::info!(path = %path.display(), "Report complete");
    }

    Ok(())
}

fn init_tracing(debug: bool, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let default_filter = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Logs go to stderr so `--json` output on stdout stays parseable.
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}
