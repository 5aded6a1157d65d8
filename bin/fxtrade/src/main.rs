use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{redact, AppConfig, Market};
use engine::{BitflyerClient, Driver, LiveMarket, Trader, DEFAULT_THRESHOLD};
use mock::MockMarket;

/// Automated FX trader for bitFlyer Lightning.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("market").args(["mock", "bitflyer"])))]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension).
    config: PathBuf,

    /// Trade against the mock market (default). Accepted so existing command
    /// lines keep working; only its exclusion with `--bitflyer` is checked.
    #[arg(long)]
    mock: bool,

    /// Trade against bitFlyer.
    #[arg(long)]
    bitflyer: bool,

    /// Minimum |differential| before a deal is made.
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Seconds to wait between cycles.
    #[arg(short, long, default_value = "1", value_parser = parse_wait)]
    wait: Duration,

    /// Log at debug level.
    #[arg(short, long)]
    verbosity: bool,

    /// Compute and log every deal without submitting it.
    #[arg(long)]
    dryrun: bool,
}

fn parse_wait(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("not a number: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid wait: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging ──────────────────────────────────────────────────────────────
    let level = if cli.verbosity { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    // ── Config ───────────────────────────────────────────────────────────────
    let cfg = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    info!(
        config = %cli.config.display(),
        threshold = cli.threshold,
        wait_ms = cli.wait.as_millis() as u64,
        dry_run = cli.dryrun,
        "fxtrade starting"
    );

    // ── Market ───────────────────────────────────────────────────────────────
    let market: Box<dyn Market> = if cli.bitflyer {
        let exchange = cfg.exchange()?;
        if exchange.key.is_empty() || exchange.secret.is_empty() {
            if !cli.dryrun {
                bail!("bitFlyer key and secret are required; set BITFLYER_API_KEY and BITFLYER_API_SECRET");
            }
            warn!("no bitFlyer credentials, private endpoints will be rejected");
        }
        info!(key = %redact(&exchange.key), "using bitFlyer market");
        let client = BitflyerClient::new(exchange)?;
        Box::new(LiveMarket::new(client, exchange, cli.dryrun))
    } else {
        info!("using mock market");
        Box::new(MockMarket::new(&cfg.mock, cli.dryrun))
    };

    // ── Shutdown ─────────────────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for ctrl-c, stop the process to exit");
                std::future::pending::<()>().await;
            }
        }
    });

    // ── Run ──────────────────────────────────────────────────────────────────
    let trader = Trader::new(market, cli.threshold);
    let cycles = Driver::new(trader, cli.wait).run(shutdown_rx).await;
    info!(cycles, "fxtrade stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["fxtrade", "config.toml"]).unwrap();
        assert!(!cli.bitflyer);
        assert!(!cli.dryrun);
        assert_eq!(cli.threshold, 0.1);
        assert_eq!(cli.wait, Duration::from_secs(1));
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "fxtrade", "config.json", "--bitflyer", "-t", "0.3", "-w", "2.5", "-v", "--dryrun",
        ])
        .unwrap();
        assert!(cli.bitflyer);
        assert!(cli.verbosity);
        assert!(cli.dryrun);
        assert_eq!(cli.threshold, 0.3);
        assert_eq!(cli.wait, Duration::from_millis(2_500));
    }

    #[test]
    fn explicit_mock_flag_selects_the_mock_market() {
        let cli = Cli::try_parse_from(["fxtrade", "c.toml", "--mock"]).unwrap();
        assert!(cli.mock);
        assert!(!cli.bitflyer);
    }

    #[test]
    fn mock_and_bitflyer_are_exclusive() {
        assert!(Cli::try_parse_from(["fxtrade", "c.toml", "--mock", "--bitflyer"]).is_err());
    }

    #[test]
    fn negative_wait_is_rejected() {
        assert!(Cli::try_parse_from(["fxtrade", "c.toml", "-w", "-1"]).is_err());
        assert!(Cli::try_parse_from(["fxtrade", "c.toml", "-w", "soon"]).is_err());
    }
}
