use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use ytdlp_proxy::{Config, ExecuteOutcome, Orchestrator, ProxyError, RunVerdict};

/// yt-dlp with best free proxy
///
/// Every argument not listed here is handed to yt-dlp unchanged.
#[derive(Parser)]
#[command(name = "ytdlp-proxy")]
#[command(about = "yt-dlp with best free proxy")]
struct Cli {
    /// Update best proxy list and exit
    #[arg(long)]
    update: bool,

    /// Print the saved proxy list and exit
    #[arg(long)]
    list_proxies: bool,

    /// Run yt-dlp once through this proxy (host:port or user:pass@host:port)
    #[arg(long, value_name = "CONN")]
    use_proxy: Option<String>,

    /// Ranked proxy list file
    #[arg(long, env = "YTDLP_PROXY_FILE", default_value = "proxy.json")]
    proxy_file: PathBuf,

    /// Path to the yt-dlp executable
    #[arg(long, env = "YTDLP_PATH")]
    ytdlp_path: Option<PathBuf>,

    /// Give up after this many proxies were tried
    #[arg(long, env = "YTDLP_PROXY_MAX_ATTEMPTS")]
    max_attempts: Option<usize>,

    /// Number of proxies tested at once
    #[arg(long, default_value_t = ytdlp_proxy::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Probe at most this many candidates during an update
    #[arg(long, env = "YTDLP_PROXY_MAX_CANDIDATES")]
    max_candidates: Option<usize>,

    /// MaxMind country database for proxies without a known country
    #[arg(long, env = "YTDLP_PROXY_MMDB")]
    mmdb: Option<PathBuf>,

    /// Arguments for yt-dlp
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ytdlp_proxy=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new()
        .with_proxy_file(cli.proxy_file.clone())
        .with_ytdlp_path(cli.ytdlp_path.clone())
        .with_max_attempts(cli.max_attempts)
        .with_concurrency(cli.concurrency)
        .with_max_candidates(cli.max_candidates)
        .with_mmdb_path(cli.mmdb.clone());
    let orchestrator = config.orchestrator()?;

    tokio::select! {
        result = run(&cli, &orchestrator) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("Canceled by user");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(cli: &Cli, orchestrator: &Orchestrator) -> Result<ExitCode> {
    if cli.update {
        orchestrator.update().await?;
        println!("All done.");
        return Ok(ExitCode::SUCCESS);
    }

    if cli.list_proxies {
        for proxy in orchestrator.store().load()? {
            println!("{} ({}s)", proxy.record.connection_string(), proxy.time);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(connection) = &cli.use_proxy {
        let verdict = orchestrator.execute_raw(connection, &cli.args).await?;
        return Ok(match verdict {
            RunVerdict::Success => ExitCode::SUCCESS,
            RunVerdict::Rejected => {
                error!("Proxy {} was rejected", connection);
                ExitCode::FAILURE
            }
            RunVerdict::Unavailable => unavailable(orchestrator),
        });
    }

    match orchestrator.execute(&cli.args).await {
        Ok(ExecuteOutcome::Success { .. }) => Ok(ExitCode::SUCCESS),
        Ok(ExecuteOutcome::ExhaustedRetries { attempts }) => {
            error!(
                "Giving up after {} attempts; run with --update for fresh proxies",
                attempts
            );
            Ok(ExitCode::FAILURE)
        }
        Ok(ExecuteOutcome::Unavailable) => Ok(unavailable(orchestrator)),
        Err(e @ ProxyError::NoProxiesAvailable(_)) => {
            error!("{}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn unavailable(orchestrator: &Orchestrator) -> ExitCode {
    let e = ProxyError::ExecutableUnavailable {
        program: orchestrator.runner().program().to_string(),
    };
    error!("{}", e);
    ExitCode::FAILURE
}
