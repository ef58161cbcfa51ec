use clap::Parser;
use config::{ProxyConfig, ProxyConfigBuilder, SignerConfig};
use proxy::{
    metrics::install_prometheus_exporter, ports::write_ports_file, signers::load_signers,
    ProxyServer,
};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "signer-proxy", version, about = "Transaction signing JSON-RPC proxy")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chain id used for EIP-155 signatures
    #[arg(long)]
    chain_id: Option<u64>,

    /// Port to listen on, 0 picks a free port
    #[arg(long)]
    http_port: Option<u16>,

    /// URL of the node requests are forwarded to
    #[arg(long)]
    downstream_url: Option<String>,

    /// Hex private key to sign with, in addition to configured signers
    #[arg(long, env = "SIGNER_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,
}

impl Cli {
    /// Config file values with command line overrides applied.
    fn load_config(&self) -> eyre::Result<ProxyConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!(path = %path.display(), "Loading config");
                ProxyConfig::from_file(path)?
            }
            None => {
                let (Some(chain_id), Some(url)) = (self.chain_id, &self.downstream_url) else {
                    eyre::bail!("--chain-id and --downstream-url are required without --config");
                };
                ProxyConfigBuilder::new(chain_id, url.clone()).build()?
            }
        };

        if let Some(chain_id) = self.chain_id {
            config.chain_id = chain_id;
        }
        if let Some(port) = self.http_port {
            config.http.port = port;
        }
        if let Some(url) = &self.downstream_url {
            config.downstream.url = url.clone();
        }
        if let Some(key) = &self.private_key {
            config.signers.push(SignerConfig::PrivateKey(key.clone()));
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(config))
}

async fn run(config: ProxyConfig) -> eyre::Result<()> {
    info!("Starting signer proxy");

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Prometheus exporter listening");
    }

    let signers = load_signers(&config.signers)?;
    if signers.is_empty() {
        warn!("No signers configured, transactions cannot be signed");
    }

    let server = ProxyServer::new(&config, Arc::new(signers))?;

    let listener = TcpListener::bind((config.http.host.as_str(), config.http.port)).await?;
    let addr = listener.local_addr()?;

    info!("Loaded config:");
    info!("  Chain id: {}", config.chain_id);
    info!("  Downstream: {}", config.downstream.url);
    info!("  Mount path: {}", config.http.mount_path);
    info!(%addr, "Signer proxy listening");

    if let Some(data_path) = &config.data_path {
        write_ports_file(data_path, addr.port())?;
    }

    server.serve(listener, shutdown_signal()).await?;

    info!("Signer proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
