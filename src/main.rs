use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use url::Url;

use cluster_egress::cluster::{load_snapshot, ClusterCaches, SnapshotWatcher};
use cluster_egress::config::{load_config, EgressConfig};
use cluster_egress::egress::{user_agent, EgressResolver, TransportConfig, TrustBundleSource};
use cluster_egress::lifecycle::{shutdown_on_signal, Shutdown};
use cluster_egress::observability::init_logging;
use cluster_egress::EgressController;

#[derive(Parser)]
#[command(name = "cluster-egress")]
#[command(about = "Derive outbound proxy and CA trust settings from cluster state", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Cluster snapshot (JSON List of Proxy and ConfigMap objects).
    #[arg(short, long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the transport and print a summary
    Transport {
        /// CA ConfigMap in the config namespace (default: managed bundle)
        #[arg(long)]
        ca_config_map: Option<String>,
    },
    /// Print the proxy chosen for a URL, DIRECT, or ENVIRONMENT without a cluster policy
    Resolve {
        url: Url,
        #[arg(long)]
        ca_config_map: Option<String>,
    },
    /// Print the User-Agent sent on outgoing requests
    UserAgent,
    /// Rebuild the transport whenever the snapshot changes
    Watch {
        #[arg(long)]
        ca_config_map: Option<String>,
    },
}

#[derive(Serialize)]
struct TransportSummary {
    source: String,
    user_agent: String,
    http_proxy: Option<String>,
    https_proxy: Option<String>,
    trusted_certificates: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TransportSummary {
    fn new(source: &TrustBundleSource, transport: &TransportConfig) -> Self {
        let proxy = transport.proxy();
        Self {
            source: source.to_string(),
            user_agent: user_agent(),
            http_proxy: proxy.and_then(|p| p.http_proxy()).map(ToString::to_string),
            https_proxy: proxy.and_then(|p| p.https_proxy()).map(ToString::to_string),
            trusted_certificates: transport.root_trust().map(|t| t.len()),
            error: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EgressConfig::default(),
    };
    init_logging(&config.observability.log_level)?;

    let snapshot_path = cli
        .snapshot
        .clone()
        .or_else(|| config.cluster.snapshot_path.as_ref().map(PathBuf::from));

    match cli.command {
        Commands::UserAgent => {
            println!("{}", user_agent());
        }
        Commands::Transport { ca_config_map } => {
            let source = trust_source(ca_config_map, &config);
            let resolver = load_resolver(snapshot_path.as_deref(), &config)?;

            let outcome = resolver.build_transport(&source);
            let mut summary = TransportSummary::new(&source, &outcome.transport);
            summary.error = outcome.error.as_ref().map(ToString::to_string);
            println!("{}", serde_json::to_string_pretty(&summary)?);

            outcome.into_result()?;
        }
        Commands::Resolve { url, ca_config_map } => {
            let source = trust_source(ca_config_map, &config);
            let resolver = load_resolver(snapshot_path.as_deref(), &config)?;

            let (transport, error) = resolver.build_transport(&source).into_parts();
            if let Some(e) = error {
                // Without a proxy function the failure may have been the proxy lookup itself.
                if transport.proxy().is_none() {
                    resolver.resolve_proxy_policy()?;
                }
                tracing::warn!(source = %source, error = %e, "Trust bundle unusable, reporting proxy selection only");
            }
            println!("{}", transport.route_for(&url));
        }
        Commands::Watch { ca_config_map } => {
            let source = trust_source(ca_config_map, &config);
            let path = snapshot_path.ok_or("watch requires --snapshot or cluster.snapshot_path")?;
            watch(&path, source, &config).await?;
        }
    }

    Ok(())
}

fn trust_source(flag: Option<String>, config: &EgressConfig) -> TrustBundleSource {
    let name = flag.or_else(|| config.trust.ca_config_map.clone());
    TrustBundleSource::from_name(name.as_deref().unwrap_or(""))
}

fn load_resolver(
    snapshot_path: Option<&Path>,
    config: &EgressConfig,
) -> Result<EgressResolver, Box<dyn std::error::Error>> {
    let path = snapshot_path.ok_or("no cluster snapshot: pass --snapshot or set cluster.snapshot_path")?;
    let caches = ClusterCaches::new(&config.namespaces);
    load_snapshot(path)?.apply(&caches);
    Ok(EgressResolver::from_caches(&caches, config.namespaces.clone()))
}

async fn watch(
    path: &Path,
    source: TrustBundleSource,
    config: &EgressConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = EgressController::new(
        ClusterCaches::new(&config.namespaces),
        config.namespaces.clone(),
        source,
    );

    match load_snapshot(path) {
        Ok(snapshot) => {
            let _ = controller.apply_snapshot(&snapshot);
        }
        Err(e) => tracing::warn!(path = ?path, error = %e, "Initial snapshot load failed"),
    }

    let (watcher, updates) =
        SnapshotWatcher::new(path, Duration::from_secs(config.cluster.poll_interval_secs));
    let _watcher = watcher.run()?;

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    controller.run(updates, shutdown.subscribe()).await;
    tracing::info!("cluster-egress stopped");
    Ok(())
}
