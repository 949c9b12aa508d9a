use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use php_fpm_exporter::args::Args;
use php_fpm_exporter::logging::init_logging;
use php_fpm_exporter::{FastCgiClient, build_registry, load_config, server};

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_file.as_deref())?;

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return Err(e);
        }
    };

    let timeout = args.fcgi_timeout().or(config.fcgi_timeout);
    match timeout {
        Some(t) => info!("FastCGI timeout: {:?}", t),
        None => info!("FastCGI timeout: none"),
    }

    let transport = Arc::new(FastCgiClient::new(timeout));
    let registry = build_registry(&config, transport)?;
    info!("Exporting {} pool(s)", config.pools.len());

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(args, registry))
}

async fn run(args: Args, registry: prometheus::Registry) -> Result<()> {
    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    info!(
        "Serving metrics on http://{}{}",
        args.listen, args.metrics_path
    );

    server::serve(listener, server::router(registry, &args.metrics_path)).await?;
    info!("Shutdown complete");
    Ok(())
}
