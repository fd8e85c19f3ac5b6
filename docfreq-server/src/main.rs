//! docfreq server binary
//!
//! Serves the document submission API and runs the worker subscription.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use docfreq_config::{BackendKind, ConfigLoader, DocfreqConfig};
use docfreq_server::Server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server bind address, as host:port
    #[arg(short, long)]
    bind: Option<String>,

    /// Queue and cache backend
    #[arg(long, value_parser = ["memory", "redis"])]
    backend: Option<String>,

    /// Redis connection URL
    #[arg(long)]
    redis_url: Option<String>,

    /// Serve the API only, without processing jobs
    #[arg(long)]
    no_worker: bool,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Print default configuration if requested
    if cli.print_config {
        println!("{}", DocfreqConfig::generate_sample());
        return Ok(());
    }

    // Load configuration
    let mut config = ConfigLoader::new().load(cli.config.as_ref())?;

    // Override with CLI arguments
    apply_cli_overrides(&mut config, &cli)?;
    config.validate_all()?;

    // Create and start server
    let server = Server::new(config).await?;
    server.start().await
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut DocfreqConfig, cli: &Cli) -> Result<()> {
    if let Some(bind) = &cli.bind {
        let (host, port) = bind
            .rsplit_once(':')
            .ok_or_else(|| anyhow::anyhow!("Invalid bind address '{}': expected host:port", bind))?;
        config.server.bind_address = host.to_string();
        config.server.port = port
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", bind, e))?;
    }

    if let Some(backend) = &cli.backend {
        config.backend.kind = backend
            .parse::<BackendKind>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }

    if let Some(url) = &cli.redis_url {
        config.backend.redis_url = url.clone();
    }

    if cli.no_worker {
        config.worker.enabled = false;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "docfreq-server",
            "--bind",
            "0.0.0.0:9000",
            "--backend",
            "redis",
            "--redis-url",
            "redis://cache:6379",
            "--no-worker",
        ]);
        let mut config = DocfreqConfig::default();
        apply_cli_overrides(&mut config, &cli).unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.backend.kind, BackendKind::Redis);
        assert_eq!(config.backend.redis_url, "redis://cache:6379");
        assert!(!config.worker.enabled);
    }

    #[test]
    fn test_bad_bind_address() {
        let cli = Cli::parse_from(["docfreq-server", "--bind", "localhost"]);
        assert!(apply_cli_overrides(&mut DocfreqConfig::default(), &cli).is_err());
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let cli = Cli::parse_from(["docfreq-server"]);
        let mut config = DocfreqConfig::default();
        apply_cli_overrides(&mut config, &cli).unwrap();
        assert_eq!(config.server.socket_address(), "127.0.0.1:8080");
        assert!(config.worker.enabled);
    }
}
