//! friday - chat service with a persisted rolling conversation log

mod config;
mod routes;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use friday_conversation::{ConversationFile, ConversationStore, StoreSettings};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::routes::AppState;

/// friday - chat service with a persisted rolling conversation log
#[derive(Parser, Debug)]
#[command(name = "friday")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: ~/.config/friday/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (default: 0.0.0.0)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (default: 8000)
    #[arg(short, long)]
    port: Option<u16>,

    /// Conversation log file (default: conversation_history.json)
    #[arg(long)]
    conversation_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "friday=debug,tower_http=debug"
    } else {
        "friday=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Apply command line overrides on top of the file configuration
fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(path) = &args.conversation_file {
        config.conversation_file = path.clone();
    }
    config
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config_path = args.config.clone().unwrap_or_else(Config::config_path);

    // Initialize config and exit
    if args.init_config {
        match Config::init(&config_path) {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let config = apply_overrides(Config::load_from(&config_path), &args);

    let store = ConversationStore::new(
        ConversationFile::new(&config.conversation_file),
        StoreSettings {
            system_prompt: config.system_prompt(),
        },
    );
    store.initialize(config.backend());
    tracing::info!(
        assistant = %config.assistant_name,
        backend = %store.backend_label(),
        model = %config.ollama_model,
        file = %config.conversation_file.display(),
        "AI systems initialized"
    );

    let address = config.bind_address();
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config),
    };
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_file() {
        let args = Args::parse_from([
            "friday",
            "--port",
            "9000",
            "--host",
            "127.0.0.1",
            "--conversation-file",
            "/tmp/friday.json",
        ]);
        let config = apply_overrides(Config::default(), &args);
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.conversation_file, PathBuf::from("/tmp/friday.json"));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let args = Args::parse_from(["friday"]);
        let config = apply_overrides(Config::default(), &args);
        assert_eq!(config.port, 8000);
        assert!(!args.init_config);
    }
}
