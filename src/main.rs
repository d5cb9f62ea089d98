//! Binary entrypoint for the photo cycler.
//!
//! Run with: photo-cycler <PHOTOS_PATH> <STATIC_PATH>
//!
//! Then test with:
//!   curl http://localhost:8888/properties
//!   curl -X PUT -H 'Content-Type: application/json' \
//!        -d '{"updateRate": 10}' http://localhost:8888/properties/updateRate

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use photo_cycler::{axum_ext, Config, PhotoCycler};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Web Thing that cycles a random photo onto /static/current.jpg
#[derive(Debug, Parser)]
#[command(name = "photo-cycler", version, about)]
struct Cli {
    /// Directory containing the photos to cycle through
    #[arg(value_name = "PHOTOS_PATH", required_unless_present = "config")]
    photos_path: Option<PathBuf>,

    /// Directory served under /static; receives the current.jpg link
    #[arg(value_name = "STATIC_PATH", required_unless_present = "config")]
    static_path: Option<PathBuf>,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Initial update rate in seconds
    #[arg(long, value_name = "SECONDS")]
    update_rate: Option<f64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// File values first, then command line overrides.
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(path) = self.photos_path {
            config.photos_path = path;
        }
        if let Some(path) = self.static_path {
            config.static_path = path;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(rate) = self.update_rate {
            config.update_rate = rate;
        }
        Ok(config)
    }
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("photo_cycler={}", level).parse()?)
        .add_directive(format!("tower_http={}", level).parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    // Nothing is started until both directories check out
    let config = cli
        .into_config()?
        .validate()
        .context("validating configuration")?;

    let device = Arc::new(PhotoCycler::initialize(&config)?);
    let app = axum_ext::router(device.clone(), &config.static_path);

    let addr = SocketAddr::new(
        config
            .bind_address
            .parse()
            .with_context(|| format!("invalid bind address '{}'", config.bind_address))?,
        config.port,
    );
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "photo cycler listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")?;

    device.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut term) = signal(SignalKind::terminate()) {
            term.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
