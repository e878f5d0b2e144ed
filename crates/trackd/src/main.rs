// # trackd - Headless Parcel Tracking Client
//
// A thin integration layer over track-core:
// 1. Reads configuration from environment variables
// 2. Initializes the runtime and tracing
// 3. Builds the store, the HTTP resolver, and the carrier catalog
// 4. Runs a periodic stale-record refresh until SIGTERM/SIGINT
//
// No tracking logic lives here; it all belongs to track-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `TRACK_RESOLVER_URL`: Base URL of the tracking resolution service (required)
// - `TRACK_RESOLVER_TIMEOUT`: Resolver request timeout in seconds (default 30)
// - `TRACK_STORE_TYPE`: Store type, `file` or `memory` (default file)
// - `TRACK_STORE_PATH`: Path to the state file (required for file store)
// - `TRACK_STALE_AFTER_SECS`: Staleness threshold for batch refresh (default 900)
// - `TRACK_REFRESH_INTERVAL`: Seconds between refresh passes (default 300)
// - `TRACK_LANGUAGE`: Locale hint forwarded to the resolver (default en-US)
// - `TRACK_LOG_LEVEL`: trace|debug|info|warn|error (default info)
//
// ## Example
//
// ```bash
// export TRACK_RESOLVER_URL=https://tracker.example
// export TRACK_STORE_PATH=/var/lib/track/parcels.json
//
// trackd
// ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use track_core::{
    CarrierCatalog, EngineConfig, EngineEvent, FileParcelStore, MemoryParcelStore, ParcelStore,
    ResolverConfig, StoreConfig, SyncEngine, TrackConfig,
};
use track_resolver_http::HttpResolver;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum TrackdExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<TrackdExitCode> for ExitCode {
    fn from(code: TrackdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Environment-derived application configuration
struct EnvConfig {
    config: TrackConfig,
    log_level: String,
}

impl EnvConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let resolver_url = env::var("TRACK_RESOLVER_URL").map_err(|_| {
            anyhow::anyhow!(
                "TRACK_RESOLVER_URL is required. \
                Set it via: export TRACK_RESOLVER_URL=https://tracker.example"
            )
        })?;

        let store_type = env::var("TRACK_STORE_TYPE").unwrap_or_else(|_| "file".to_string());
        let store = match store_type.as_str() {
            "memory" => StoreConfig::Memory,
            "file" => {
                let path = env::var("TRACK_STORE_PATH").map_err(|_| {
                    anyhow::anyhow!(
                        "TRACK_STORE_PATH is required when TRACK_STORE_TYPE=file. \
                        Set it via: export TRACK_STORE_PATH=/var/lib/track/parcels.json"
                    )
                })?;
                StoreConfig::File { path }
            }
            other => anyhow::bail!(
                "TRACK_STORE_TYPE '{}' is not supported. Supported types: file, memory",
                other
            ),
        };

        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            stale_after_secs: parse_env("TRACK_STALE_AFTER_SECS", defaults.stale_after_secs)?,
            refresh_interval_secs: parse_env("TRACK_REFRESH_INTERVAL", defaults.refresh_interval_secs)?,
            language: env::var("TRACK_LANGUAGE").unwrap_or(defaults.language),
            event_channel_capacity: defaults.event_channel_capacity,
        };

        let config = TrackConfig {
            resolver: ResolverConfig {
                base_url: resolver_url,
                timeout_secs: parse_env("TRACK_RESOLVER_TIMEOUT", 30)?,
            },
            store,
            engine,
        };

        Ok(Self {
            config,
            log_level: env::var("TRACK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.config.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!(
                "TRACK_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", name, value)),
        Err(_) => Ok(default),
    }
}

fn main() -> ExitCode {
    let env_config = match EnvConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return TrackdExitCode::ConfigError.into();
        }
    };

    if let Err(e) = env_config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return TrackdExitCode::ConfigError.into();
    }

    let log_level = match env_config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return TrackdExitCode::ConfigError.into();
    }

    info!("starting trackd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {}", e);
            return TrackdExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run(env_config.config).await {
            error!("trackd error: {}", e);
            TrackdExitCode::RuntimeError
        } else {
            TrackdExitCode::CleanShutdown
        }
    })
    .into()
}

/// Bootstrap the components and run the refresh loop.
async fn run(config: TrackConfig) -> Result<()> {
    let store: Arc<dyn ParcelStore> = match &config.store {
        StoreConfig::Memory => {
            warn!("using memory store; tracked parcels will not survive a restart");
            Arc::new(MemoryParcelStore::new())
        }
        StoreConfig::File { path } => {
            info!(%path, "opening parcel store");
            Arc::new(FileParcelStore::new(path).await?)
        }
    };

    let resolver = Arc::new(HttpResolver::from_config(&config.resolver));

    // Fetched once; an unreachable resolver fails bootstrap rather than
    // starting with an empty catalog
    let catalog = CarrierCatalog::load(resolver.as_ref()).await?;
    info!(carriers = catalog.len(), "bootstrap complete");

    let (engine, mut events) = SyncEngine::new(store, resolver, &config.engine);

    // Drain engine events into the log
    let event_logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                EngineEvent::RefreshStarted { requested } => {
                    info!(requested, "refresh started")
                }
                EngineEvent::RecordRefreshed { id } => info!(%id, "record refreshed"),
                EngineEvent::RecordRemoved { id } => info!(%id, "record removed"),
                EngineEvent::ParcelAdded { id } => info!(%id, "parcel added"),
                EngineEvent::RefreshSkipped => info!("nothing stale, refresh skipped"),
                EngineEvent::RefreshFailed { error } => warn!(%error, "refresh failed"),
            }
        }
    });

    let stale_after = config.engine.stale_after();
    let language = config.engine.language.clone();
    let mut interval =
        tokio::time::interval(Duration::from_secs(config.engine.refresh_interval_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match engine.refresh_stale(Utc::now(), stale_after, &language).await {
                    Ok(results) => {
                        if !results.is_empty() {
                            info!(reconciled = results.len(), "refresh pass complete");
                        }
                    }
                    Err(track_core::Error::Busy) => {
                        warn!("previous refresh still in flight, skipping this pass");
                    }
                    Err(e) => {
                        // No automatic retry; the next tick will try again
                        warn!("refresh pass failed: {}", e);
                    }
                }
            }

            signal = wait_for_shutdown() => {
                info!("received {}, shutting down", signal?);
                break;
            }
        }
    }

    event_logger.abort();
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT).
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to setup SIGINT handler: {}", e))?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

/// Wait for CTRL-C. Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
