mod input;
mod metrics;
mod presenter;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::io::BufRead;
use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loopstage_core::{
    load_config, validate_config, ClipResolver, Config, ControllerHandle, FsAssetStore,
    HeadlessSurface, NoticeEnvelope, RendererSurface, SceneController, SceneNotice,
};

use input::Command;
use presenter::TerminalPresenter;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file used when `LOOPSTAGE_CONFIG` is not set
const DEFAULT_CONFIG_PATH: &str = "loopstage.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("loopstage {}", VERSION);
    let config = load_effective_config()?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    // Compute config hash for the session log
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        config_hash = &config_hash[..16],
        narrative = ?config.narrative.source(),
        assets = ?config.assets.root,
        playback = config.playback.enabled,
        "Configuration loaded successfully"
    );

    let graph = config
        .narrative
        .load_graph()
        .context("Failed to load scene graph")?;
    info!(
        "Scene graph ready: {} scenes, starting at {}",
        graph.scenes.len(),
        graph.initial
    );

    if !config.assets.root.is_dir() {
        warn!(
            "Asset directory {:?} does not exist, scenes will run without video",
            config.assets.root
        );
    }
    let resolver = ClipResolver::new(Arc::new(FsAssetStore::new(config.assets.root.clone())));
    let surface: Arc<dyn RendererSurface> =
        Arc::new(HeadlessSurface::new(config.playback.clone()));
    let presenter = Arc::new(TerminalPresenter::new(std::io::stdout()));

    let mut controller = SceneController::new(
        Arc::new(graph),
        resolver,
        surface,
        presenter,
        config.controller.clone(),
    )
    .with_playback_enabled(config.playback.enabled);

    let handle = controller.handle();
    let notices = controller.subscribe();
    let notice_task = tokio::spawn(log_notices(notices));

    // Enter the initial scene before reading input, so early input has a scene.
    controller
        .start()
        .await
        .context("Failed to start scene controller")?;
    let mut controller_task = tokio::spawn(async move { controller.run().await });

    println!("{}", input::HELP);
    tokio::select! {
        _ = read_input(handle.clone()) => {
            info!("Input closed");
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal");
        }
        result = &mut controller_task => {
            // Only reachable if the controller task ended without a shutdown.
            result
                .context("Controller task panicked")?
                .context("Scene controller failed")?;
            return Ok(());
        }
    }

    handle.shutdown();
    controller_task
        .await
        .context("Controller task panicked")?
        .context("Scene controller failed")?;

    // The notice channel closes once the controller is dropped.
    let _ = notice_task.await;
    info!("Player stopped");
    Ok(())
}

/// Load the config file, or defaults when no file exists at the implicit path.
fn load_effective_config() -> Result<Config> {
    match std::env::var("LOOPSTAGE_CONFIG") {
        Ok(path) => {
            let config_path = PathBuf::from(path);
            info!("Loading configuration from {:?}", config_path);
            load_config(&config_path)
                .with_context(|| format!("Failed to load config from {:?}", config_path))
        }
        Err(_) => {
            let config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if config_path.exists() {
                info!("Loading configuration from {:?}", config_path);
                load_config(&config_path)
                    .with_context(|| format!("Failed to load config from {:?}", config_path))
            } else {
                info!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
                Ok(Config::default())
            }
        }
    }
}

/// Read stdin on a dedicated thread; the runtime would otherwise wait on a
/// blocked read at shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    return;
                }
            }
        }
    });
    rx
}

/// Feed stdin commands to the controller until EOF or `q`.
async fn read_input(handle: ControllerHandle) {
    let mut lines = spawn_stdin_reader();

    while let Some(line) = lines.recv().await {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{} ({})", e, input::HELP);
                continue;
            }
        };

        let accepted = match command {
            Command::Choose(choice) => handle.choose(choice),
            Command::Tap => handle.tap(),
            Command::Metrics => {
                match metrics::encode_metrics() {
                    Ok(text) => print!("{}", text),
                    Err(e) => warn!("Failed to encode metrics: {}", e),
                }
                true
            }
            Command::Quit => return,
        };

        metrics::INPUT_COMMANDS
            .with_label_values(&[command.as_str(), if accepted { "true" } else { "false" }])
            .inc();
        if !accepted {
            debug!(command = command.as_str(), "Input not accepted right now");
        }
    }
}

/// Log every notice until the controller goes away.
async fn log_notices(mut notices: broadcast::Receiver<NoticeEnvelope>) {
    loop {
        match notices.recv().await {
            Ok(envelope) => {
                let json = serde_json::to_string(&envelope).unwrap_or_default();
                match &envelope.notice {
                    SceneNotice::Degraded { .. } => warn!(notice = %json, "Scene degraded"),
                    SceneNotice::EventIgnored { .. } => debug!(notice = %json, "Scene notice"),
                    _ => info!(notice = %json, "Scene notice"),
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Notice log lagged, skipped {} notices", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}
