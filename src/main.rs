use anyhow::{Context, Result};
use bikeguard_monitor::{
    AppState, Collaborators, CommandSurface, Config, EmailDispatcher, GeminiClassifier,
    ModelLoader, MonitorSession, NullEngine, NullModel, RemoteModelLoader, SessionConfig,
    StaticIdentity, StaticModelLoader, SyntheticBackend, SyntheticConfig,
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "bikeguard-monitor", about = "Real-time bike security monitoring service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/bikeguard")]
    config: String,

    /// Override the HTTP bind address from the config file
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config))?;

    info!("{} starting", cfg.service.name);

    let http_client = reqwest::Client::new();

    let capture = Box::new(SyntheticBackend::new(SyntheticConfig {
        width: cfg.capture.width,
        height: cfg.capture.height,
        fps: cfg.capture.fps,
    }));

    // No speech recognition engine ships with the service itself; the
    // session reports transcription as unsupported unless an engine
    // implementation is wired in here.
    let engine = Box::new(NullEngine);

    let surface = Arc::new(CommandSurface::new(
        cfg.capture.width as f32,
        cfg.capture.height as f32,
    ));
    let loader: Arc<dyn ModelLoader> = match &cfg.detection.inference_url {
        Some(url) => Arc::new(RemoteModelLoader::new(http_client.clone(), url.clone())),
        // Without an inference server the loop runs against a model that
        // reports nothing.
        None => Arc::new(StaticModelLoader::new(Arc::new(NullModel))),
    };

    let api_key = cfg
        .classifier
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok());
    let classifier = Arc::new(GeminiClassifier::new(
        http_client.clone(),
        cfg.classifier.endpoint.clone(),
        cfg.classifier.model.clone(),
        api_key,
    ));

    let identity = Arc::new(StaticIdentity::new(cfg.report.recipient.clone()));
    let dispatcher = Arc::new(EmailDispatcher::new(
        http_client,
        cfg.report.endpoint.clone(),
        cfg.report.service_id.clone(),
        cfg.report.template_id.clone(),
        cfg.report.public_key.clone(),
    ));

    let session_config = SessionConfig {
        detection_interval: Duration::from_millis(cfg.detection.throttle_ms),
        analysis_debounce: Duration::from_millis(cfg.classifier.debounce_ms),
        max_tracked_objects: cfg.detection.max_objects,
        min_confidence: cfg.detection.min_confidence,
        ..SessionConfig::default()
    };

    let session = Arc::new(MonitorSession::new(
        session_config,
        Collaborators {
            capture,
            engine,
            loader,
            surface,
            classifier,
            identity,
            dispatcher,
        },
    ));

    let router = bikeguard_monitor::create_router(AppState::new(session));

    let bind = args
        .bind
        .unwrap_or_else(|| format!("{}:{}", cfg.service.http.bind, cfg.service.http.port));
    info!("HTTP API listening on {}", bind);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
