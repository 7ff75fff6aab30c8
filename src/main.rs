use anyhow::{Context, Result};
use clap::Parser;
use souschef::capture::{FrameSource, FrameSourceFactory};
use souschef::config::Config;
use souschef::http::{create_router, AppState};
use souschef::session::{AnalysisScheduler, SessionConfig, SessionRecorder};
use souschef::speech::{AudioSink, GoogleTts, SpeechCoordinator, VoiceLocale};
use souschef::storage::{NullStore, PersistenceSink, SupabaseStore};
use souschef::vision::{GeminiVision, VisionProvider};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "souschef", about = "Camera-guided cooking assistant")]
struct Args {
    /// Configuration file (without extension)
    #[arg(long, default_value = "config/souschef")]
    config: String,

    /// Override the configured voice locale
    #[arg(long)]
    locale: Option<VoiceLocale>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let vision_key = cfg
        .vision
        .resolve_api_key()
        .context("No vision API key (set vision.api_key or GEMINI_API_KEY)")?;
    let vision: Arc<dyn VisionProvider> = Arc::new(GeminiVision::new(
        cfg.vision.api_base.clone(),
        cfg.vision.model.clone(),
        vision_key,
    )?);

    let tts_key = cfg
        .tts
        .resolve_api_key()
        .context("No TTS API key (set tts.api_key or GOOGLE_CLOUD_API_KEY)")?;
    let synth = Arc::new(GoogleTts::new(cfg.tts.api_base.clone(), tts_key)?);

    let store: Arc<dyn PersistenceSink> = match cfg.storage.resolve_anon_key() {
        Some(anon_key) if !cfg.storage.disabled => Arc::new(SupabaseStore::new(
            cfg.storage.url.clone(),
            anon_key,
            Arc::clone(&vision),
        )?),
        _ => {
            warn!("Persistence disabled; completions will not be stored");
            Arc::new(NullStore)
        }
    };

    let frames: Arc<dyn FrameSource> = FrameSourceFactory::create(&cfg.capture)?.into();
    info!("Frame source: {}", frames.name());

    let mut session_config = SessionConfig::from_config(&cfg.recipe, &cfg.capture, &cfg.tts)?;
    if let Some(locale) = args.locale {
        session_config.locale = locale;
    }
    info!(
        "Session {}: {} ingredients, {} steps, voice {}",
        session_config.session_id,
        session_config.ingredients.len(),
        session_config.steps.len(),
        session_config.locale
    );

    let speech = Arc::new(SpeechCoordinator::new(
        synth,
        audio_sink()?,
        session_config.locale,
    ));

    let recorder = SessionRecorder::new(Arc::clone(&store));
    let (scheduler, handle) =
        AnalysisScheduler::new(session_config, frames, vision, speech, recorder);

    let session_task = tokio::spawn(scheduler.run());

    let app = create_router(AppState::new(handle, store));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.context("HTTP server failed")?;
        }
        _ = session_task => {
            info!("Session finished; shutting down");
        }
    }

    Ok(())
}

#[cfg(feature = "audio")]
fn audio_sink() -> Result<Arc<dyn AudioSink>> {
    Ok(Arc::new(souschef::speech::RodioSink::new()?))
}

#[cfg(not(feature = "audio"))]
fn audio_sink() -> Result<Arc<dyn AudioSink>> {
    Ok(Arc::new(souschef::speech::SilentSink::new()))
}
