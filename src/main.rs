use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use screen_sentry::capture::ScreenSource;
use screen_sentry::classifier::NsfwClassifier;
use screen_sentry::config::Config;
use screen_sentry::monitor::MonitorLoop;
use screen_sentry::ocr::OcrExtractor;
use screen_sentry::sink::RealtimeDbSink;
use screen_sentry::toxicity::ToxicBertScorer;
use screen_sentry::translate::GtxTranslator;

fn main() {
    initialize_tracing();
    tracing::info!("screen-sentry {} starting", env!("CARGO_PKG_VERSION"));

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        tracing::error!("{e}");
        process::exit(1);
    }

    // Every collaborator must come up before the loop starts; a missing
    // model or an unreachable event store means we never begin watching.
    let source = match ScreenSource::new(config.monitor_index) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("Failed to initialize screen capture: {e}");
            process::exit(1);
        }
    };

    let classifier = match NsfwClassifier::new() {
        Ok(classifier) => classifier,
        Err(e) => {
            tracing::error!("Failed to load the NSFW image model: {e}");
            process::exit(1);
        }
    };

    let extractor = match OcrExtractor::new(config.tessdata_dir.as_deref(), &config.ocr_language) {
        Ok(extractor) => extractor,
        Err(e) => {
            tracing::error!("Failed to initialize OCR: {e}");
            tracing::error!("Install Tesseract: brew install tesseract / apt-get install tesseract-ocr");
            process::exit(1);
        }
    };

    let scorer = match ToxicBertScorer::new() {
        Ok(scorer) => scorer,
        Err(e) => {
            tracing::error!("Failed to load the toxicity model: {e}");
            process::exit(1);
        }
    };

    let translator = GtxTranslator::new(&config.target_language);

    let sink = match RealtimeDbSink::connect(
        &config.database_url,
        config.database_auth.as_deref(),
    ) {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!("Event store connection failed, refusing to start: {e}");
            process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Shutdown requested");
        handler_flag.store(false, Ordering::SeqCst);
    }) {
        tracing::error!("Failed to install the shutdown handler: {e}");
        process::exit(1);
    }

    let mut monitor = MonitorLoop::new(
        Box::new(source),
        Box::new(classifier),
        Box::new(extractor),
        Box::new(translator),
        Box::new(scorer),
        Box::new(sink),
        config.loop_config(),
    );

    monitor.run(&running);

    tracing::info!("screen-sentry stopped");
}

fn initialize_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
