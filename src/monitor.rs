/// Detection loop
///
/// Orchestrates one monitoring cycle end to end and schedules the next:
///
/// ```text
/// MonitorLoop
///   ├── FrameSource      (screen capture)
///   ├── ImageClassifier  (explicit-content probability)
///   ├── TextExtractor    (OCR) + normalization
///   ├── Translator       (canonical analysis language)
///   ├── ToxicityScorer   (chunked scoring, max aggregation)
///   └── EventSink        (append-only detection log)
/// ```
///
/// The loop is the terminal error boundary for its stages: no collaborator
/// failure escapes a cycle. Capture failure skips the cycle; every other
/// failure degrades that one stage and the cycle carries on.
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::Frame;
use crate::error::{
    CaptureError, ClassifierError, OcrError, ScoreError, SinkError, TranslateError,
};
use crate::ocr::normalize;
use crate::sink::EventType;

/// Supplies the current display contents on demand.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

/// Scores a frame for explicit content; probability in [0,1].
pub trait ImageClassifier {
    fn classify(&mut self, frame: &Frame) -> Result<f32, ClassifierError>;
}

/// Recovers raw text from a frame. Empty text is a normal result.
pub trait TextExtractor {
    fn extract(&mut self, frame: &Frame) -> Result<String, OcrError>;
}

/// Maps text into the canonical analysis language.
pub trait Translator {
    fn translate(&mut self, text: &str) -> Result<String, TranslateError>;
}

/// Scores text for toxicity; `None` means there was nothing to score,
/// which is distinct from a score of 0.0.
pub trait ToxicityScorer {
    fn score(&mut self, text: &str) -> Result<Option<f32>, ScoreError>;
}

/// Durably records one detection event.
pub trait EventSink {
    fn record(&mut self, event_type: EventType, message: &str) -> Result<(), SinkError>;
}

/// Where the loop currently is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Capturing,
    Classifying,
    Extracting,
    Translating,
    Scoring,
    Sleeping,
}

/// Detection policy. Both thresholds are strict (`>`): a score exactly at
/// the threshold does not trigger an event.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub nsfw_threshold: f32,
    pub toxicity_threshold: f32,
    pub interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            nsfw_threshold: 0.5,
            toxicity_threshold: 0.5,
            interval: Duration::from_secs(10),
        }
    }
}

/// Outcome of one cycle, for logging and tests.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub nsfw_score: Option<f32>,
    pub toxicity_score: Option<f32>,
    /// Events actually recorded by the sink this cycle.
    pub events: Vec<EventType>,
    /// True when capture failed and the cycle was skipped.
    pub skipped: bool,
}

pub struct MonitorLoop {
    source: Box<dyn FrameSource>,
    classifier: Box<dyn ImageClassifier>,
    extractor: Box<dyn TextExtractor>,
    translator: Box<dyn Translator>,
    scorer: Box<dyn ToxicityScorer>,
    sink: Box<dyn EventSink>,
    config: LoopConfig,
    state: LoopState,
}

impl MonitorLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        classifier: Box<dyn ImageClassifier>,
        extractor: Box<dyn TextExtractor>,
        translator: Box<dyn Translator>,
        scorer: Box<dyn ToxicityScorer>,
        sink: Box<dyn EventSink>,
        config: LoopConfig,
    ) -> Self {
        Self {
            source,
            classifier,
            extractor,
            translator,
            scorer,
            sink,
            config,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run cycles until `running` is cleared. The inter-cycle sleep is the
    /// only suspension point and reacts to cancellation promptly.
    pub fn run(&mut self, running: &AtomicBool) {
        tracing::info!(
            "Detection loop started (interval: {:?})",
            self.config.interval
        );

        while running.load(Ordering::SeqCst) {
            let report = self.run_cycle();
            if !report.skipped {
                tracing::debug!(
                    nsfw = ?report.nsfw_score,
                    toxicity = ?report.toxicity_score,
                    events = report.events.len(),
                    "cycle complete"
                );
            }

            if !sleep_interruptible(running, self.config.interval) {
                break;
            }
        }

        self.state = LoopState::Idle;
        tracing::info!("Detection loop stopped");
    }

    /// One full cycle: capture, classify, extract, translate, score, emit.
    pub fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        self.state = LoopState::Capturing;
        let frame = match self.source.capture() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Screen capture failed, skipping cycle: {e}");
                report.skipped = true;
                self.state = LoopState::Sleeping;
                return report;
            }
        };

        // Both detection channels run every cycle; the classification
        // outcome never short-circuits text extraction.
        self.state = LoopState::Classifying;
        match self.classifier.classify(&frame) {
            Ok(score) => {
                report.nsfw_score = Some(score);
                if score > self.config.nsfw_threshold {
                    tracing::warn!("Explicit content detected on screen");
                    self.emit(
                        EventType::NsfwDetected,
                        "Explicit imagery detected in the captured frame.",
                        &mut report,
                    );
                } else {
                    tracing::debug!(score, "frame is safe");
                }
            }
            Err(e) => tracing::warn!("Image classification failed: {e}"),
        }

        self.state = LoopState::Extracting;
        let raw = match self.extractor.extract(&frame) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Text extraction failed: {e}");
                String::new()
            }
        };
        let text = normalize(&raw);
        if text.is_empty() {
            tracing::debug!("no text extracted from frame");
            self.state = LoopState::Sleeping;
            return report;
        }

        self.state = LoopState::Translating;
        let analyzed = match self.translator.translate(&text) {
            Ok(translated) => translated,
            Err(e) => {
                // Degraded mode: score the untranslated text rather than
                // dropping the cycle.
                tracing::warn!("Translation failed, scoring original text: {e}");
                text
            }
        };

        self.state = LoopState::Scoring;
        match self.scorer.score(&analyzed) {
            Ok(Some(score)) => {
                report.toxicity_score = Some(score);
                if score > self.config.toxicity_threshold {
                    tracing::warn!("Toxic text detected on screen");
                    self.emit(
                        EventType::ToxicText,
                        "Toxic text detected in on-screen content.",
                        &mut report,
                    );
                } else {
                    tracing::debug!(score, "text is non-toxic");
                }
            }
            Ok(None) => tracing::debug!("nothing to score"),
            Err(e) => tracing::warn!("Toxicity scoring failed: {e}"),
        }

        self.state = LoopState::Sleeping;
        report
    }

    /// Record an event; a sink failure is logged, never raised.
    fn emit(&mut self, event_type: EventType, message: &str, report: &mut CycleReport) {
        match self.sink.record(event_type, message) {
            Ok(()) => report.events.push(event_type),
            Err(e) => tracing::warn!("Failed to record {event_type} event: {e}"),
        }
    }
}

/// Sleep for `total`, waking early when `running` is cleared.
/// Returns false when cancelled.
fn sleep_interruptible(running: &AtomicBool, total: Duration) -> bool {
    const SLICE: Duration = Duration::from_millis(100);

    let deadline = Instant::now() + total;
    loop {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }
        thread::sleep(remaining.min(SLICE));
    }
}
