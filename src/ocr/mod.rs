/// OCR module for on-screen text recovery
///
/// Combines image preprocessing, Tesseract OCR, and text normalization to
/// pull analyzable text out of screen captures.
///
/// # Architecture
///
/// The module is split into focused submodules:
/// - `preprocessing`: grayscale conversion and adaptive thresholding
/// - `engine`: Tesseract integration
/// - `normalize`: reduction of raw OCR output to analyzable ASCII text
mod engine;
mod preprocessing;
pub mod normalize;

pub use normalize::normalize;

use crate::capture::Frame;
use crate::error::OcrError;
use crate::monitor::TextExtractor;
use engine::TesseractEngine;
use preprocessing::AdaptiveThreshold;

/// Text extractor combining preprocessing and OCR.
///
/// Holds the Tesseract instance for the process lifetime; per-frame work is
/// binarize, recognize, trim.
pub struct OcrExtractor {
    preprocessor: AdaptiveThreshold,
    engine: TesseractEngine,
}

impl OcrExtractor {
    pub fn new(tessdata_dir: Option<&str>, lang: &str) -> Result<Self, OcrError> {
        Ok(Self {
            preprocessor: AdaptiveThreshold::default(),
            engine: TesseractEngine::new(tessdata_dir, lang)?,
        })
    }
}

impl TextExtractor for OcrExtractor {
    fn extract(&mut self, frame: &Frame) -> Result<String, OcrError> {
        let binary = self.preprocessor.binarize(frame);
        self.engine.recognize(&binary)
    }
}
