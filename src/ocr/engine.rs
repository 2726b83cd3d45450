/// Tesseract OCR engine wrapper
///
/// Manages the Tesseract instance and performs OCR on preprocessed binary
/// images. Page segmentation mode 6 (single uniform block of text) fits
/// full-screen captures better than the automatic layouts.
use image::GrayImage;
use leptess::{LepTess, Variable};
use std::path::{Path, PathBuf};

use crate::error::OcrError;

pub struct TesseractEngine {
    tess: LepTess,
}

impl TesseractEngine {
    /// Initialize Tesseract.
    ///
    /// # Arguments
    /// * `tessdata_dir` - Optional path to trained data; `None` uses the
    ///   system installation
    /// * `lang` - Recognition language code, e.g. "eng"
    pub fn new(tessdata_dir: Option<&str>, lang: &str) -> Result<Self, OcrError> {
        tracing::info!("Initializing Tesseract OCR...");

        let mut tess =
            LepTess::new(tessdata_dir, lang).map_err(|e| OcrError::InitFailed(Box::new(e)))?;

        // PSM 6 = assume a single uniform block of text
        tess.set_variable(Variable::TesseditPagesegMode, "6")
            .map_err(|e| OcrError::InitFailed(Box::new(e)))?;

        tracing::info!("Tesseract OCR ready (lang: {lang}, mode: PSM 6)");

        Ok(Self { tess })
    }

    /// Perform OCR on a binary (preprocessed) image.
    ///
    /// Returns the recognized text with surrounding whitespace trimmed.
    /// Empty text is a normal result for frames without any text regions.
    pub fn recognize(&mut self, binary: &GrayImage) -> Result<String, OcrError> {
        // leptess reads its input from a file path
        let temp_path = temp_image_path();
        binary
            .save(&temp_path)
            .map_err(|e| OcrError::RecognitionFailed(Box::new(e)))?;

        let result = self.run_ocr(&temp_path);
        let _ = std::fs::remove_file(&temp_path);
        result
    }

    fn run_ocr(&mut self, path: &Path) -> Result<String, OcrError> {
        self.tess
            .set_image(path)
            .map_err(|e| OcrError::RecognitionFailed(Box::new(e)))?;
        let text = self
            .tess
            .get_utf8_text()
            .map_err(|e| OcrError::RecognitionFailed(Box::new(e)))?;

        Ok(text.trim().to_string())
    }
}

fn temp_image_path() -> PathBuf {
    std::env::temp_dir().join(format!("screen-sentry-ocr-{}.png", std::process::id()))
}
