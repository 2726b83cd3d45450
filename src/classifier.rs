/// Explicit-content image classification
///
/// ViT-based NSFW detector running on Candle. The model is pulled from the
/// Hugging Face hub once at startup and kept for the process lifetime.
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::vit;
use hf_hub::{api::sync::Api, Repo, RepoType};
use image::imageops::FilterType;

use crate::capture::Frame;
use crate::error::ClassifierError;
use crate::monitor::ImageClassifier;

const MODEL_REPO: &str = "LukeJacob2023/nsfw-image-detector";
const IMAGE_SIZE: usize = 224;

// Class indices from the model config:
// 0: drawings, 1: hentai, 2: neutral, 3: porn, 4: sexy
const CLASS_COUNT: usize = 5;
const UNSAFE_CLASSES: [usize; 3] = [1, 3, 4];

pub struct NsfwClassifier {
    model: vit::Model,
    device: Device,
}

impl NsfwClassifier {
    pub fn new() -> Result<Self, ClassifierError> {
        let device = Device::Cpu;
        tracing::info!("Loading NSFW image model ({MODEL_REPO})...");

        let api = Api::new().map_err(|e| ClassifierError::LoadFailed(Box::new(e)))?;
        let repo = api.repo(Repo::new(MODEL_REPO.to_string(), RepoType::Model));

        let weights = repo
            .get("model.safetensors")
            .map_err(|e| ClassifierError::LoadFailed(Box::new(e)))?;
        let config_path = repo
            .get("config.json")
            .map_err(|e| ClassifierError::LoadFailed(Box::new(e)))?;

        let config_json = std::fs::read_to_string(&config_path)
            .map_err(|e| ClassifierError::LoadFailed(Box::new(e)))?;
        let config: vit::Config =
            serde_json::from_str(&config_json).map_err(|e| ClassifierError::LoadFailed(Box::new(e)))?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device) }
            .map_err(|e| ClassifierError::LoadFailed(Box::new(e)))?;
        let model = vit::Model::new(&config, CLASS_COUNT, vb)
            .map_err(|e| ClassifierError::LoadFailed(Box::new(e)))?;

        tracing::info!("NSFW image model ready");

        Ok(Self { model, device })
    }

    /// Resize to the model's square input, drop alpha, and normalize into
    /// a CHW tensor (the model was trained with mean 0.5, std 0.5 on all
    /// channels).
    fn frame_tensor(&self, frame: &Frame) -> Result<Tensor, ClassifierError> {
        let resized = image::imageops::resize(
            frame,
            IMAGE_SIZE as u32,
            IMAGE_SIZE as u32,
            FilterType::Triangle,
        );

        let mut data = vec![0f32; 3 * IMAGE_SIZE * IMAGE_SIZE];
        for (i, pixel) in resized.pixels().enumerate() {
            for channel in 0..3 {
                data[channel * IMAGE_SIZE * IMAGE_SIZE + i] =
                    (pixel[channel] as f32 / 255.0 - 0.5) / 0.5;
            }
        }

        Tensor::from_vec(data, (1, 3, IMAGE_SIZE, IMAGE_SIZE), &self.device)
            .map_err(|e| ClassifierError::InferenceFailed(Box::new(e)))
    }
}

impl ImageClassifier for NsfwClassifier {
    /// Probability in [0,1] that the frame contains explicit content:
    /// the summed softmax mass of the unsafe classes.
    fn classify(&mut self, frame: &Frame) -> Result<f32, ClassifierError> {
        let input = self.frame_tensor(frame)?;

        let logits = self
            .model
            .forward(&input)
            .map_err(|e| ClassifierError::InferenceFailed(Box::new(e)))?;
        let probs: Vec<f32> = candle_nn::ops::softmax(&logits, 1)
            .and_then(|t| t.flatten_all())
            .and_then(|t| t.to_vec1())
            .map_err(|e| ClassifierError::InferenceFailed(Box::new(e)))?;

        let score: f32 = UNSAFE_CLASSES
            .iter()
            .map(|&class| probs.get(class).copied().unwrap_or(0.0))
            .sum();

        tracing::debug!(score, "frame classified");
        Ok(score.clamp(0.0, 1.0))
    }
}
