/// Toxicity model inference
///
/// BERT sequence classifier running on Candle, loaded from the Hugging Face
/// hub once at startup. The upstream checkpoint is multi-label (toxic,
/// severe_toxic, obscene, threat, insult, identity_hate); a chunk's score
/// is the strongest label probability, which is what the reference
/// text-classification pipelines report.
use candle_core::{Device, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::Tokenizer;

use crate::error::ScoreError;

const MODEL_REPO: &str = "unitary/toxic-bert";
const LABEL_COUNT: usize = 6;

/// The encoder's positional limit; chunking already bounds the character
/// count, truncation here guards against pathological tokenizations.
const MAX_TOKENS: usize = 512;

pub struct ToxicBert {
    model: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
}

impl ToxicBert {
    pub fn new() -> Result<Self, ScoreError> {
        let device = Device::Cpu;
        tracing::info!("Loading toxicity model ({MODEL_REPO})...");

        let api = Api::new().map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;
        let repo = api.repo(Repo::new(MODEL_REPO.to_string(), RepoType::Model));

        let weights = repo
            .get("model.safetensors")
            .map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;
        let config_path = repo
            .get("config.json")
            .map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;

        let config_json = std::fs::read_to_string(&config_path)
            .map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;
        let config: BertConfig =
            serde_json::from_str(&config_json).map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(ScoreError::LoadFailed)?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DTYPE, &device) }
            .map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;
        let model = BertModel::load(vb.pp("bert"), &config)
            .map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;
        let pooler = candle_nn::linear(
            config.hidden_size,
            config.hidden_size,
            vb.pp("bert").pp("pooler").pp("dense"),
        )
        .map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;
        let classifier = candle_nn::linear(config.hidden_size, LABEL_COUNT, vb.pp("classifier"))
            .map_err(|e| ScoreError::LoadFailed(Box::new(e)))?;

        tracing::info!("Toxicity model ready");

        Ok(Self {
            model,
            pooler,
            classifier,
            tokenizer,
            device,
        })
    }

    /// Toxicity probability in [0,1] for one bounded chunk.
    pub fn score_chunk(&self, text: &str) -> Result<f32, ScoreError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(ScoreError::TokenizeFailed)?;
        let mut ids = encoding.get_ids().to_vec();
        ids.truncate(MAX_TOKENS);

        let infer = |e: candle_core::Error| ScoreError::InferenceFailed(Box::new(e));

        let input = Tensor::new(ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(infer)?;
        let token_types = input.zeros_like().map_err(infer)?;

        let hidden = self
            .model
            .forward(&input, &token_types, None)
            .map_err(infer)?;
        // Classification head: tanh-pooled [CLS] state through the linear head.
        let cls = hidden.i((.., 0)).map_err(infer)?;
        let pooled = self.pooler.forward(&cls).and_then(|t| t.tanh()).map_err(infer)?;
        let logits = self.classifier.forward(&pooled).map_err(infer)?;

        let probs: Vec<f32> = candle_nn::ops::sigmoid(&logits)
            .and_then(|t| t.flatten_all())
            .and_then(|t| t.to_vec1())
            .map_err(infer)?;

        Ok(probs.into_iter().fold(0.0, f32::max))
    }
}
