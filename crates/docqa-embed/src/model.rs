use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

use docqa_core::config::{expand_path, EmbeddingConfig};
use docqa_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

/// Sentence-transformer style BERT encoder: mean pooling over the last hidden
/// state followed by L2 normalization.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    id: String,
    dim: usize,
}

impl BertEmbedder {
    pub fn load(config: &EmbeddingConfig) -> Result<Self> {
        let device = select_device();
        info!("Loading embedding model {}", config.model_id);
        let files = ModelFiles::resolve(config)?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", files.tokenizer.display(), e))?;
        tokenizer.with_padding(Some(PaddingParams { strategy: PaddingStrategy::BatchLongest, ..Default::default() }));
        tokenizer
            .with_truncation(Some(TruncationParams { max_length: config.max_len, ..Default::default() }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        let raw_config = std::fs::read_to_string(&files.config)
            .with_context(|| format!("reading {}", files.config.display()))?;
        let bert_config: BertConfig = serde_json::from_str(&raw_config)?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("{} has no hidden_size", files.config.display()))? as usize;

        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            // SAFETY: the weights file is not modified while mapped.
            unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, &device)? }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, &device)?
        };
        let model = BertModel::load(vb, &bert_config)?;
        let id = format!("bert:{}:d{}", config.model_id, dim);
        info!("Embedding model ready ({})", id);
        Ok(Self { model, tokenizer, device, id, dim })
    }
}

impl Embedder for BertEmbedder {
    fn id(&self) -> &str { &self.id }

    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let start = Instant::now();
        let (input_ids, token_type_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, &self.device)?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let vectors: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        debug!("Embedded {} texts in {:?}", texts.len(), start.elapsed());
        Ok(vectors)
    }
}

struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: PathBuf,
}

impl ModelFiles {
    /// Local directories win over the hub: `APP_MODEL_DIR`, then
    /// `embedding.model_dir`, then `models/<model name>`.
    fn resolve(config: &EmbeddingConfig) -> Result<Self> {
        let mut candidates = Vec::new();
        if let Ok(dir) = std::env::var("APP_MODEL_DIR") { candidates.push(expand_path(dir)); }
        if let Some(dir) = &config.model_dir { candidates.push(expand_path(dir)); }
        let short_name = config.model_id.rsplit('/').next().unwrap_or(&config.model_id);
        candidates.push(Path::new("models").join(short_name));

        for dir in candidates {
            if let Some(files) = Self::in_dir(&dir) {
                info!("Using model dir: {}", dir.display());
                return Ok(files);
            }
        }
        Self::download(config)
    }

    fn in_dir(dir: &Path) -> Option<Self> {
        let config = dir.join("config.json");
        let tokenizer = dir.join("tokenizer.json");
        let weights = ["model.safetensors", "pytorch_model.bin"]
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())?;
        (config.exists() && tokenizer.exists()).then_some(Self { config, tokenizer, weights })
    }

    fn download(config: &EmbeddingConfig) -> Result<Self> {
        info!("Fetching {}@{} from the Hugging Face Hub", config.model_id, config.revision);
        let api = Api::new()?;
        let repo = api.repo(Repo::with_revision(config.model_id.clone(), RepoType::Model, config.revision.clone()));
        let weights = match repo.get("model.safetensors") {
            Ok(p) => p,
            Err(_) => repo.get("pytorch_model.bin")?,
        };
        Ok(Self { config: repo.get("config.json")?, tokenizer: repo.get("tokenizer.json")?, weights })
    }
}
