//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (`__` separates nested keys, so
//! `APP_CHUNKING__CHUNK_SIZE=500` overrides `chunking.chunk_size`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;

pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: usize,
    /// Split points, coarsest first. The empty string means "any character".
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 900,
            chunk_overlap: 150,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_k: usize,
    pub min_k: usize,
    pub max_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_k: 4, min_k: 2, max_k: 8 }
    }
}

impl RetrievalConfig {
    pub fn clamp_k(&self, k: usize) -> usize {
        k.clamp(self.min_k, self.max_k)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_id: String,
    pub revision: String,
    /// Local directory holding `config.json`, `tokenizer.json` and weights.
    pub model_dir: Option<String>,
    pub max_len: usize,
    pub batch_size: usize,
    pub use_fake: bool,
    pub fake_dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            revision: "main".to_string(),
            model_dir: None,
            max_len: 256,
            batch_size: 32,
            use_fake: false,
            fake_dim: 384,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { dir: "~/.local/share/docqa/indexes".to_string() }
    }
}

impl StoreConfig {
    pub fn dir_path(&self) -> PathBuf {
        expand_path(&self.dir)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub store: StoreConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        let c = &self.chunking;
        if c.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be > 0".into()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        let r = &self.retrieval;
        if r.min_k == 0 || r.min_k > r.max_k {
            return Err(Error::InvalidConfig(format!(
                "retrieval range [{}, {}] is empty or starts at 0",
                r.min_k, r.max_k
            )));
        }
        if !(r.min_k..=r.max_k).contains(&r.default_k) {
            return Err(Error::InvalidConfig(format!(
                "retrieval.default_k ({}) is outside [{}, {}]",
                r.default_k, r.min_k, r.max_k
            )));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be > 0".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract and validate the full settings tree.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
