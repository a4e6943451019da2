use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Encode a batch into `(input_ids, token_type_ids, attention_mask)`, each `[B, T]`.
///
/// The tokenizer must already be configured for truncation and batch padding.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], device: &Device) -> Result<(Tensor, Tensor, Tensor)> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let mut ids = Vec::with_capacity(encodings.len());
    let mut masks = Vec::with_capacity(encodings.len());
    for enc in &encodings {
        ids.push(Tensor::new(enc.get_ids(), device)?);
        masks.push(Tensor::new(enc.get_attention_mask(), device)?);
    }
    let input_ids = Tensor::stack(&ids, 0)?;
    let attention_mask = Tensor::stack(&masks, 0)?;
    let token_type_ids = input_ids.zeros_like()?;
    Ok((input_ids, token_type_ids, attention_mask))
}
