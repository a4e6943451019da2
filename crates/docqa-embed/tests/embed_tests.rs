use docqa_core::config::EmbeddingConfig;
use docqa_embed::{load_embedder, Embedder, FakeEmbedder};

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(384);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 384);
    assert_eq!(embedder.dim(), 384);
    assert_eq!(embedder.id(), "fake:xxhash64:d384");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_ignores_case_and_punctuation() {
    let embedder = FakeEmbedder::new(256);
    let a = embedder.embed_one("What color is the sky?").expect("embed");
    let b = embedder.embed_one("what COLOR is the sky").expect("embed");
    assert!((cosine(&a, &b) - 1.0).abs() < 1e-5);
}

#[test]
fn shared_words_mean_closer_vectors() {
    let embedder = FakeEmbedder::new(512);
    let q = embedder.embed_one("how to start a fire").expect("embed");
    let near = embedder.embed_one("start a fire with dry tinder").expect("embed");
    let far = embedder.embed_one("networking cables and routers").expect("embed");
    assert!(cosine(&q, &near) > cosine(&q, &far));
}

#[test]
fn config_flag_selects_fake_embedder() {
    let config = EmbeddingConfig { use_fake: true, fake_dim: 64, ..EmbeddingConfig::default() };
    let embedder = load_embedder(&config).expect("embedder");
    assert_eq!(embedder.dim(), 64);
    assert!(embedder.embed_batch(&[]).expect("empty batch").is_empty());
}

#[test]
#[ignore = "downloads sentence-transformers/all-MiniLM-L6-v2"]
fn bert_embedder_produces_normalized_384_dim_vectors() {
    let embedder = docqa_embed::BertEmbedder::load(&EmbeddingConfig::default()).expect("model");
    let embs = embedder
        .embed_batch(&["The sky is blue.".to_string(), "A much longer sentence about grass being green.".to_string()])
        .expect("embed");
    assert_eq!(embs.len(), 2);
    for v in &embs {
        assert_eq!(v.len(), 384);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() <= 1e-3);
    }
}
