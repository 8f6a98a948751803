//! Embedding-based bias estimate: projection of the text onto a gender direction.

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::core::text;

use super::{EstimatorError, SemanticBiasEstimator};

/// Masculine/feminine word pairs whose embedding differences define the gender direction.
const ANCHOR_PAIRS: &[(&str, &str)] = &[
    ("he", "she"),
    ("him", "her"),
    ("his", "hers"),
    ("man", "woman"),
    ("men", "women"),
    ("male", "female"),
    ("boy", "girl"),
    ("father", "mother"),
    ("son", "daughter"),
    ("brother", "sister"),
    ("king", "queen"),
    ("mr", "mrs"),
];

/// Turns text into a vector. May be in-process or remote.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EstimatorError>;
}

/// Deterministic in-process embedder: signed feature hashing of normalized words.
/// Uses 64-bit FNV-1a so vectors are stable across builds and platforms.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

/// Default vector width for [`HashingEmbedder`].
pub const DEFAULT_DIM: usize = 512;

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self { dim: DEFAULT_DIM }
    }
}

impl HashingEmbedder {
    fn embed_sync(&self, input: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for token in text::tokenize(input) {
            let word = text::normalize_token(token);
            if word.is_empty() {
                continue;
            }
            let h = fnv1a(word.as_bytes());
            let index = (h % self.dim as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            v[index] += sign;
        }
        normalize(&mut v);
        v
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EstimatorError> {
        Ok(self.embed_sync(text))
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |h, b| {
        (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Cosine similarity. Zero when either vector has zero length or the widths differ.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

/// Scores text by |cos(text, gender direction)|. The direction is the mean of the
/// anchor pair differences, computed on first use.
pub struct EmbeddingEstimator<E> {
    embedder: E,
    direction: OnceCell<Vec<f32>>,
}

impl<E: Embedder> EmbeddingEstimator<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            direction: OnceCell::new(),
        }
    }

    async fn gender_direction(&self) -> Result<&[f32], EstimatorError> {
        let embedder = &self.embedder;
        let direction = self
            .direction
            .get_or_try_init(|| async move {
                let mut sum: Vec<f32> = Vec::new();
                for (masculine, feminine) in ANCHOR_PAIRS {
                    let m = embedder.embed(masculine).await?;
                    let f = embedder.embed(feminine).await?;
                    if sum.is_empty() {
                        sum = vec![0.0; m.len()];
                    }
                    if m.len() != f.len() || m.len() != sum.len() {
                        return Err(EstimatorError::Transient(
                            "embedding widths differ between anchors".to_string(),
                        ));
                    }
                    for ((s, a), b) in sum.iter_mut().zip(&m).zip(&f) {
                        *s += a - b;
                    }
                }
                let n = ANCHOR_PAIRS.len() as f32;
                sum.iter_mut().for_each(|x| *x /= n);
                Ok(sum)
            })
            .await?;
        Ok(direction.as_slice())
    }
}

#[async_trait]
impl<E: Embedder> SemanticBiasEstimator for EmbeddingEstimator<E> {
    fn name(&self) -> &str {
        "embedding"
    }

    async fn estimate(&self, text: &str) -> Result<f32, EstimatorError> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }
        let direction = self.gender_direction().await?;
        let v = self.embedder.embed(text).await?;
        Ok(cosine(&v, direction).abs().min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashing_embedder_is_deterministic() {
        let e = HashingEmbedder::default();
        assert_eq!(e.embed("he said").await, e.embed("he said").await);
        assert_eq!(e.embed("anything").await.unwrap().len(), DEFAULT_DIM);
    }

    #[test]
    fn fnv1a_matches_reference_values() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero() {
        let v = HashingEmbedder::default().embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn gendered_text_scores_higher_than_neutral() {
        let est = EmbeddingEstimator::new(HashingEmbedder::default());
        let gendered = est.estimate("he told his son the man was king").await.unwrap();
        let neutral = est.estimate("the team reviewed the quarterly report").await.unwrap();
        assert!(gendered > neutral, "{} <= {}", gendered, neutral);
        assert!((0.0..=1.0).contains(&gendered));
    }

    #[tokio::test]
    async fn empty_text_scores_zero() {
        let est = EmbeddingEstimator::new(HashingEmbedder::default());
        assert_eq!(est.estimate("   ").await, Ok(0.0));
    }

    struct Failing;

    #[async_trait]
    impl Embedder for Failing {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EstimatorError> {
            Err(EstimatorError::Transient("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn embedder_failure_propagates() {
        let est = EmbeddingEstimator::new(Failing);
        assert!(matches!(
            est.estimate("he").await,
            Err(EstimatorError::Transient(_))
        ));
    }

    #[test]
    fn cosine_handles_zero_and_mismatch() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
