use crate::models::Level;
use anyhow::anyhow;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::sync::{Arc, Mutex};

pub mod store;

pub use store::{FileWordStore, MemoryWordStore};

/// Words handed out per game.
pub const BATCH_SIZE: usize = 10;

#[async_trait::async_trait]
pub trait WordStore: Send + Sync {
  /// All stored words, restricted to `level` when given.
  async fn fetch(&self, level: Option<Level>) -> anyhow::Result<Vec<String>>;
}

/// Uniform permutation of the whole candidate set, truncated to `count`.
pub fn sample_words<R: Rng + ?Sized>(
  mut candidates: Vec<String>,
  count: usize,
  rng: &mut R,
) -> Vec<String> {
  candidates.shuffle(rng);
  candidates.truncate(count);
  candidates
}

pub struct WordSource {
  store: Arc<dyn WordStore>,
  rng: Mutex<StdRng>,
}

impl WordSource {
  pub fn new(store: Arc<dyn WordStore>, seed: Option<u64>) -> Self {
    let rng = match seed {
      Some(s) => StdRng::seed_from_u64(s),
      None => StdRng::from_entropy(),
    };
    Self {
      store,
      rng: Mutex::new(rng),
    }
  }

  pub async fn batch(&self, level: Option<Level>) -> anyhow::Result<Vec<String>> {
    let candidates = self.store.fetch(level).await?;
    let total = candidates.len();
    let words = {
      let mut rng = self
        .rng
        .lock()
        .map_err(|_| anyhow!("word sampler lock poisoned"))?;
      sample_words(candidates, BATCH_SIZE, &mut *rng)
    };
    tracing::debug!(
      level = ?level,
      candidates = total,
      picked = words.len(),
      "sampled word batch"
    );
    Ok(words)
  }
}
