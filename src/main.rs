pub mod conf;
pub mod error;
pub mod game;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod templates;
pub mod words;
pub mod ws;

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::{
  conf::Config,
  state::AppState,
  words::{FileWordStore, MemoryWordStore, WordSource, WordStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scan_typing=info,tower_http=info")),
    )
    .init();

  let config = Config::load();

  let store: Arc<dyn WordStore> = match &config.words {
    Some(path) => {
      tracing::info!("Using word table {}", path.display());
      Arc::new(FileWordStore::new(path.clone()))
    }
    None => {
      let store = MemoryWordStore::builtin();
      tracing::info!("Using built-in word list ({} words)", store.record_count());
      Arc::new(store)
    }
  };

  if config.seed.is_some() {
    tracing::warn!("Word sampling is seeded; batches are reproducible");
  }

  let app_state = Arc::new(AppState {
    words: Arc::new(WordSource::new(store, config.seed)),
  });

  let app = routes::app(app_state);

  let listener = tokio::net::TcpListener::bind(config.bind)
    .await
    .with_context(|| format!("failed to bind {}", config.bind))?;
  tracing::info!("Server listening on {}", config.bind);
  axum::serve(listener, app).await?;
  Ok(())
}
