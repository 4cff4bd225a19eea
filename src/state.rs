use crate::words::WordSource;
use std::sync::Arc;

pub struct AppState {
  pub words: Arc<WordSource>,
}
