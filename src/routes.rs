use crate::{
  error::AppError,
  middleware::device_middleware,
  models::{Device, Level, WordsResponse},
  state::AppState,
  templates::render_game,
  ws,
};
use askama::Template;
use axum::{
  Extension, Json, Router,
  extract::{Query, State},
  middleware,
  response::{Html, IntoResponse},
  routing::get,
};
use std::{str::FromStr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn app(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/", get(index))
    .route("/api/words", get(words))
    .route("/ws", get(ws::ws_handler))
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new().deflate(true).gzip(true))
        .layer(middleware::from_fn(device_middleware)),
    )
    .with_state(state)
}

// Helper to manually render and return Html response to avoid IntoResponse trait issues with Html<Template>
fn render<T: Template>(t: T) -> Result<impl IntoResponse, AppError> {
  let s = t
    .render()
    .map_err(|e| anyhow::anyhow!("Template error: {}", e))?;
  Ok(Html(s))
}

async fn index(Extension(device): Extension<Device>) -> impl IntoResponse {
  render(render_game(device))
}

#[derive(serde::Deserialize)]
struct WordsQuery {
  level: Option<String>,
}

// 未知的 level 视为不过滤
async fn words(
  State(state): State<Arc<AppState>>,
  Query(query): Query<WordsQuery>,
) -> Result<Json<WordsResponse>, AppError> {
  let level = query.level.as_deref().and_then(|l| Level::from_str(l).ok());
  let words = state.words.batch(level).await?;
  Ok(Json(WordsResponse { words }))
}
