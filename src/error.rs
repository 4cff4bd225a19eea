use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use std::fmt::Debug;

// Make our own error that wraps `anyhow::Error`.
pub struct AppError(anyhow::Error);

// 允许直接使用 ? 转换各种错误
impl<E> From<E> for AppError
where
  E: Into<anyhow::Error>,
{
  fn from(err: E) -> Self {
    Self(err.into())
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    tracing::error!("Application error: {:#}", self.0);

    // The store's own description goes back to the caller unchanged
    let body = serde_json::json!({ "error": format!("{:#}", self.0) });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
  }
}

impl Debug for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self.0)
  }
}
