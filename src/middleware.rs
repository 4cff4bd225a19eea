use crate::models::Device;
use axum::{
  extract::Request,
  http::header,
  middleware::Next,
  response::Response,
};
use regex::Regex;
use std::sync::OnceLock;

pub fn detect_device(user_agent: Option<&str>) -> Device {
  static MOBILE_REGEX: OnceLock<Regex> = OnceLock::new();
  let re = MOBILE_REGEX.get_or_init(|| Regex::new(r"(?i)Mobi|Android|iPhone").unwrap());

  match user_agent {
    Some(ua) if re.is_match(ua) => Device::Mobile,
    _ => Device::Desktop,
  }
}

// 根据 User-Agent 标记设备类型，供页面与 ws 使用
pub async fn device_middleware(mut req: Request, next: Next) -> Response {
  let device = detect_device(
    req
      .headers()
      .get(header::USER_AGENT)
      .and_then(|h| h.to_str().ok()),
  );
  req.extensions_mut().insert(device);
  next.run(req).await
}
