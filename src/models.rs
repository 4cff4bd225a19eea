use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Level {
  Easy,
  #[default]
  Normal,
  Hard,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Speed {
  Slow,
  #[default]
  Normal,
  Quick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Device {
  #[default]
  Desktop,
  Mobile,
}

impl Speed {
  /// How long a word takes to scroll across the screen.
  pub fn display_duration(self, device: Device) -> Duration {
    let ms = match (self, device) {
      (Speed::Slow, Device::Desktop) => 2000,
      (Speed::Slow, Device::Mobile) => 1000,
      (Speed::Normal, Device::Desktop) => 1000,
      (Speed::Normal, Device::Mobile) => 800,
      (Speed::Quick, _) => 500,
    };
    Duration::from_millis(ms)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
  #[default]
  Idle,
  Countdown,
  Playing,
  Resolved, // round answered, waiting for the advance timer
  Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
  pub word: String,
  pub level: Level,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordsResponse {
  pub words: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientAction {
  Start {
    #[serde(default)]
    level: Level,
    #[serde(default)]
    speed: Speed,
  },
  Input {
    value: String,
  },
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientView {
  pub phase: GamePhase,
  pub level: Level,
  pub speed: Speed,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub countdown: Option<u8>,
  pub round: usize,
  pub total_rounds: usize,
  pub score: usize,
  // Only sent while the word is on screen
  #[serde(skip_serializing_if = "Option::is_none")]
  pub word: Option<String>,
  pub is_round_over: bool,
  pub result_message: String,
  pub animation_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMsg {
  Update(ClientView),
  Focus,
  Log { text: String, time: String },
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  #[test]
  fn quick_speed_ignores_device() {
    assert_eq!(
      Speed::Quick.display_duration(Device::Desktop),
      Duration::from_millis(500)
    );
    assert_eq!(
      Speed::Quick.display_duration(Device::Mobile),
      Duration::from_millis(500)
    );
  }

  #[test]
  fn slower_speeds_are_shortened_on_mobile() {
    assert_eq!(Speed::Slow.display_duration(Device::Desktop).as_millis(), 2000);
    assert_eq!(Speed::Slow.display_duration(Device::Mobile).as_millis(), 1000);
    assert_eq!(Speed::Normal.display_duration(Device::Desktop).as_millis(), 1000);
    assert_eq!(Speed::Normal.display_duration(Device::Mobile).as_millis(), 800);
  }

  #[test]
  fn level_parses_only_known_tags() {
    assert_eq!(Level::from_str("easy").ok(), Some(Level::Easy));
    assert_eq!(Level::from_str("hard").ok(), Some(Level::Hard));
    assert!(Level::from_str("nightmare").is_err());
    assert!(Level::from_str("").is_err());
  }

  #[test]
  fn start_action_falls_back_to_normal() {
    let action: ClientAction = serde_json::from_str(r#"{"type":"start","data":{}}"#).unwrap();
    match action {
      ClientAction::Start { level, speed } => {
        assert_eq!(level, Level::Normal);
        assert_eq!(speed, Speed::Normal);
      }
      _ => panic!("expected start"),
    }
  }

  #[test]
  fn server_messages_are_tagged() {
    let focus = serde_json::to_value(ServerMsg::Focus).unwrap();
    assert_eq!(focus, serde_json::json!({"type": "focus"}));
    let log = serde_json::to_value(ServerMsg::Log {
      text: "Round 1: correct".into(),
      time: "12:00:00".into(),
    })
    .unwrap();
    assert_eq!(log["type"], "log");
    assert_eq!(log["data"]["text"], "Round 1: correct");
  }
}
