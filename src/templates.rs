use crate::models::{Device, Level, Speed};
use askama::Template;

pub struct Choice {
  pub value: String,
  pub checked: bool,
}

#[derive(Template)]
#[template(path = "game.html")]
pub struct GameTemplate {
  pub is_mobile: bool,
  pub levels: Vec<Choice>,
  pub speeds: Vec<Choice>,
}

fn choices<T: ToString + PartialEq>(all: &[T], default: T) -> Vec<Choice> {
  all
    .iter()
    .map(|v| Choice {
      value: v.to_string(),
      checked: *v == default,
    })
    .collect()
}

pub fn render_game(device: Device) -> GameTemplate {
  GameTemplate {
    is_mobile: device == Device::Mobile,
    levels: choices(&[Level::Easy, Level::Normal, Level::Hard], Level::default()),
    speeds: choices(&[Speed::Slow, Speed::Normal, Speed::Quick], Speed::default()),
  }
}
