use crate::models::{ClientView, Device, GamePhase, Level, Speed};
use std::time::Duration;

pub mod session;

pub const ROUNDS: usize = 10;
pub const COUNTDOWN_FROM: u8 = 3;
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
pub const ADVANCE_DELAY: Duration = Duration::from_millis(1500);
pub const LOADING_MESSAGE: &str = "Loading words...";

pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  Start { level: Level, speed: Speed },
  Tick { session: SessionId },
  WordsLoaded {
    session: SessionId,
    result: Result<Vec<String>, String>,
  },
  Input { value: String },
  Advance { session: SessionId },
}

impl Event {
  /// The session a scheduled event belongs to. User-driven events have none.
  pub fn session(&self) -> Option<SessionId> {
    match self {
      Self::Tick { session } | Self::WordsLoaded { session, .. } | Self::Advance { session } => {
        Some(*session)
      }
      Self::Start { .. } | Self::Input { .. } => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
  /// Abort everything scheduled for earlier sessions.
  CancelScheduled,
  FetchWords { session: SessionId, level: Level },
  ScheduleTick { session: SessionId, after: Duration },
  ScheduleAdvance { session: SessionId, after: Duration },
  FocusInput,
  Log(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundState {
  pub current_word: String,
  pub input_value: String,
  pub is_round_over: bool,
  pub show_word: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fetch {
  Idle,
  Pending,
  Ready(Vec<String>),
  Failed(String),
}

/// One player's game. All transitions go through [`GameController::handle`],
/// which never blocks and reports timers and fetches as [`Effect`]s.
#[derive(Debug, Clone)]
pub struct GameController {
  pub session: SessionId,
  pub phase: GamePhase,
  pub level: Level,
  pub speed: Speed,
  pub device: Device,
  /// Rounds answered correctly.
  pub score: usize,
  /// Rounds attempted so far; the word on screen is `batch[round]`.
  pub round: usize,
  pub countdown: Option<u8>,
  pub result_message: String,
  pub round_state: RoundState,
  batch: Vec<String>,
  fetch: Fetch,
}

impl GameController {
  pub fn new(device: Device) -> Self {
    Self {
      session: 0,
      phase: GamePhase::Idle,
      level: Level::default(),
      speed: Speed::default(),
      device,
      score: 0,
      round: 0,
      countdown: None,
      result_message: String::new(),
      round_state: RoundState::default(),
      batch: Vec::new(),
      fetch: Fetch::Idle,
    }
  }

  pub fn is_game_active(&self) -> bool {
    matches!(self.phase, GamePhase::Playing | GamePhase::Resolved)
  }

  pub fn handle(&mut self, event: Event) -> Vec<Effect> {
    if let Some(session) = event.session() {
      if session != self.session {
        tracing::debug!(session, current = self.session, "dropping stale event");
        return vec![];
      }
    }

    match event {
      Event::Start { level, speed } => self.start(level, speed),
      Event::Tick { .. } => self.tick(),
      Event::WordsLoaded { result, .. } => self.words_loaded(result),
      Event::Input { value } => self.input(value),
      Event::Advance { .. } => {
        if self.phase != GamePhase::Resolved {
          return vec![];
        }
        self.start_round()
      }
    }
  }

  fn start(&mut self, level: Level, speed: Speed) -> Vec<Effect> {
    self.session += 1;
    self.level = level;
    self.speed = speed;
    self.score = 0;
    self.round = 0;
    self.round_state = RoundState::default();
    self.result_message.clear();
    self.batch.clear();
    self.fetch = Fetch::Pending;
    self.countdown = Some(COUNTDOWN_FROM);
    self.phase = GamePhase::Countdown;

    vec![
      Effect::CancelScheduled,
      Effect::FetchWords {
        session: self.session,
        level,
      },
      Effect::ScheduleTick {
        session: self.session,
        after: COUNTDOWN_TICK,
      },
    ]
  }

  fn tick(&mut self) -> Vec<Effect> {
    if self.phase != GamePhase::Countdown {
      return vec![];
    }
    match self.countdown {
      Some(n) if n > 1 => {
        self.countdown = Some(n - 1);
        vec![Effect::ScheduleTick {
          session: self.session,
          after: COUNTDOWN_TICK,
        }]
      }
      Some(_) => {
        self.countdown = None;
        self.try_begin()
      }
      None => vec![],
    }
  }

  fn words_loaded(&mut self, result: Result<Vec<String>, String>) -> Vec<Effect> {
    if self.phase != GamePhase::Countdown || self.fetch != Fetch::Pending {
      return vec![];
    }
    self.fetch = match result {
      Ok(words) => Fetch::Ready(words),
      Err(msg) => Fetch::Failed(msg),
    };
    // 倒计时已结束则立即开始
    if self.countdown.is_none() {
      self.try_begin()
    } else {
      vec![]
    }
  }

  // Countdown is over; start playing once the batch is in.
  fn try_begin(&mut self) -> Vec<Effect> {
    match std::mem::replace(&mut self.fetch, Fetch::Idle) {
      Fetch::Pending => {
        self.fetch = Fetch::Pending;
        self.result_message = LOADING_MESSAGE.into();
        vec![]
      }
      Fetch::Idle => vec![],
      Fetch::Failed(msg) => self.abort(format!("Could not load words: {}", msg)),
      Fetch::Ready(words) if words.len() < ROUNDS => self.abort(format!(
        "Not enough {} words to play ({} of {})",
        self.level,
        words.len(),
        ROUNDS
      )),
      Fetch::Ready(words) => {
        self.batch = words;
        self.start_round()
      }
    }
  }

  fn abort(&mut self, message: String) -> Vec<Effect> {
    tracing::warn!(session = self.session, "game aborted: {}", message);
    self.phase = GamePhase::Idle;
    self.countdown = None;
    self.result_message = message.clone();
    vec![Effect::Log(message)]
  }

  fn start_round(&mut self) -> Vec<Effect> {
    if self.round >= ROUNDS {
      return self.end_game();
    }
    self.phase = GamePhase::Playing;
    self.result_message.clear();
    self.round_state = RoundState {
      current_word: self.batch[self.round].clone(),
      input_value: String::new(),
      is_round_over: false,
      show_word: true,
    };
    vec![Effect::FocusInput]
  }

  fn input(&mut self, value: String) -> Vec<Effect> {
    if self.phase != GamePhase::Playing || self.round_state.is_round_over {
      return vec![];
    }
    let typed = value.to_lowercase();
    self.round_state.input_value = value;
    let word = self.round_state.current_word.to_lowercase();

    if word.starts_with(&typed) {
      if typed == word {
        self.resolve(true)
      } else {
        vec![]
      }
    } else {
      self.resolve(false)
    }
  }

  fn resolve(&mut self, correct: bool) -> Vec<Effect> {
    self.round_state.is_round_over = true;
    self.round_state.show_word = false;
    self.round += 1;
    if correct {
      self.score += 1;
      self.result_message = "Correct!".into();
    } else {
      self.result_message = format!(
        "Too bad! The answer was \"{}\"",
        self.round_state.current_word
      );
    }
    self.phase = GamePhase::Resolved;

    vec![
      Effect::Log(format!(
        "Round {}: {}",
        self.round,
        if correct { "correct" } else { "missed" }
      )),
      Effect::ScheduleAdvance {
        session: self.session,
        after: ADVANCE_DELAY,
      },
    ]
  }

  fn end_game(&mut self) -> Vec<Effect> {
    self.phase = GamePhase::Ended;
    self.round_state.show_word = false;
    self.result_message = summary_message(self.score);
    vec![Effect::Log(format!("Game over: {}/{}", self.score, ROUNDS))]
  }

  pub fn view(&self) -> ClientView {
    ClientView {
      phase: self.phase,
      level: self.level,
      speed: self.speed,
      countdown: self.countdown,
      round: self.round,
      total_rounds: ROUNDS,
      score: self.score,
      word: self
        .round_state
        .show_word
        .then(|| self.round_state.current_word.clone()),
      is_round_over: self.round_state.is_round_over,
      result_message: self.result_message.clone(),
      animation_ms: self.speed.display_duration(self.device).as_millis() as u64,
    }
  }
}

pub fn summary_message(score: usize) -> String {
  if score == 0 {
    "Too bad. Try again one level easier!".to_string()
  } else {
    format!("Congratulations! Your accuracy is {}%!", score * 100 / ROUNDS)
  }
}
