use super::{Effect, Event, GameController};
use crate::models::{ClientView, Device, ServerMsg};
use crate::words::WordSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Runs timer and fetch effects on tokio, feeding their outcome back as events.
pub struct Scheduler {
  source: Arc<WordSource>,
  tx: mpsc::UnboundedSender<Event>,
  tasks: Vec<AbortHandle>,
}

impl Scheduler {
  pub fn new(source: Arc<WordSource>, tx: mpsc::UnboundedSender<Event>) -> Self {
    Self {
      source,
      tx,
      tasks: Vec::new(),
    }
  }

  /// Executes the effects it owns and hands back the ones meant for the client.
  pub fn run(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
    self.tasks.retain(|t| !t.is_finished());
    let mut rest = Vec::new();
    for effect in effects {
      match effect {
        Effect::CancelScheduled => self.cancel_all(),
        Effect::FetchWords { session, level } => {
          let source = self.source.clone();
          let tx = self.tx.clone();
          let handle = tokio::spawn(async move {
            let result = source
              .batch(Some(level))
              .await
              .map_err(|e| format!("{:#}", e));
            if let Err(e) = &result {
              tracing::error!(session, "word fetch failed: {}", e);
            }
            let _ = tx.send(Event::WordsLoaded { session, result });
          });
          self.tasks.push(handle.abort_handle());
        }
        Effect::ScheduleTick { session, after } => {
          self.schedule(after, Event::Tick { session });
        }
        Effect::ScheduleAdvance { session, after } => {
          self.schedule(after, Event::Advance { session });
        }
        other => rest.push(other),
      }
    }
    rest
  }

  fn schedule(&mut self, after: Duration, event: Event) {
    let tx = self.tx.clone();
    let handle = tokio::spawn(async move {
      tokio::time::sleep(after).await;
      let _ = tx.send(event);
    });
    self.tasks.push(handle.abort_handle());
  }

  pub fn cancel_all(&mut self) {
    for t in self.tasks.drain(..) {
      t.abort();
    }
  }

  #[cfg(test)]
  pub fn pending(&self) -> usize {
    self.tasks.iter().filter(|t| !t.is_finished()).count()
  }
}

impl Drop for Scheduler {
  fn drop(&mut self) {
    self.cancel_all();
  }
}

/// A controller plus the tasks working on its behalf; one per connection.
pub struct GameSession {
  pub controller: GameController,
  scheduler: Scheduler,
  events: mpsc::UnboundedReceiver<Event>,
}

impl GameSession {
  pub fn new(source: Arc<WordSource>, device: Device) -> Self {
    let (tx, events) = mpsc::unbounded_channel();
    Self {
      controller: GameController::new(device),
      scheduler: Scheduler::new(source, tx),
      events,
    }
  }

  /// Next event produced by a timer or fetch. Never yields `None` while the
  /// session is alive since it holds a sender itself.
  pub async fn next_event(&mut self) -> Option<Event> {
    self.events.recv().await
  }

  /// Applies one event and returns what should be pushed to the client.
  pub fn dispatch(&mut self, event: Event) -> Vec<ServerMsg> {
    let effects = self.controller.handle(event);
    let mut out: Vec<ServerMsg> = self
      .scheduler
      .run(effects)
      .into_iter()
      .filter_map(|e| match e {
        Effect::FocusInput => Some(ServerMsg::Focus),
        Effect::Log(text) => Some(ServerMsg::Log {
          text,
          time: chrono::Local::now().format("%H:%M:%S").to_string(),
        }),
        _ => None,
      })
      .collect();
    out.insert(0, ServerMsg::Update(self.view()));
    out
  }

  pub fn view(&self) -> ClientView {
    self.controller.view()
  }
}
