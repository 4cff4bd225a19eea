use crate::game::{Event, session::GameSession};
use crate::models::{ClientAction, Device, ServerMsg};
use crate::state::AppState;
use crate::words::WordSource;
use axum::{
  Extension,
  extract::{
    State,
    ws::{Message, WebSocket, WebSocketUpgrade},
  },
  response::IntoResponse,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

pub async fn ws_handler(
  State(state): State<Arc<AppState>>,
  ws: WebSocketUpgrade,
  Extension(device): Extension<Device>,
) -> impl IntoResponse {
  let conn = Uuid::now_v7();
  ws.on_upgrade(move |socket| {
    handle_socket(socket, state, device).instrument(tracing::info_span!("ws", %conn, %device))
  })
}

impl From<ClientAction> for Event {
  fn from(action: ClientAction) -> Self {
    match action {
      ClientAction::Start { level, speed } => Event::Start { level, speed },
      ClientAction::Input { value } => Event::Input { value },
    }
  }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, device: Device) {
  let (sender, receiver) = socket.split();
  run_session(sender, receiver, state.words.clone(), device).await;
}

/// Drives one player's game over any message stream/sink pair.
pub(crate) async fn run_session<S, R>(
  mut sender: S,
  mut receiver: R,
  source: Arc<WordSource>,
  device: Device,
) where
  S: Sink<Message, Error = axum::Error> + Unpin,
  R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
  const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
  const CLIENT_TIMEOUT: Duration = Duration::from_secs(15);
  let mut heartbeat_interval = tokio::time::interval(HEARTBEAT_INTERVAL);
  heartbeat_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

  let mut session = GameSession::new(source, device);
  tracing::info!("player connected");

  // Initial State
  if send(&mut sender, &ServerMsg::Update(session.view()))
    .await
    .is_err()
  {
    return;
  }

  let mut last_heartbeat = Instant::now();

  loop {
    let outgoing = tokio::select! {
      msg = receiver.next() => {
        let Some(Ok(msg)) = msg else { break };
        last_heartbeat = Instant::now();
        match msg {
          Message::Text(text) => match serde_json::from_str::<ClientAction>(&text) {
            Ok(action) => {
              if let ClientAction::Start { level, speed } = &action {
                tracing::info!(%level, %speed, "game started");
              }
              session.dispatch(action.into())
            }
            Err(e) => {
              tracing::debug!("ignoring malformed message: {}", e);
              continue;
            }
          },
          Message::Close(_) => break,
          _ => continue,
        }
      }
      Some(event) = session.next_event() => session.dispatch(event),
      // Heartbeat check using interval to avoid reset on other events
      _ = heartbeat_interval.tick() => {
        if Instant::now().duration_since(last_heartbeat) > CLIENT_TIMEOUT {
          tracing::info!("client timed out");
          break;
        }
        if sender.send(Message::Ping(vec![].into())).await.is_err() {
          break;
        }
        continue;
      }
    };

    for msg in &outgoing {
      if let Err(e) = send(&mut sender, msg).await {
        tracing::debug!("send failed, closing: {}", e);
        return;
      }
    }
  }

  // 断开时 session 随之销毁，未触发的计时器一并取消
  tracing::info!(
    score = session.controller.score,
    round = session.controller.round,
    active = session.controller.is_game_active(),
    "player disconnected"
  );
}

async fn send<S>(sender: &mut S, msg: &ServerMsg) -> Result<(), axum::Error>
where
  S: Sink<Message, Error = axum::Error> + Unpin,
{
  let json = serde_json::to_string(msg).map_err(|e| {
    tracing::error!("failed to encode message: {}", e);
    axum::Error::new(e)
  })?;
  sender.send(Message::text(json)).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Level, WordRecord};
  use crate::words::MemoryWordStore;
  use futures::channel::mpsc;
  use serde_json::{Value, json};

  struct Client {
    tx: mpsc::UnboundedSender<Result<Message, axum::Error>>,
    rx: mpsc::UnboundedReceiver<Message>,
    pings: usize,
  }

  impl Client {
    fn send(&self, text: &str) {
      self
        .tx
        .unbounded_send(Ok(Message::text(text.to_string())))
        .unwrap();
    }

    fn act(&self, action: Value) {
      self.send(&action.to_string());
    }

    /// Next JSON frame, skipping pings. `None` once the server hangs up.
    async fn frame(&mut self) -> Option<Value> {
      loop {
        match self.rx.next().await? {
          Message::Ping(_) => self.pings += 1,
          Message::Text(text) => return Some(serde_json::from_str(&text).unwrap()),
          other => panic!("unexpected frame {:?}", other),
        }
      }
    }

    async fn update_until(&mut self, phase: &str) -> Value {
      loop {
        let f = self.frame().await.expect("server closed");
        if f["type"] == "update" && f["data"]["phase"] == phase {
          return f["data"].clone();
        }
      }
    }
  }

  fn connect() -> (Client, tokio::task::JoinHandle<()>) {
    let (client_tx, server_rx) = mpsc::unbounded();
    let (server_tx, client_rx) = mpsc::unbounded::<Message>();
    let records = (0..12)
      .map(|i| WordRecord {
        word: format!("word{}", i),
        level: Level::Easy,
      })
      .collect();
    let source = Arc::new(WordSource::new(
      Arc::new(MemoryWordStore::new(records)),
      Some(11),
    ));
    let task = tokio::spawn(run_session(
      server_tx.sink_map_err(axum::Error::new),
      server_rx,
      source,
      Device::Desktop,
    ));
    (
      Client {
        tx: client_tx,
        rx: client_rx,
        pings: 0,
      },
      task,
    )
  }

  #[tokio::test(start_paused = true)]
  async fn first_frame_is_idle_update() {
    let (mut client, _task) = connect();
    let f = client.frame().await.unwrap();
    assert_eq!(f["type"], "update");
    assert_eq!(f["data"]["phase"], "idle");
    assert_eq!(f["data"]["total_rounds"], 10);
  }

  #[tokio::test(start_paused = true)]
  async fn malformed_frames_get_no_reply() {
    let (mut client, _task) = connect();
    client.frame().await.unwrap();
    client.send("garbage");
    client.send(r#"{"type":"fly","data":{}}"#);
    client.act(json!({"type": "start", "data": {"level": "easy", "speed": "quick"}}));
    // the very next frame answers the start, nothing came back for the junk
    let f = client.frame().await.unwrap();
    assert_eq!(f["type"], "update");
    assert_eq!(f["data"]["phase"], "countdown");
    assert_eq!(f["data"]["countdown"], 3);
    assert_eq!(f["data"]["animation_ms"], 500);
  }

  #[tokio::test(start_paused = true)]
  async fn uppercase_word_scores_over_the_wire() {
    let (mut client, _task) = connect();
    client.frame().await.unwrap();
    client.act(json!({"type": "start", "data": {"level": "easy", "speed": "normal"}}));

    let playing = client.update_until("playing").await;
    let word = playing["word"].as_str().unwrap().to_string();
    assert!(word.starts_with("word"));
    assert_eq!(client.frame().await.unwrap(), json!({"type": "focus"}));

    client.act(json!({"type": "input", "data": {"value": word.to_uppercase()}}));
    let update = client.frame().await.unwrap();
    assert_eq!(update["type"], "update");
    assert_eq!(update["data"]["phase"], "resolved");
    assert_eq!(update["data"]["result_message"], "Correct!");
    assert_eq!(update["data"]["score"], 1);
    assert_eq!(update["data"]["round"], 1);
    assert!(update["data"].get("word").is_none());

    let log = client.frame().await.unwrap();
    assert_eq!(log["type"], "log");
    assert_eq!(log["data"]["text"], "Round 1: correct");

    let next = client.update_until("playing").await;
    assert_ne!(next["word"], playing["word"]);
  }

  #[tokio::test(start_paused = true)]
  async fn silent_client_is_pinged_then_dropped() {
    let (mut client, task) = connect();
    let t0 = tokio::time::Instant::now();
    client.frame().await.unwrap();
    assert!(client.frame().await.is_none());
    assert!(t0.elapsed() > Duration::from_secs(15));
    assert!(client.pings >= 3, "only {} pings", client.pings);
    task.await.unwrap();
  }
}
