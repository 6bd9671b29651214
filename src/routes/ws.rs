//! WebSocket upgrade + session loop. Each connection owns at most one live
//! `Session`; client messages drive it and a one-second ticker drives its timer
//! while the timer is running.

use std::sync::Arc;
use std::time::Duration;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::logic::get_scenario;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::Session;
use crate::state::AppState;

#[instrument(level = "info", skip(state, ws))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "session", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn send_all(socket: &mut WebSocket, msgs: Vec<ServerWsMessage>) -> Result<(), axum::Error> {
  for m in msgs {
    let out = serde_json::to_string(&m).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    socket.send(Message::Text(out)).await?;
  }
  Ok(())
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "session", "WebSocket connected");
  let mut session: Option<Session> = None;
  let mut ticker = tokio::time::interval(Duration::from_secs(1));
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  loop {
    let running = session.as_ref().is_some_and(Session::timer_running);
    let replies = tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => match serde_json::from_str::<ClientWsMessage>(&txt) {
            Ok(m) => {
              debug!(target: "session", "WS received: {:?}", &m);
              // Start the ticker from a whole second when the timer starts.
              if matches!(m, ClientWsMessage::TimerToggle) && !running {
                ticker.reset();
              }
              handle_client_ws(m, &state, &mut session).await
            }
            Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
          },
          Message::Ping(payload) => {
            let _ = socket.send(Message::Pong(payload)).await;
            continue;
          }
          Message::Close(_) => break,
          _ => continue,
        }
      }
      _ = ticker.tick(), if running => {
        session.as_mut().map(Session::tick).unwrap_or_default()
      }
    };

    if let Err(e) = send_all(&mut socket, replies).await {
      error!(target: "session", error = %e, "WS send error");
      break;
    }
  }
  info!(target: "session", scenario_id = session.as_ref().map(Session::scenario_id), "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, session))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session: &mut Option<Session>) -> Vec<ServerWsMessage> {
  let no_session = || vec![ServerWsMessage::Error { message: "No open session. Send `open` first.".into() }];

  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::Open { scenario_id } => match get_scenario(state, &scenario_id).await {
      Ok(scenario) => match Session::open(&scenario) {
        Ok(s) => {
          info!(target: "session", %scenario_id, "Session opened");
          let first = s.activity();
          *session = Some(s);
          vec![first]
        }
        Err(e) => {
          warn!(target: "session", %scenario_id, error = %e, "Scenario cannot be run");
          vec![ServerWsMessage::Error { message: e.to_string() }]
        }
      },
      Err(e) => vec![ServerWsMessage::Error { message: e.to_string() }],
    },

    ClientWsMessage::Next => session.as_mut().map_or_else(no_session, |s| {
      let out = s.next();
      if matches!(out.first(), Some(ServerWsMessage::SessionComplete { .. })) {
        info!(target: "session", scenario_id = s.scenario_id(), "Session complete");
      }
      out
    }),
    ClientWsMessage::Previous => session.as_mut().map_or_else(no_session, Session::previous),
    ClientWsMessage::TimerToggle => session.as_mut().map_or_else(no_session, Session::toggle_timer),
    ClientWsMessage::TimerReset => session.as_mut().map_or_else(no_session, Session::reset_timer),

    ClientWsMessage::CloseSession => {
      if let Some(s) = session.take() {
        info!(target: "session", scenario_id = s.scenario_id(), "Session closed");
      }
      Vec::new()
    }
  }
}
