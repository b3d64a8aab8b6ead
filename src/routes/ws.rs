//! WebSocket upgrade + message loop for the live interview. Each client message is
//! parsed as JSON and forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::errors::AppError;
use crate::logic;
use crate::protocol::{session_view, AnswerOut, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "interview_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "interview_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "interview_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { code: "VALIDATION_ERROR".into(), message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "code": "INTERNAL", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "interview_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "interview_backend", "WebSocket disconnected");
}

async fn handle_client_ws(msg: ClientWsMessage, state: &Arc<AppState>) -> ServerWsMessage {
  let result = match msg {
    ClientWsMessage::Ping => return ServerWsMessage::Pong,
    ClientWsMessage::Session => Ok(()),
    ClientWsMessage::Draft { text } => logic::update_draft(state, &text).await,
    ClientWsMessage::Submit { question_id, text, time_spent } => {
      return match logic::submit_answer(state, &question_id, &text, time_spent).await {
        Ok((outcome, evaluation)) => {
          info!(target: "interview", %question_id, score = evaluation.score, "WS answer evaluated");
          ServerWsMessage::AnswerResult(AnswerOut::new(outcome, evaluation))
        }
        Err(e) => error_msg(e),
      };
    }
    ClientWsMessage::Pause => logic::pause(state).await.map(|_| ()),
    ClientWsMessage::Resume => logic::resume(state).await.map(|_| ()),
  };

  match result {
    Ok(()) => ServerWsMessage::Session { session: state.read(session_view).await },
    Err(e) => error_msg(e),
  }
}

fn error_msg(e: AppError) -> ServerWsMessage {
  ServerWsMessage::Error { code: e.code().into(), message: e.to_string() }
}
