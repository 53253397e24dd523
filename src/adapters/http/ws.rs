use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::adapters::http::state::HttpState;
use crate::domain::ui::UiEvent;

pub async fn ws_handler(ws: WebSocketUpgrade, State(st): State<HttpState>) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, st))
}

async fn handle_socket(mut socket: WebSocket, st: HttpState) {
    let mut rx = st.hub.subscribe();

    for event in hello_events(&st) {
        if send_event(&mut socket, &event).await.is_err() {
            return;
        }
    }

    loop {
        match rx.recv().await {
            Ok(event) => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(n)) => warn!("WebSocket lento: {} eventos descartados", n),
            Err(RecvError::Closed) => break,
        }
    }
    debug!("WebSocket de eventos cerrado");
}

/// Estado actual al conectar, más la última notificación de carga del modelo,
/// para que una página que llega tarde no se pierda ninguna de las dos.
pub(crate) fn hello_events(st: &HttpState) -> Vec<UiEvent> {
    let mut events = vec![UiEvent::Status { message: st.model.status() }];
    if let Some((message, severity)) = st.model.last_notice() {
        events.push(UiEvent::Notification { message, severity });
    }
    events
}

async fn send_event(socket: &mut WebSocket, event: &UiEvent) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).unwrap_or_default();
    socket.send(Message::Text(json)).await
}
