//! WebSocket Listener Endpoint
//!
//! Upgrades `/ws` connections and forwards every `market_update`
//! publication to the client as a JSON text frame. Listeners may join and
//! leave at any time; a new listener only sees future publications and can
//! query `/all` on connect for the current snapshot.

use std::collections::HashMap;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::quote::QuoteRecord;
use crate::infrastructure::broadcast::{MARKET_UPDATE_EVENT, MarketUpdate};

use super::controller::AppState;

/// Wire shape of one listener-facing event frame.
#[derive(Debug, Serialize)]
struct MarketUpdateEvent {
    event: &'static str,
    data: HashMap<String, QuoteRecord>,
    timestamp: DateTime<Utc>,
}

impl From<MarketUpdate> for MarketUpdateEvent {
    fn from(update: MarketUpdate) -> Self {
        Self {
            event: MARKET_UPDATE_EVENT,
            data: update.data,
            timestamp: update.timestamp,
        }
    }
}

/// WebSocket upgrade handler for market update listeners.
pub async fn market_updates_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.hub.subscribe();

    tracing::debug!("Market update listener connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => {
                    let event = MarketUpdateEvent::from(update);
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Best-effort delivery: slow listeners miss updates.
                    tracing::warn!(skipped, "Listener lagged behind broadcast channel");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Drain client frames so disconnects are observed.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!("Market update listener disconnected");
}
