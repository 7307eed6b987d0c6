//! Inbound webhook endpoint for the messaging platform.
//!
//! A text message carrying an artist id triggers one analysis request.
//! The endpoint acknowledges immediately; the flow itself runs as a
//! detached task so slow catalogs never stall webhook delivery.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::{debug, info};

use crate::delivery;

use super::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: Option<EventSource>,
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
pub struct EventSource {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<String>,
}

pub async fn receive_webhook(
    State(state): State<ServerState>,
    Json(payload): Json<WebhookPayload>,
) -> StatusCode {
    for event in payload.events {
        let Some((user_id, artist_id)) = text_message_request(&event) else {
            debug!("Ignoring webhook event of type {}", event.event_type);
            continue;
        };

        info!(
            "Analysis request from user {} for artist {}",
            user_id, artist_id
        );

        let state = state.clone();
        tokio::spawn(async move {
            delivery::run_analysis_request(
                state.catalog.as_ref(),
                state.analysis.as_ref(),
                state.push.as_ref(),
                state.file_store.as_ref(),
                state.delivery_mode,
                &user_id,
                &artist_id,
            )
            .await;
        });
    }

    StatusCode::OK
}

/// Extract (user id, artist id) from a text-message event. Anything else
/// (follow events, stickers, messages without a user) is ignored.
fn text_message_request(event: &WebhookEvent) -> Option<(String, String)> {
    if event.event_type != "message" {
        return None;
    }
    let message = event.message.as_ref()?;
    if message.message_type != "text" {
        return None;
    }
    let user_id = event.source.as_ref()?.user_id.clone()?;
    let artist_id = message.text.as_ref()?.trim().to_string();
    if artist_id.is_empty() {
        return None;
    }
    Some((user_id, artist_id))
}
