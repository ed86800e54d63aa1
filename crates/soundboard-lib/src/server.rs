//! HTTP API for the soundboard host.
//!
//! Runs on port 2004 by default, leaving 2003 to the TTS server.
//! Handlers recognize the intent and return right away; the skill handler
//! itself runs on the blocking pool since a clip cycle sleeps.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::error;

use soundboard_core::types::{Message, SkillStatus};

use crate::host::IntentHandler;
use crate::intents::IntentRouter;
use crate::skill::SoundboardSkill;

/// Shared state of the HTTP API.
#[derive(Clone)]
pub struct ApiState {
    pub skill: Arc<SoundboardSkill>,
    pub intents: Arc<IntentRouter>,
}

/// Build the axum router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/utterance", post(utterance))
        .route("/intent/{name}", post(intent))
        .route("/stop", post(stop))
        .route("/status", get(status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct UtteranceRequest {
    utterance: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DispatchResponse {
    pub ok: bool,
    pub intent: Option<String>,
}

#[derive(serde::Serialize)]
struct OkResponse {
    ok: bool,
}

/// Run a handler off the async workers; failures end up in the log.
fn run_detached(handler: IntentHandler, message: Message) {
    tokio::task::spawn_blocking(move || {
        if let Err(e) = handler(&message) {
            error!("intent {} failed: {e}", message.intent);
        }
    });
}

async fn utterance(
    State(state): State<ApiState>,
    Json(req): Json<UtteranceRequest>,
) -> Json<DispatchResponse> {
    match state.intents.recognize(&req.utterance) {
        Some((message, handler)) => {
            let intent = message.intent.clone();
            run_detached(handler, message);
            Json(DispatchResponse {
                ok: true,
                intent: Some(intent),
            })
        }
        None => Json(DispatchResponse {
            ok: false,
            intent: None,
        }),
    }
}

async fn intent(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> (StatusCode, Json<DispatchResponse>) {
    let Some(handler) = state.intents.handler(&name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(DispatchResponse {
                ok: false,
                intent: None,
            }),
        );
    };
    run_detached(handler, Message::new(name.clone(), ""));
    (
        StatusCode::OK,
        Json(DispatchResponse {
            ok: true,
            intent: Some(name),
        }),
    )
}

async fn stop(State(state): State<ApiState>) -> Json<OkResponse> {
    state.skill.stop();
    Json(OkResponse { ok: true })
}

async fn status(State(state): State<ApiState>) -> Json<SkillStatus> {
    Json(state.skill.status())
}
