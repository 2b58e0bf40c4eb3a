use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use prism::message::Message;
use tracing::info;

/// Start (or reset to) a fresh conversation and hand the caller its token
async fn start_handler(State(state): State<AppState>) -> Json<Message> {
    let conversation = state.dispatcher.store().start();
    info!(conversation = %conversation, "conversation started");

    let reply = Message::text(
        "Conversation started. Include the conversation token when resubmitting redirect replies.",
    )
    .with_control()
    .with_submessages(vec![Message::token(&conversation)]);

    Json(reply)
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/nlip/start", post(start_handler))
        .with_state(state)
}
