use crate::state::AppState;
use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use prism::{errors::ProtocolError, message::Message};
use serde_json::json;
use tracing::{info, warn};

async fn message_handler(
    State(state): State<AppState>,
    payload: Result<Json<Message>, JsonRejection>,
) -> Response {
    let Json(message) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };

    match state.dispatcher.dispatch(message).await {
        Ok(reply) => {
            info!(format = %reply.format, "outbound protocol message");
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(err) => {
            warn!(error = %err, "dispatch failed");
            error_response(status_for(&err), &err.to_string())
        }
    }
}

fn status_for(err: &ProtocolError) -> StatusCode {
    match err {
        ProtocolError::Payload(_) => StatusCode::BAD_REQUEST,
        ProtocolError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        ProtocolError::Backend { .. } => StatusCode::BAD_GATEWAY,
        ProtocolError::AggregationState(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "error": detail }))).into_response()
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/nlip", post(message_handler))
        .with_state(state)
}
