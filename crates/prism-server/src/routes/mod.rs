// Export route modules
pub mod conversation;
pub mod message;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(conversation::routes(state.clone()))
        .merge(message::routes(state))
}
