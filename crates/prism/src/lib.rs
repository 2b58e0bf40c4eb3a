pub mod artifacts;
pub mod backends;
pub mod conversation;
pub mod dispatcher;
pub mod errors;
pub mod message;
pub mod orchestrator;
pub mod providers;
pub mod selection;
