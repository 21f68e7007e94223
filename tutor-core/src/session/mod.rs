//! Session management and the learning-loop orchestrator

pub mod manager;
pub mod orchestrator;
pub mod state;

// Re-export key types for convenience
pub use manager::SessionManager;
pub use orchestrator::{Orchestrator, TurnReply};
pub use state::{Session, SessionState};
