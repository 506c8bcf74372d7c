//! Application layer for Parley.
//!
//! The conversation and attachment orchestrator behind the chat view:
//! staging and processing attachments, exchanging messages and switching
//! sessions, all against one shared state. Remote services are reached only
//! through the collaborator traits in `parley-core`.

mod attachment_stager;
mod context;
mod exchange;
mod orchestrator;
mod polling;
mod session_switch;
mod state;

#[cfg(test)]
mod test_support;

pub use context::{NoticeReceiver, OrchestratorSettings};
pub use exchange::SendOutcome;
pub use orchestrator::ChatOrchestrator;
pub use polling::PollOutcome;
pub use session_switch::{SwitchOutcome, UpdateOutcome};
pub use state::{ChatState, SendRejection, SwitchRejection};
