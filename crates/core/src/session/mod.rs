//! Chat sessions and the turn coordinator.

mod assistant;
mod chat;

pub use assistant::{Assistant, TurnOutcome};
pub use chat::{AppliedReply, ChatMessage, ChatSession, SessionSnapshot, DISPATCH_ERROR_MESSAGE};
