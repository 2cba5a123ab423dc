//! Conversation engine for MeghAI.
//!
//! This crate owns the session state model and the submit lifecycle:
//! the draft text, the append-only exchange history, the busy guard,
//! and the provider seam the presentation layers call through.
//! It performs no I/O; HTTP lives in `meghai-api` and rendering in
//! `meghai-app`.

pub mod error;
pub mod input;
pub mod session;
pub mod state;

pub use error::ProviderError;
pub use session::{AnswerProvider, ConversationSession, SubmitOutcome};
pub use state::{ConversationState, Exchange, NO_ANSWER_FALLBACK};
