//! Gemini client for MeghAI.
//!
//! Implements the `AnswerProvider` seam over the generative-language
//! `generateContent` endpoint: one POST per question, answer text pulled
//! from the first candidate's first content part.

mod gemini;

pub use gemini::{
    GeminiClient, GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
