use thiserror::Error;

/// Failures surfaced by an [`AnswerProvider`](crate::AnswerProvider).
///
/// The user-visible behavior collapses all of these into one "submit
/// failed" outcome, but they are classified here so logs and diagnostics
/// can tell them apart. A success body that merely lacks the answer text
/// is not an error; providers resolve that with the fallback string.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The call exceeded the bounded wait configured on the client.
    #[error("provider call timed out")]
    Timeout,

    /// Connection-level failure before any HTTP status was received.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// A success status whose body could not be parsed.
    #[error("malformed provider response: {0}")]
    InvalidBody(String),
}
