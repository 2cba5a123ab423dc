use serde::Serialize;

/// Fallback answer recorded when a success response is missing the
/// expected text path (first candidate -> first content part -> text).
pub const NO_ANSWER_FALLBACK: &str = "No answer found.";

/// One question/answer pair recorded after a successful provider call.
/// Immutable once inserted into the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// Mutable state of one conversation session.
///
/// Exactly one writer exists per instance. Overlapping submissions are
/// prevented by the busy flag, not by a lock: [`begin_submit`] checks and
/// acquires it in a single synchronous step, so no suspension can slip
/// between the check and the acquire.
///
/// [`begin_submit`]: ConversationState::begin_submit
#[derive(Debug, Default, Clone)]
pub struct ConversationState {
    draft: String,
    history: Vec<Exchange>,
    busy: bool,
    last_error: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the draft unconditionally. No validation.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// The transcript, oldest exchange first. Append-only; entries are
    /// never edited, reordered, or deleted.
    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// True strictly between submit-accepted and provider-call-settled.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The failure notice from the most recent failed submission, if it
    /// has not been dismissed or superseded by a success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Validate the draft and acquire the busy flag.
    ///
    /// Returns the trimmed prompt when a submission may start. Returns
    /// `None` with no state change when the trimmed draft is empty or a
    /// provider call is already in flight.
    pub fn begin_submit(&mut self) -> Option<String> {
        let prompt = self.draft.trim();
        if prompt.is_empty() || self.busy {
            return None;
        }
        let prompt = prompt.to_string();
        self.busy = true;
        Some(prompt)
    }

    /// Record a successful exchange: append it, clear the draft and any
    /// stale error notice, and release the busy flag.
    pub fn settle_success(&mut self, question: String, answer: String) {
        self.history.push(Exchange { question, answer });
        self.draft.clear();
        self.last_error = None;
        self.busy = false;
    }

    /// Record a failed submission and release the busy flag. The draft is
    /// kept so the user can retry; the history is untouched.
    pub fn settle_failure(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
        self.busy = false;
    }

    /// Clear the visible error notice without submitting.
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }
}
