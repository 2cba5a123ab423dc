use async_trait::async_trait;

use crate::error::ProviderError;
use crate::state::{ConversationState, Exchange};

/// The external generative-text endpoint, treated as an opaque
/// collaborator.
///
/// Implementations resolve the protocol-level gap themselves: a success
/// body that lacks the expected answer text yields
/// `Ok(NO_ANSWER_FALLBACK)`, not an error. Errors are reserved for
/// transport failures (network, timeout, non-success status, unparseable
/// body).
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn answer(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Result of a single [`ConversationSession::submit`] call, for
/// presentation layers to render without inspecting session internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The provider answered; one exchange was appended to the history.
    Answered(Exchange),
    /// Blank draft or a call already in flight; nothing changed.
    Rejected,
    /// The provider call failed; draft and history are untouched and the
    /// message is recorded as the session's visible error notice.
    Failed(String),
}

/// One conversation session: the state plus the provider it submits to.
///
/// `submit` is the sole effectful operation. The session never crashes on
/// a failed exchange and never loses the user's draft to one.
pub struct ConversationSession<P> {
    state: ConversationState,
    provider: P,
}

impl<P: AnswerProvider> ConversationSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            state: ConversationState::new(),
            provider,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.set_draft(text);
    }

    pub fn dismiss_error(&mut self) {
        self.state.dismiss_error();
    }

    /// Validate, acquire the busy flag, call the provider, settle.
    ///
    /// The busy flag is acquired before the suspend point and released on
    /// every settle path, success or failure.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(question) = self.state.begin_submit() else {
            return SubmitOutcome::Rejected;
        };

        match self.provider.answer(&question).await {
            Ok(answer) => {
                self.state.settle_success(question.clone(), answer.clone());
                SubmitOutcome::Answered(Exchange { question, answer })
            }
            Err(err) => {
                let message = err.to_string();
                self.state.settle_failure(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that echoes a canned answer and counts outbound calls.
    struct ScriptedProvider {
        reply: Result<String, fn() -> ProviderError>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn answering(answer: &str) -> Self {
            Self {
                reply: Ok(answer.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(err: fn() -> ProviderError) -> Self {
            Self {
                reply: Err(err),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnswerProvider for ScriptedProvider {
        async fn answer(&self, prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(answer) => Ok(format!("{answer}{prompt}")),
                Err(err) => Err(err()),
            }
        }
    }

    #[tokio::test]
    async fn successful_submit_appends_and_clears_draft() {
        let mut session = ConversationSession::new(ScriptedProvider::answering("echo: "));
        session.set_draft("Q");

        let outcome = session.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Answered(Exchange {
                question: "Q".into(),
                answer: "echo: Q".into()
            })
        );
        assert_eq!(session.state().history().len(), 1);
        assert_eq!(session.state().draft(), "");
        assert!(!session.state().is_busy());
    }

    #[tokio::test]
    async fn blank_draft_makes_no_outbound_call() {
        let mut session = ConversationSession::new(ScriptedProvider::answering("unused"));
        session.set_draft("   \n");

        assert_eq!(session.submit().await, SubmitOutcome::Rejected);
        assert_eq!(session.state().history().len(), 0);
        assert_eq!(session.provider.calls(), 0);
    }

    #[tokio::test]
    async fn failed_submit_preserves_draft_and_history() {
        let mut session = ConversationSession::new(ScriptedProvider::failing(|| {
            ProviderError::Network("connection refused".into())
        }));
        session.set_draft("retry me");

        let outcome = session.submit().await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(session.state().draft(), "retry me");
        assert_eq!(session.state().history().len(), 0);
        assert!(!session.state().is_busy());
        assert!(session.state().last_error().is_some());
        assert_eq!(session.provider.calls(), 1);
    }

    #[tokio::test]
    async fn timeout_is_a_recoverable_failure() {
        let mut session =
            ConversationSession::new(ScriptedProvider::failing(|| ProviderError::Timeout));
        session.set_draft("slow question");

        match session.submit().await {
            SubmitOutcome::Failed(message) => assert!(message.contains("timed out")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(!session.state().is_busy());
    }

    #[tokio::test]
    async fn sequential_submits_keep_order_and_clear_error() {
        let mut session = ConversationSession::new(ScriptedProvider::answering("a:"));

        session.set_draft("lost");
        session.state.begin_submit().unwrap();
        session.state.settle_failure("transient");
        assert!(session.state().last_error().is_some());

        for prompt in ["one", "two", "three"] {
            session.set_draft(prompt);
            session.submit().await;
        }

        let questions: Vec<&str> = session
            .state()
            .history()
            .iter()
            .map(|e| e.question.as_str())
            .collect();
        assert_eq!(questions, ["one", "two", "three"]);
        // A success clears the stale failure notice.
        assert_eq!(session.state().last_error(), None);
    }
}
