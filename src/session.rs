//! The conversation orchestrator: one request/response exchange at a time.
//!
//! A [`ChatSession`] owns the authoritative [`Conversation`] and composes
//! engine construction, prompt rendering, and the completion call into a
//! single exchange. Backend failures never escape an exchange: they are
//! logged, recorded in the conversation as a fixed sentinel reply, and
//! surfaced to the caller as a tagged [`Reply`] variant so a front-end can
//! render them distinctly from model output.
//!
//! Cancellation is per exchange. [`ChatSession::start_exchange`] hands the
//! front-end a [`StopHandle`] paired with that exchange alone; the token is
//! checked before the backend is contacted and between streamed chunks. A
//! stale handle cannot affect a later exchange.

use tokio_util::sync::CancellationToken;

use crate::chat::{Conversation, Turn};
use crate::engine::{ChatEngine, Completion, EngineFactory, OllamaEngineFactory};
use crate::ollama::api::OllamaApi;
use crate::prompt;
use crate::{error, ollama, warn};

pub(crate) const STOPPED_REPLY: &str = "Generation stopped by user.";
pub(crate) const NO_ANSWER_REPLY: &str = "The model returned no answer.";
pub(crate) const FAILED_REPLY: &str = "Something went wrong while processing the request.";

/// Outcome of a single exchange.
#[derive(Debug)]
pub(crate) enum Reply {
    /// The model's reply text.
    Answer(String),
    /// The backend resolved the request to an empty string.
    Empty,
    /// The exchange was cancelled before a reply was produced.
    Stopped,
    /// The backend invocation failed.
    Failed(ollama::Error),
}

impl Reply {
    /// The text recorded in the conversation and shown to the user: the
    /// reply itself, or a fixed sentinel for the failure variants.
    pub(crate) fn display_text(&self) -> &str {
        match self {
            Reply::Answer(text) => text,
            Reply::Empty => NO_ANSWER_REPLY,
            Reply::Stopped => STOPPED_REPLY,
            Reply::Failed(_) => FAILED_REPLY,
        }
    }
}

/// The result of submitting one line of user input.
pub(crate) struct Submission {
    /// Signals the front-end to clear its input box.
    pub cleared_input: String,
    /// The pairing view derived from the conversation log.
    pub transcript: Vec<(String, String)>,
    /// The tagged reply; absent when the input was empty and nothing ran.
    pub reply: Option<Reply>,
}

/// Cancels the one exchange it was created for.
pub(crate) struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// The token to pass to [`ChatSession::submit_with`].
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub(crate) fn stop(&self) {
        warn!("stopping generation");
        self.token.cancel();
    }
}

pub(crate) struct ChatSession {
    conversation: Conversation,
    engines: Box<dyn EngineFactory>,
}

impl ChatSession {
    pub(crate) fn new(engines: Box<dyn EngineFactory>) -> ChatSession {
        ChatSession {
            conversation: Conversation::new(),
            engines,
        }
    }

    pub(crate) fn with_backend(api: OllamaApi) -> ChatSession {
        Self::new(Box::new(OllamaEngineFactory::new(api)))
    }

    /// Begins a cancellable exchange. The returned handle stops the
    /// generation it is paired with and nothing else.
    pub(crate) fn start_exchange(&mut self) -> StopHandle {
        StopHandle {
            token: CancellationToken::new(),
        }
    }

    /// Submits one line of user input against `model` and runs the exchange
    /// to completion. Empty input is a no-op: no state changes and no
    /// backend contact.
    pub(crate) async fn submit(&mut self, message: &str, model: &str) -> Submission {
        self.submit_with(message, model, CancellationToken::new())
            .await
    }

    /// Like [`ChatSession::submit`], honoring a caller-supplied
    /// cancellation token from [`ChatSession::start_exchange`].
    pub(crate) async fn submit_with(
        &mut self,
        message: &str,
        model: &str,
        cancel: CancellationToken,
    ) -> Submission {
        if message.is_empty() {
            return Submission {
                cleared_input: String::new(),
                transcript: self.conversation.transcript(),
                reply: None,
            };
        }

        let engine = self.engines.engine(model);
        let reply = self.generate(message, engine.as_ref(), &cancel).await;

        Submission {
            cleared_input: String::new(),
            transcript: self.conversation.transcript(),
            reply: Some(reply),
        }
    }

    /// Runs one exchange: records the human turn, renders the prompt over
    /// the updated conversation, invokes the engine, and records the reply.
    /// Every attempt that reaches the conversation leaves exactly one human
    /// and one assistant turn behind, sentinel or not. An exchange cancelled
    /// before it starts leaves no trace at all.
    async fn generate(
        &mut self,
        input: &str,
        engine: &dyn ChatEngine,
        cancel: &CancellationToken,
    ) -> Reply {
        if cancel.is_cancelled() {
            warn!("generation cancelled before it started");
            return Reply::Stopped;
        }

        self.conversation.push(Turn::human(input.to_string()));

        let request = prompt::render(&self.conversation);

        let reply = match engine.complete(&request, cancel).await {
            Ok(Completion::Answer(text)) if text.is_empty() => Reply::Empty,
            Ok(Completion::Answer(text)) => Reply::Answer(text),
            Ok(Completion::Interrupted) => Reply::Stopped,
            Err(err) => {
                error!("completion failed: {}", err);
                Reply::Failed(err)
            }
        };

        self.conversation
            .push(Turn::assistant(reply.display_text().to_string()));

        reply
    }

    /// Resets the conversation to the seed greeting and returns the (empty)
    /// transcript.
    pub(crate) fn clear(&mut self) -> Vec<(String, String)> {
        self.conversation.reset();
        self.conversation.transcript()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ChatEngine;
    use crate::ollama::api::ChatMessage;
    use crate::ollama::ErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Copy)]
    enum Behavior {
        Answer(&'static str),
        EmptyAnswer,
        Fail,
        Interrupted,
    }

    struct StubEngine {
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ChatEngine for StubEngine {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _cancel: &CancellationToken,
        ) -> Result<Completion, ollama::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            match self.behavior {
                Behavior::Answer(text) => Ok(Completion::Answer(text.to_string())),
                Behavior::EmptyAnswer => Ok(Completion::Answer(String::new())),
                Behavior::Fail => Err(ollama::Error::from_kind(ErrorKind::InternalError)),
                Behavior::Interrupted => Ok(Completion::Interrupted),
            }
        }
    }

    struct StubFactory {
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    impl EngineFactory for StubFactory {
        fn engine(&self, _model: &str) -> Box<dyn ChatEngine> {
            Box::new(StubEngine {
                behavior: self.behavior,
                calls: self.calls.clone(),
            })
        }
    }

    fn stub_session(behavior: Behavior) -> (ChatSession, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));

        let session = ChatSession::new(Box::new(StubFactory {
            behavior,
            calls: calls.clone(),
        }));

        (session, calls)
    }

    #[tokio::test]
    async fn a_successful_exchange_records_both_turns() {
        let (mut session, _) = stub_session(Behavior::Answer("use a for loop"));

        let submission = session.submit("print hello world", "model-a").await;

        assert_eq!(submission.cleared_input, "");
        assert_eq!(
            submission.transcript,
            vec![(
                "print hello world".to_string(),
                "use a for loop".to_string()
            )]
        );
        assert!(matches!(submission.reply, Some(Reply::Answer(_))));
        assert_eq!(session.conversation.len(), 3);
    }

    #[tokio::test]
    async fn the_conversation_grows_by_two_turns_per_exchange() {
        let (mut session, _) = stub_session(Behavior::Answer("ok"));

        for i in 0..4 {
            session.submit(&format!("question {}", i), "model-a").await;
        }

        assert_eq!(session.conversation.len(), 1 + 2 * 4);
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let (mut session, calls) = stub_session(Behavior::Answer("ok"));

        let before = session.conversation.transcript();
        let submission = session.submit("", "model-a").await;

        assert!(submission.reply.is_none());
        assert_eq!(submission.transcript, before);
        assert_eq!(session.conversation.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn a_failing_backend_records_the_attempt_with_a_sentinel() {
        let (mut session, _) = stub_session(Behavior::Fail);

        let submission = session.submit("why does this crash", "model-a").await;

        let reply = submission.reply.unwrap();
        assert!(matches!(reply, Reply::Failed(_)));
        assert_eq!(reply.display_text(), FAILED_REPLY);

        assert_eq!(session.conversation.len(), 3);
        assert_eq!(session.conversation.turns()[2].content, FAILED_REPLY);
    }

    #[tokio::test]
    async fn an_empty_reply_is_substituted_with_the_no_answer_sentinel() {
        let (mut session, _) = stub_session(Behavior::EmptyAnswer);

        let submission = session.submit("hello", "model-a").await;

        assert!(matches!(submission.reply, Some(Reply::Empty)));
        assert_eq!(
            submission.transcript,
            vec![("hello".to_string(), NO_ANSWER_REPLY.to_string())]
        );
    }

    #[tokio::test]
    async fn an_interrupted_stream_records_the_stopped_sentinel() {
        let (mut session, _) = stub_session(Behavior::Interrupted);

        let submission = session.submit("hello", "model-a").await;

        assert!(matches!(submission.reply, Some(Reply::Stopped)));
        assert_eq!(session.conversation.turns()[2].content, STOPPED_REPLY);
    }

    #[tokio::test]
    async fn a_stopped_exchange_never_contacts_the_backend() {
        let (mut session, calls) = stub_session(Behavior::Answer("ok"));

        let stop = session.start_exchange();
        stop.stop();

        let submission = session.submit_with("hello", "model-a", stop.token()).await;

        assert!(matches!(submission.reply, Some(Reply::Stopped)));
        assert_eq!(session.conversation.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn a_stale_stop_does_not_affect_the_next_exchange() {
        let (mut session, _) = stub_session(Behavior::Answer("a real reply"));

        let stale = session.start_exchange();
        stale.stop();

        let submission = session.submit("still there?", "model-a").await;

        match submission.reply {
            Some(Reply::Answer(text)) => assert_eq!(text, "a real reply"),
            other => panic!("expected a real reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn clear_resets_to_the_seed_turn() {
        let (mut session, _) = stub_session(Behavior::Answer("ok"));

        session.submit("hello", "model-a").await;
        assert_eq!(session.conversation.len(), 3);

        let transcript = session.clear();

        assert!(transcript.is_empty());
        assert_eq!(session.conversation.len(), 1);
    }
}
