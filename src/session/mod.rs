//! Conversation session.
//!
//! A [`ConversationSession`] owns one conversation: its message list, its
//! continuity token and at most one in-flight turn. Each send spawns a relay
//! task that pulls records from the [`ChatStreamClient`] and forwards them,
//! tagged with the turn id, over a bounded channel. The session is the only
//! writer of its state; it applies relay updates one at a time from
//! [`next_update`](ConversationSession::next_update) and drops anything that
//! belongs to a turn that is no longer active.

mod accumulator;
mod continuity;
mod message;
mod splitter;
mod state;

pub use accumulator::ResponseAccumulator;
pub use continuity::ContinuityToken;
pub use message::{
    tutor_greeting, ChatMessage, EMPTY_ANSWER_FALLBACK, STOPPED_MARKER, THINKING_PLACEHOLDER,
    TRANSIENT_FAILURE_FALLBACK,
};
pub use splitter::{split_assistant, split_user, ContentSplitter, ParsedContent, ReasoningMarkers};
pub use state::{SessionStatus, TurnId};

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::error::{FailureKind, StreamError};
use crate::stream::{CancelHandle, CancelSignal, ChatRequest, ChatStreamClient, EventRecord};
use crate::traits::{HttpClient, IdGenerator};

/// Relay updates buffered between transport and session.
const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// What a call to [`ConversationSession::next_update`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A fragment was appended to the active answer
    Fragment { turn: TurnId, text: String },
    /// The turn completed with an answer
    Settled {
        turn: TurnId,
        conversation_id: Option<String>,
    },
    /// The turn ended with a fallback message
    Failed { turn: TurnId, kind: FailureKind },
}

impl SessionEvent {
    pub fn turn(&self) -> TurnId {
        match self {
            SessionEvent::Fragment { turn, .. }
            | SessionEvent::Settled { turn, .. }
            | SessionEvent::Failed { turn, .. } => *turn,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionEvent::Fragment { .. })
    }
}

#[derive(Debug)]
enum UpdateKind {
    Record(EventRecord),
    Failed(StreamError),
    /// Body ended without a completion record
    Closed,
}

#[derive(Debug)]
struct TurnUpdate {
    turn: TurnId,
    kind: UpdateKind,
}

/// The turn currently in flight.
struct ActiveTurn {
    id: TurnId,
    /// Index of the assistant message being written
    message_index: usize,
    cancel: CancelHandle,
}

/// One conversation with the chat backend.
///
/// `send` spawns onto the current Tokio runtime and must be called from
/// within one.
pub struct ConversationSession<C: HttpClient + 'static> {
    client: Arc<ChatStreamClient<C>>,
    ids: Arc<dyn IdGenerator>,
    participant_id: String,
    conversation_id: ContinuityToken,
    status: SessionStatus,
    messages: Vec<ChatMessage>,
    greeting: Option<String>,
    /// Answer of the latest turn; kept until the next send
    accumulator: Option<ResponseAccumulator>,
    splitter: ContentSplitter,
    active: Option<ActiveTurn>,
    next_turn: u64,
    updates_tx: mpsc::Sender<TurnUpdate>,
    updates_rx: mpsc::Receiver<TurnUpdate>,
}

impl<C: HttpClient + 'static> ConversationSession<C> {
    pub fn new(client: Arc<ChatStreamClient<C>>, ids: Arc<dyn IdGenerator>) -> Self {
        let participant_id = ids.participant_id();
        let (updates_tx, updates_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        tracing::debug!(participant = %participant_id, "session created");
        Self {
            client,
            ids,
            participant_id,
            conversation_id: ContinuityToken::new(),
            status: SessionStatus::Idle,
            messages: Vec::new(),
            greeting: None,
            accumulator: None,
            splitter: ContentSplitter::default(),
            active: None,
            next_turn: 0,
            updates_tx,
            updates_rx,
        }
    }

    /// Open the conversation with an assistant greeting.
    ///
    /// The greeting is shown again after [`clear_history`](Self::clear_history).
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        self.messages.push(ChatMessage::assistant(
            self.ids.next_id(),
            greeting.clone(),
            self.splitter.markers(),
        ));
        self.greeting = Some(greeting);
        self
    }

    /// Use different reasoning-block delimiters.
    pub fn with_markers(mut self, markers: ReasoningMarkers) -> Self {
        self.splitter = ContentSplitter::new(markers);
        self
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The committed conversation id, if the backend has assigned one.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.get()
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Accumulated answer text of the latest turn.
    pub fn response_text(&self) -> Option<&str> {
        self.accumulator.as_ref().map(ResponseAccumulator::full_text)
    }

    /// Id of the turn in flight.
    pub fn active_turn(&self) -> Option<TurnId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Start a turn for `text`.
    ///
    /// Whitespace-only input is ignored and returns `None`. A turn still in
    /// flight is stopped first.
    pub fn send(&mut self, text: &str) -> Option<TurnId> {
        if text.trim().is_empty() {
            tracing::debug!("ignoring empty input");
            return None;
        }

        if let Some(active) = &self.active {
            tracing::info!(turn = %active.id, "superseding turn in flight");
            self.stop();
        }
        self.drain_stale();

        self.next_turn += 1;
        let turn = TurnId(self.next_turn);

        self.messages.push(ChatMessage::user(self.ids.next_id(), text));
        self.messages.push(ChatMessage::placeholder(self.ids.next_id()));
        let message_index = self.messages.len() - 1;

        self.accumulator = Some(ResponseAccumulator::new());
        self.splitter.reset();

        let cancel = CancelHandle::new();
        let request = ChatRequest::new(text, self.participant_id.as_str(), self.conversation_id.as_str());
        tracing::info!(
            turn = %turn,
            conversation = %self.conversation_id.as_str(),
            "starting turn"
        );
        tokio::spawn(relay(
            Arc::clone(&self.client),
            request,
            turn,
            cancel.signal(),
            self.updates_tx.clone(),
        ));

        self.active = Some(ActiveTurn {
            id: turn,
            message_index,
            cancel,
        });
        self.status = SessionStatus::AwaitingFirstByte;
        Some(turn)
    }

    /// Wait for and apply the next update of the active turn.
    ///
    /// Returns `None` when no turn is in flight.
    pub async fn next_update(&mut self) -> Option<SessionEvent> {
        loop {
            let active_id = self.active.as_ref()?.id;
            let update = self.updates_rx.recv().await?;
            if update.turn != active_id {
                tracing::trace!(turn = %update.turn, "dropping stale update");
                continue;
            }
            if let Some(event) = self.apply(update) {
                return Some(event);
            }
        }
    }

    /// Drive the active turn to its end and return the final status.
    pub async fn run_turn(&mut self) -> SessionStatus {
        while self.next_update().await.is_some() {}
        self.status
    }

    /// Stop the turn in flight, keeping its partial answer.
    ///
    /// Returns `false` if no turn was in flight.
    pub fn stop(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.cancel.cancel();

        let partial = match self.accumulator.as_mut() {
            Some(acc) => {
                acc.freeze();
                acc.full_text()
            }
            None => "",
        };
        let content = if partial.is_empty() {
            STOPPED_MARKER.trim_start().to_string()
        } else {
            format!("{}{}", partial, STOPPED_MARKER)
        };

        if let Some(msg) = self.messages.get_mut(active.message_index) {
            msg.display = self.splitter.split(&content).clone();
            msg.content = content;
            msg.thinking = false;
            msg.is_stopped = true;
        }
        self.status = SessionStatus::StoppedByUser;
        tracing::info!(turn = %active.id, "turn stopped by user");
        true
    }

    /// Start over: stop any turn, forget the conversation id and messages.
    pub fn clear_history(&mut self) {
        self.stop();
        self.drain_stale();
        self.messages.clear();
        self.conversation_id.clear();
        self.accumulator = None;
        self.splitter.reset();
        self.status = SessionStatus::Idle;
        if let Some(greeting) = &self.greeting {
            self.messages.push(ChatMessage::assistant(
                self.ids.next_id(),
                greeting.clone(),
                self.splitter.markers(),
            ));
        }
        tracing::debug!("history cleared");
    }

    fn drain_stale(&mut self) {
        while self.updates_rx.try_recv().is_ok() {}
    }

    fn apply(&mut self, update: TurnUpdate) -> Option<SessionEvent> {
        let turn = update.turn;
        match update.kind {
            UpdateKind::Record(EventRecord::Message { answer, .. }) => {
                let active = self.active.as_ref()?;
                let acc = self.accumulator.as_mut()?;
                if !acc.append(&answer) {
                    return None;
                }
                if self.status == SessionStatus::AwaitingFirstByte {
                    tracing::debug!(turn = %turn, "first fragment received");
                    self.status = SessionStatus::Streaming;
                }
                if let Some(msg) = self.messages.get_mut(active.message_index) {
                    msg.display = self.splitter.split(acc.full_text()).clone();
                    msg.content = acc.full_text().to_string();
                    msg.thinking = false;
                }
                Some(SessionEvent::Fragment { turn, text: answer })
            }
            UpdateKind::Record(EventRecord::MessageEnd {
                conversation_id, ..
            }) => Some(self.complete(turn, conversation_id)),
            UpdateKind::Closed => {
                tracing::debug!(turn = %turn, "stream closed without completion record");
                Some(self.complete(turn, None))
            }
            UpdateKind::Record(EventRecord::Other { event, .. }) => {
                tracing::trace!(turn = %turn, event = %event, "ignoring event");
                None
            }
            UpdateKind::Failed(err) => {
                tracing::warn!(
                    turn = %turn,
                    code = err.error_code(),
                    retryable = err.is_retryable(),
                    error = %err,
                    "turn failed"
                );
                let kind = err.kind();
                self.finish_turn(TRANSIENT_FAILURE_FALLBACK, kind);
                Some(SessionEvent::Failed { turn, kind })
            }
        }
    }

    fn complete(&mut self, turn: TurnId, conversation_id: Option<String>) -> SessionEvent {
        if let Some(id) = &conversation_id {
            if self.conversation_id.commit(id) {
                tracing::debug!(conversation = %id, "conversation id committed");
            }
        }

        let empty = self
            .accumulator
            .as_ref()
            .map_or(true, ResponseAccumulator::is_empty);
        if empty {
            tracing::warn!(turn = %turn, "turn completed without answer text");
            self.finish_turn(EMPTY_ANSWER_FALLBACK, FailureKind::EmptyAnswer);
            return SessionEvent::Failed {
                turn,
                kind: FailureKind::EmptyAnswer,
            };
        }

        self.release_active();
        self.status = SessionStatus::Settled;
        tracing::info!(turn = %turn, "turn settled");
        SessionEvent::Settled {
            turn,
            conversation_id: self.conversation_id.get().map(str::to_string),
        }
    }

    /// End the active turn with a fallback message.
    fn finish_turn(&mut self, fallback: &str, kind: FailureKind) {
        let index = self.release_active();
        if let Some(msg) = index.and_then(|i| self.messages.get_mut(i)) {
            msg.set_error(fallback);
        }
        self.status = SessionStatus::Errored(kind);
    }

    /// Freeze the accumulator and give up the cancel handle.
    fn release_active(&mut self) -> Option<usize> {
        if let Some(acc) = self.accumulator.as_mut() {
            acc.freeze();
        }
        let active = self.active.take()?;
        active.cancel.release();
        Some(active.message_index)
    }
}

async fn relay<C: HttpClient>(
    client: Arc<ChatStreamClient<C>>,
    request: ChatRequest,
    turn: TurnId,
    signal: CancelSignal,
    tx: mpsc::Sender<TurnUpdate>,
) {
    let mut records = match client.stream_chat(&request, signal.clone()).await {
        Ok(records) => records,
        Err(err) => {
            forward(&tx, &signal, turn, UpdateKind::Failed(err)).await;
            return;
        }
    };

    while let Some(item) = records.next().await {
        let (kind, failed) = match item {
            Ok(record) => (UpdateKind::Record(record), false),
            Err(err) => (UpdateKind::Failed(err), true),
        };
        if !forward(&tx, &signal, turn, kind).await || failed {
            return;
        }
    }

    if !signal.is_cancelled() {
        forward(&tx, &signal, turn, UpdateKind::Closed).await;
    }
}

/// Send one update unless the turn is cancelled first.
async fn forward(
    tx: &mpsc::Sender<TurnUpdate>,
    signal: &CancelSignal,
    turn: TurnId,
    kind: UpdateKind,
) -> bool {
    tokio::select! {
        biased;
        _ = signal.cancelled() => false,
        sent = tx.send(TurnUpdate { turn, kind }) => sent.is_ok(),
    }
}
