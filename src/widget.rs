// src/widget.rs
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{RwLock, watch};
use tracing::{Span, field, info, instrument, warn};
use uuid::Uuid;

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::message::ChatMessage;
use crate::services::render::{self, View};
use crate::services::reply_client::ReplyClient;
use crate::state::{Phase, Session, WidgetState};

const FAILED_REPLY_TEXT: &str = "could not get a reply";

/// Client-side chat controller: identifies the user, sends messages and
/// keeps the transcript.
#[derive(Debug)]
pub struct ChatWidget {
    id: Uuid,
    client: ReplyClient,
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    state: RwLock<WidgetState>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn release(&self, state: &mut WidgetState, seq: u64, entry: Option<ChatMessage>) {
        state.in_flight -= 1;
        if state.transcript.complete(seq, entry) > 0 {
            self.bump();
        }
    }
}

/// Holds a reserved reply slot. If the send is dropped before its reply is
/// recorded, the slot is released so later replies are not held forever.
struct PendingReply {
    shared: Arc<Shared>,
    seq: u64,
    on_drop: Option<ChatMessage>,
    done: bool,
}

impl PendingReply {
    async fn finish(mut self, entry: Option<ChatMessage>) {
        let mut state = self.shared.state.write().await;
        self.shared.release(&mut state, self.seq, entry);
        self.done = true;
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let entry = self.on_drop.take();
        if let Ok(mut state) = self.shared.state.try_write() {
            self.shared.release(&mut state, self.seq, entry);
            return;
        }
        let shared = self.shared.clone();
        let seq = self.seq;
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let mut state = shared.state.write().await;
                    shared.release(&mut state, seq, entry);
                });
            }
            Err(_) => warn!(seq, "send dropped outside a runtime; reply slot not released"),
        }
    }
}

impl ChatWidget {
    pub fn new(config: WidgetConfig) -> Result<Self, WidgetError> {
        let (revision, _) = watch::channel(0);
        Ok(Self {
            id: Uuid::new_v4(),
            client: ReplyClient::new(config)?,
            shared: Arc::new(Shared { state: RwLock::new(WidgetState::default()), revision }),
        })
    }

    /// Per-instance id, attached to every log line this widget emits.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The configuration this widget was built with.
    pub fn config(&self) -> &WidgetConfig {
        self.client.config()
    }

    /// Store the user id and switch to the conversation view. Calling again
    /// replaces the id and keeps the transcript.
    pub async fn begin_session(&self, raw_user_id: &str) -> Result<Session, WidgetError> {
        let session = Session::new(raw_user_id).ok_or(WidgetError::EmptyUserId)?;

        let mut state = self.shared.state.write().await;
        if let Some(previous) = state.session.replace(session.clone()) {
            info!(widget = %self.id, from = previous.user_id(), to = session.user_id(), "session replaced");
        } else {
            info!(widget = %self.id, user = session.user_id(), "session started");
        }
        drop(state);

        self.shared.bump();
        Ok(session)
    }

    /// Echo `text` into the transcript, post it, and append the reply.
    ///
    /// Replies are appended in submission order. On failure a notice takes
    /// the reply's place (unless disabled in the config) and the error is
    /// returned. `session` must be the active one.
    #[instrument(
        name = "send_message",
        skip(self, session, text),
        fields(widget = %self.id, user = session.user_id(), seq = field::Empty)
    )]
    pub async fn send_message(&self, session: &Session, text: &str) -> Result<ChatMessage, WidgetError> {
        if text.trim().is_empty() {
            return Err(WidgetError::EmptyMessage);
        }
        let config = self.client.config();

        let seq = {
            let mut state = self.shared.state.write().await;
            match &state.session {
                None => return Err(WidgetError::NotIdentified),
                Some(active) if active != session => return Err(WidgetError::StaleSession),
                Some(_) => {}
            }
            state.in_flight += 1;
            state.transcript.echo(text)
        };
        Span::current().record("seq", seq);
        self.shared.bump();

        let pending = PendingReply {
            shared: self.shared.clone(),
            seq,
            on_drop: config.surface_failures.then(|| self.failure_notice()),
            done: false,
        };

        let (entry, result) = match self.client.fetch_reply(session.user_id(), text).await {
            Ok(reply) => {
                let msg = ChatMessage::assistant(config.assistant_label.clone(), reply);
                (Some(msg.clone()), Ok(msg))
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "no reply");
                let notice = config.surface_failures.then(|| self.failure_notice());
                (notice, Err(WidgetError::Reply(err)))
            }
        };

        pending.finish(entry).await;
        result
    }

    pub async fn render(&self) -> View {
        let state = self.shared.state.read().await;
        render::render(state.phase(), state.transcript.messages())
    }

    pub async fn phase(&self) -> Phase {
        self.shared.state.read().await.phase()
    }

    pub async fn session(&self) -> Option<Session> {
        self.shared.state.read().await.session.clone()
    }

    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.shared.state.read().await.transcript.messages().to_vec()
    }

    /// Revision counter that moves on every visible change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    fn failure_notice(&self) -> ChatMessage {
        ChatMessage::notice(self.client.config().notice_label.clone(), FAILED_REPLY_TEXT)
    }
}
