//! Session store: the in-memory conversation collection.
//!
//! Owns creation, selection, deletion and message appends, keeps the active
//! session reference valid, and mirrors every change to the persistence
//! adapter. Sending is a two-phase append:
//! 1. `begin_send`: validate, append the user message, enter loading
//! 2. the gateway call, with no borrow of the store held
//! 3. `complete_send`: append the reply (or the apology), leave loading
//!
//! The user message is never retracted, so a failed round trip still leaves
//! a record of what was attempted.

use std::cell::RefCell;
use std::rc::Rc;

use chat_types::{
    ChatError, Result,
    config::ChatConfig,
    event::ChatEvent,
    message::{AssistantReply, Message, Role},
    session::{derive_title, ChatSession, Mode, SessionId, SessionSummary},
};

use crate::event_bus::EventBus;
use crate::persistence::{PanelLayout, PersistenceAdapter};
use crate::ports::{GatewayPort, StoragePort};
use crate::seed;

/// Shown in place of the assistant's reply when the backend call fails
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't connect to the AI assistant right now. Please try again later.";

/// A user message that has been appended and is waiting for its reply
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    pub session_id: SessionId,
    pub content: String,
    pub mode: Mode,
}

pub struct SessionStore {
    sessions: Vec<ChatSession>,
    active_id: Option<SessionId>,
    loading: bool,
    sidebar_collapsed: bool,
    layout: PanelLayout,
    persistence: PersistenceAdapter,
    events: EventBus,
}

impl SessionStore {
    /// Restore persisted state, seeding or creating a first session when empty.
    pub fn open(config: &ChatConfig, storage: Rc<dyn StoragePort>, events: EventBus) -> Self {
        let persistence = PersistenceAdapter::new(storage, &config.storage);
        let loaded = persistence.load();
        let layout = persistence.load_layout();

        let mut store = Self {
            sessions: loaded.sessions,
            active_id: loaded.active_id,
            loading: false,
            sidebar_collapsed: loaded.sidebar_collapsed,
            layout,
            persistence,
            events,
        };

        if store.sessions.is_empty() && config.seed_mock_sessions {
            store.sessions = seed::mock_sessions();
            store.active_id = store.sessions.first().map(|s| s.id.clone());
            log::info!("seeded {} demo session(s)", store.sessions.len());
            store.persist();
        }

        if store.sessions.is_empty() {
            store.create_session(Mode::General);
        } else {
            // Views start out tracking nothing; tell them what was restored.
            let restored = store.active_id.clone();
            store.events.emit(ChatEvent::ActiveChanged { session_id: restored });
        }

        store
    }

    // ─── Queries ─────────────────────────────────────────────

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(SessionSummary::from).collect()
    }

    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.active_id.as_deref().and_then(|id| self.session(id))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn persistence(&self) -> &PersistenceAdapter {
        &self.persistence
    }

    // ─── Session lifecycle ───────────────────────────────────

    /// Insert an empty session at the front and make it active.
    pub fn create_session(&mut self, mode: Mode) -> SessionId {
        let session = ChatSession::new(mode);
        let id = session.id.clone();
        self.sessions.insert(0, session);
        self.events.emit(ChatEvent::SessionCreated { session_id: id.clone() });
        self.set_active(Some(id.clone()));
        self.persist();
        log::debug!("created session {} ({})", id, mode);
        id
    }

    pub fn select_session(&mut self, id: &str) -> Result<()> {
        if self.session(id).is_none() {
            return Err(ChatError::SessionNotFound(id.to_string()));
        }
        if self.active_id.as_deref() != Some(id) {
            self.set_active(Some(id.to_string()));
            self.persist();
        }
        Ok(())
    }

    /// Remove a session. Deleting the active one moves the selection to the
    /// new first session, or clears it when none remain.
    pub fn delete_session(&mut self, id: &str) -> Result<()> {
        let index = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ChatError::SessionNotFound(id.to_string()))?;
        self.sessions.remove(index);
        self.events.emit(ChatEvent::SessionDeleted { session_id: id.to_string() });

        if self.active_id.as_deref() == Some(id) {
            let next = self.sessions.first().map(|s| s.id.clone());
            self.set_active(next);
        }
        self.persist();
        Ok(())
    }

    pub fn set_session_mode(&mut self, id: &str, mode: Mode) -> Result<()> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ChatError::SessionNotFound(id.to_string()))?;
        if session.mode != mode {
            session.mode = mode;
            self.events.emit(ChatEvent::ModeChanged { session_id: id.to_string(), mode });
            self.persist();
        }
        Ok(())
    }

    // ─── UI preferences ──────────────────────────────────────

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        if self.sidebar_collapsed != collapsed {
            self.sidebar_collapsed = collapsed;
            self.persistence.save_sidebar_collapsed(collapsed);
        }
    }

    pub fn set_layout(&mut self, layout: PanelLayout) {
        let layout = layout.clamped();
        if self.layout != layout {
            self.persistence.save_layout(&layout);
            self.layout = layout;
        }
    }

    // ─── Sending ─────────────────────────────────────────────

    /// First phase of a send: validate, append the user message, enter loading.
    ///
    /// Creates a session when none is active. An explicit `mode` that differs
    /// from the session's replaces it.
    pub fn begin_send(&mut self, content: &str, mode: Option<Mode>) -> Result<PendingSend> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::Validation("message is empty".to_string()));
        }

        let existing = self.active_session().map(|s| s.id.clone());
        let session_id = match existing {
            Some(id) => id,
            None => self.create_session(mode.unwrap_or_default()),
        };

        let (message_id, resolved_mode, mode_changed) = {
            let session = self
                .sessions
                .iter_mut()
                .find(|s| s.id == session_id)
                .ok_or_else(|| ChatError::SessionNotFound(session_id.clone()))?;

            if session.is_empty() {
                session.title = derive_title(content);
            }
            let mode_changed = matches!(mode, Some(m) if m != session.mode);
            if let Some(m) = mode {
                session.mode = m;
            }

            let message = Message::user(content);
            let message_id = message.id.clone();
            session.messages.push(message);
            (message_id, session.mode, mode_changed)
        };

        if mode_changed {
            self.events.emit(ChatEvent::ModeChanged {
                session_id: session_id.clone(),
                mode: resolved_mode,
            });
        }
        self.events.emit(ChatEvent::MessageAppended {
            session_id: session_id.clone(),
            message_id,
            role: Role::User,
        });
        self.persist();
        self.set_loading(true);

        Ok(PendingSend {
            session_id,
            content: content.to_string(),
            mode: resolved_mode,
        })
    }

    /// Second phase of a send: append the reply or the apology, leave loading.
    pub fn complete_send(&mut self, pending: PendingSend, outcome: Result<AssistantReply>) {
        let message = match outcome {
            Ok(reply) => Message::from_reply(reply),
            Err(e) => {
                log::warn!("backend call for session {} failed: {}", pending.session_id, e);
                if e.is_gateway_failure() {
                    self.events.emit(ChatEvent::GatewayFailed { message: e.to_string() });
                }
                Message::assistant(FALLBACK_REPLY)
            }
        };

        match self.sessions.iter_mut().find(|s| s.id == pending.session_id) {
            Some(session) => {
                let message_id = message.id.clone();
                session.messages.push(message);
                self.events.emit(ChatEvent::MessageAppended {
                    session_id: pending.session_id.clone(),
                    message_id,
                    role: Role::Assistant,
                });
                self.persist();
            }
            None => log::warn!(
                "session {} was deleted before its reply arrived",
                pending.session_id
            ),
        }

        self.set_loading(false);
    }

    // ─── Internals ───────────────────────────────────────────

    fn set_active(&mut self, id: Option<SessionId>) {
        self.active_id = id.clone();
        self.events.emit(ChatEvent::ActiveChanged { session_id: id });
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.events.emit(ChatEvent::LoadingChanged { loading });
        }
    }

    fn persist(&self) {
        self.persistence.save(&self.sessions, self.active_id.as_deref());
    }
}

/// Full send round trip: optimistic append, gateway call, reply append.
///
/// The store is borrowed only around each phase, so the UI can keep reading
/// it while the request is in flight. If this future is dropped before the
/// gateway answers, the pending send is completed with an error so the
/// conversation still gets its apology and loading is cleared.
pub async fn send_message(
    store: &RefCell<SessionStore>,
    gateway: &dyn GatewayPort,
    content: &str,
    mode: Option<Mode>,
) -> Result<()> {
    let pending = store.borrow_mut().begin_send(content, mode)?;
    let mut guard = PendingGuard {
        store,
        pending: Some(pending.clone()),
    };

    let outcome = gateway.send(&pending.content, pending.mode).await;

    guard.pending = None;
    store.borrow_mut().complete_send(pending, outcome);
    Ok(())
}

struct PendingGuard<'a> {
    store: &'a RefCell<SessionStore>,
    pending: Option<PendingSend>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            match self.store.try_borrow_mut() {
                Ok(mut store) => store.complete_send(
                    pending,
                    Err(ChatError::Unreachable("request cancelled".to_string())),
                ),
                Err(_) => log::warn!("could not settle cancelled send for {}", pending.session_id),
            }
        }
    }
}
