//! UI-level state that drives rendering.
//! Conversation data lives in the session store; this holds only what the
//! panels need between frames, updated each frame by draining the EventBus.

use chat_core::scroll::{ScrollCommand, ScrollController};
use chat_types::{config::ScrollConfig, event::ChatEvent, session::SessionId};

/// Backend availability as last reported by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Unknown,
    Ready,
    Unavailable,
}

impl HealthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Unknown => "Connecting...",
            HealthStatus::Ready => "AI ready",
            HealthStatus::Unavailable => "AI offline",
        }
    }
}

/// State visible to UI panels
pub struct UiState {
    /// Input field content
    pub input_text: String,
    pub health: HealthStatus,
    /// Status line text
    pub status_text: String,
    pub loading: bool,
    pub scroll: ScrollController,
    /// Applied by the chat panel on its next frame
    pub pending_scroll: Option<ScrollCommand>,
    /// Session awaiting delete confirmation in the sidebar
    pub confirm_delete: Option<SessionId>,
    viewed_session: Option<SessionId>,
}

impl UiState {
    pub fn new(scroll: ScrollConfig) -> Self {
        Self {
            input_text: String::new(),
            health: HealthStatus::Unknown,
            status_text: "Ready".to_string(),
            loading: false,
            scroll: ScrollController::new(scroll),
            pending_scroll: None,
            confirm_delete: None,
            viewed_session: None,
        }
    }

    /// The session whose messages the chat panel is showing
    pub fn viewed_session(&self) -> Option<&str> {
        self.viewed_session.as_deref()
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<ChatEvent>, now: f64) {
        for event in events {
            match event {
                ChatEvent::ActiveChanged { session_id } => {
                    if session_id != self.viewed_session {
                        self.viewed_session = session_id;
                        self.confirm_delete = None;
                        let cmd = self.scroll.reset();
                        self.queue_scroll(Some(cmd));
                    }
                }
                ChatEvent::MessageAppended { session_id, .. } => {
                    if self.viewed_session.as_deref() == Some(session_id.as_str()) {
                        let cmd = self.scroll.on_content_appended(now);
                        self.queue_scroll(cmd);
                    }
                }
                ChatEvent::LoadingChanged { loading } => {
                    self.loading = loading;
                    self.status_text = if loading { "Thinking..." } else { "Ready" }.to_string();
                    let cmd = self.scroll.on_loading_changed(loading, now);
                    self.queue_scroll(cmd);
                }
                ChatEvent::GatewayFailed { message } => {
                    log::debug!("gateway failure surfaced to UI: {}", message);
                    self.health = HealthStatus::Unavailable;
                }
                ChatEvent::SessionDeleted { session_id } => {
                    if self.confirm_delete.as_deref() == Some(session_id.as_str()) {
                        self.confirm_delete = None;
                    }
                }
                ChatEvent::SessionCreated { .. } | ChatEvent::ModeChanged { .. } => {}
            }
        }
    }

    /// Record a health check result. Errors count as unavailable.
    pub fn set_health(&mut self, ready: chat_types::Result<bool>) {
        self.health = match ready {
            Ok(true) => HealthStatus::Ready,
            Ok(false) => HealthStatus::Unavailable,
            Err(e) => {
                log::debug!("health check failed: {}", e);
                HealthStatus::Unavailable
            }
        };
    }

    /// Later commands win; a jump to the top is not overridden by a
    /// non-animated follow tick.
    pub fn queue_scroll(&mut self, cmd: Option<ScrollCommand>) {
        let Some(cmd) = cmd else { return };
        self.pending_scroll = match (self.pending_scroll, cmd) {
            (Some(ScrollCommand::ToTop), ScrollCommand::ToBottom { animated: false }) => {
                Some(ScrollCommand::ToTop)
            }
            _ => Some(cmd),
        };
    }

    pub fn take_scroll(&mut self) -> Option<ScrollCommand> {
        self.pending_scroll.take()
    }

    /// Trimmed input, if it may be submitted right now
    pub fn submittable_input(&self) -> Option<String> {
        let text = self.input_text.trim();
        (!text.is_empty() && !self.loading).then(|| text.to_string())
    }

    pub fn is_busy(&self) -> bool {
        self.loading
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}
