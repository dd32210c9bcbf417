//! Persistence adapter: best-effort mirror of the session collection in a
//! key-value store.
//!
//! Nothing here returns an error to the caller. Missing keys and unreadable
//! JSON fall back to defaults; failed writes are logged and dropped, leaving
//! the in-memory state authoritative.

use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use chat_types::config::StorageConfig;
use chat_types::session::{ChatSession, SessionId, DEFAULT_TITLE};

use crate::ports::StoragePort;

/// Everything restored at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedState {
    pub sessions: Vec<ChatSession>,
    pub active_id: Option<SessionId>,
    pub sidebar_collapsed: bool,
}

/// Relative sizes of the resizable panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    /// Sidebar width as a fraction of the window width
    pub sidebar_ratio: f32,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self { sidebar_ratio: 0.22 }
    }
}

impl PanelLayout {
    pub const MIN_SIDEBAR_RATIO: f32 = 0.12;
    pub const MAX_SIDEBAR_RATIO: f32 = 0.45;

    pub fn clamped(self) -> Self {
        let ratio = if self.sidebar_ratio.is_finite() {
            self.sidebar_ratio
        } else {
            Self::default().sidebar_ratio
        };
        Self {
            sidebar_ratio: ratio.clamp(Self::MIN_SIDEBAR_RATIO, Self::MAX_SIDEBAR_RATIO),
        }
    }
}

pub struct PersistenceAdapter {
    storage: Rc<dyn StoragePort>,
    sessions_key: String,
    active_key: String,
    collapsed_key: String,
    layout_key: String,
}

impl PersistenceAdapter {
    pub fn new(storage: Rc<dyn StoragePort>, config: &StorageConfig) -> Self {
        let ns = &config.namespace;
        Self {
            storage,
            sessions_key: format!("{}:sessions", ns),
            active_key: format!("{}:active_session", ns),
            collapsed_key: format!("{}:sidebar_collapsed", ns),
            layout_key: format!("{}:panel_layout", ns),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.storage.backend_name()
    }

    pub fn load(&self) -> LoadedState {
        let sessions = self
            .read_json::<Vec<ChatSession>>(&self.sessions_key)
            .map(repair_sessions)
            .unwrap_or_default();

        let active_id = self
            .read_raw(&self.active_key)
            .filter(|id| sessions.iter().any(|s| &s.id == id))
            .or_else(|| sessions.first().map(|s| s.id.clone()));

        let sidebar_collapsed = self.read_json::<bool>(&self.collapsed_key).unwrap_or(false);

        log::info!(
            "restored {} session(s) from {}",
            sessions.len(),
            self.storage.backend_name()
        );

        LoadedState {
            sessions,
            active_id,
            sidebar_collapsed,
        }
    }

    /// Write the collection and the active id as two independent entries.
    pub fn save(&self, sessions: &[ChatSession], active_id: Option<&str>) {
        match serde_json::to_string(sessions) {
            Ok(json) => self.write(&self.sessions_key, &json),
            Err(e) => log::warn!("could not serialize sessions: {}", e),
        }

        let result = match active_id {
            Some(id) => self.storage.set(&self.active_key, id),
            None => self.storage.delete(&self.active_key),
        };
        if let Err(e) = result {
            log::warn!("could not persist active session: {}", e);
        }
    }

    pub fn save_sidebar_collapsed(&self, collapsed: bool) {
        self.write(&self.collapsed_key, if collapsed { "true" } else { "false" });
    }

    pub fn load_layout(&self) -> PanelLayout {
        self.read_json::<PanelLayout>(&self.layout_key)
            .unwrap_or_default()
            .clamped()
    }

    pub fn save_layout(&self, layout: &PanelLayout) {
        match serde_json::to_string(&layout.clone().clamped()) {
            Ok(json) => self.write(&self.layout_key, &json),
            Err(e) => log::warn!("could not serialize layout: {}", e),
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            log::warn!("could not persist {}: {}", key, e);
        }
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("could not read {}: {}", key, e);
                None
            }
        }
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("ignoring malformed {}: {}", key, e);
                None
            }
        }
    }
}

/// Drop duplicate session ids (first wins) and give untitled sessions a title.
fn repair_sessions(sessions: Vec<ChatSession>) -> Vec<ChatSession> {
    let mut seen = HashSet::new();
    sessions
        .into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .map(|mut s| {
            if s.title.trim().is_empty() {
                s.title = DEFAULT_TITLE.to_string();
            }
            s
        })
        .collect()
}
