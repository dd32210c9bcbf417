use serde::{Deserialize, Serialize};

use crate::message::Role;
use crate::session::{Mode, SessionId};

/// Events emitted by the session store.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatEvent {
    SessionCreated { session_id: SessionId },

    /// Active session changed (None once the collection is empty)
    ActiveChanged { session_id: Option<SessionId> },

    SessionDeleted { session_id: SessionId },

    MessageAppended {
        session_id: SessionId,
        message_id: String,
        role: Role,
    },

    ModeChanged { session_id: SessionId, mode: Mode },

    LoadingChanged { loading: bool },

    /// The backend call failed; the detail is for diagnostics only
    GatewayFailed { message: String },
}
