//! Store connection health as seen by the scheduler.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionHealth {
    Up,
    Down,
    Reconnecting,
}

impl ConnectionHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionHealth::Up => "up",
            ConnectionHealth::Down => "down",
            ConnectionHealth::Reconnecting => "reconnecting",
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, ConnectionHealth::Up)
    }

    /// Only a down connection starts a reconnect
    pub fn begin_reconnect(self) -> Self {
        match self {
            ConnectionHealth::Down => ConnectionHealth::Reconnecting,
            other => other,
        }
    }

    /// Result of a connect attempt
    pub fn settle(self, ok: bool) -> Self {
        if ok {
            ConnectionHealth::Up
        } else {
            ConnectionHealth::Down
        }
    }

    pub fn mark_down(self) -> Self {
        ConnectionHealth::Down
    }
}
