//! `HttpConnection`'s finite-state label (spec §4.5): `open()` connects
//! and transitions READY on `connect`; on `end`/`timeout` it transitions
//! CLOSING and half-closes; on `close` it transitions CLOSED. Modeled as
//! a validated transition table the way the grounding workspace's own
//! session state machine is, rather than free-form field assignment.

use crate::error::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Closed,
    Opening,
    Ready,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Open,
    Connected,
    EndOrTimeout,
    Close,
}

pub struct ConnectionStateMachine {
    current: ConnectionState,
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self {
            current: ConnectionState::Closed,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.current
    }

    pub fn is_ready(&self) -> bool {
        self.current == ConnectionState::Ready
    }

    pub fn transition(&mut self, event: ConnectionEvent) -> Result<ConnectionState, HttpError> {
        let new_state = match (self.current, event) {
            (ConnectionState::Closed, ConnectionEvent::Open) => ConnectionState::Opening,
            (ConnectionState::Opening, ConnectionEvent::Connected) => ConnectionState::Ready,
            (ConnectionState::Opening, ConnectionEvent::EndOrTimeout) => ConnectionState::Closing,
            (ConnectionState::Ready, ConnectionEvent::EndOrTimeout) => ConnectionState::Closing,
            (ConnectionState::Ready, ConnectionEvent::Close) => ConnectionState::Closed,
            (ConnectionState::Closing, ConnectionEvent::Close) => ConnectionState::Closed,
            (from, event) => return Err(HttpError::InvalidTransition { from, event }),
        };

        self.current = new_state;
        Ok(new_state)
    }
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_into_ready() {
        let mut sm = ConnectionStateMachine::new();
        sm.transition(ConnectionEvent::Open).unwrap();
        assert_eq!(sm.state(), ConnectionState::Opening);
        sm.transition(ConnectionEvent::Connected).unwrap();
        assert_eq!(sm.state(), ConnectionState::Ready);
        assert!(sm.is_ready());
    }

    #[test]
    fn timeout_half_closes_then_closes() {
        let mut sm = ConnectionStateMachine::new();
        sm.transition(ConnectionEvent::Open).unwrap();
        sm.transition(ConnectionEvent::Connected).unwrap();
        sm.transition(ConnectionEvent::EndOrTimeout).unwrap();
        assert_eq!(sm.state(), ConnectionState::Closing);
        sm.transition(ConnectionEvent::Close).unwrap();
        assert_eq!(sm.state(), ConnectionState::Closed);
    }

    #[test]
    fn rejects_connected_before_open() {
        let mut sm = ConnectionStateMachine::new();
        assert!(sm.transition(ConnectionEvent::Connected).is_err());
    }
}
