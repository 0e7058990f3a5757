use std::fmt;

/// Connection lifecycle as shown in the status line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Connecting,
    Authenticating,
    Connected,
    AuthFailed,
    Disconnected,
    /// `detail` is set for setup failures; transport errors carry none.
    Error { detail: Option<String> },
}

/// Inputs that drive [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    ConnectRequested,
    Opened,
    AuthSucceeded,
    AuthRejected,
    TransportFailed,
    SetupFailed(String),
    Closed,
}

impl ConnectionStatus {
    pub fn label(&self) -> String {
        match self {
            Self::Idle => "Idle".to_string(),
            Self::Connecting => "Connecting...".to_string(),
            Self::Authenticating => "Authenticating...".to_string(),
            Self::Connected => "Connected & Streaming (Authenticated)".to_string(),
            Self::AuthFailed => "Authentication Failed. Retrying...".to_string(),
            Self::Disconnected => "Disconnected".to_string(),
            Self::Error { detail: None } => "Connection Error".to_string(),
            Self::Error { detail: Some(detail) } => format!("Error: {detail}"),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Next status for `event` arriving in `state`.
///
/// Errors and closes are accepted from every state. `Opened` only moves a
/// pending connect forward. Nothing leaves `AuthFailed` or `Disconnected`
/// except a new connect request or a close.
pub fn transition(state: &ConnectionStatus, event: &StatusEvent) -> ConnectionStatus {
    use ConnectionStatus as S;

    match (state, event) {
        (_, StatusEvent::ConnectRequested) => S::Connecting,
        (S::Connecting, StatusEvent::Opened) => S::Authenticating,
        (_, StatusEvent::AuthSucceeded) => S::Connected,
        (_, StatusEvent::AuthRejected) => S::AuthFailed,
        (_, StatusEvent::TransportFailed) => S::Error { detail: None },
        (_, StatusEvent::SetupFailed(detail)) => S::Error {
            detail: Some(detail.clone()),
        },
        (_, StatusEvent::Closed) => S::Disconnected,
        (state, StatusEvent::Opened) => state.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(events: &[StatusEvent]) -> ConnectionStatus {
        events
            .iter()
            .fold(ConnectionStatus::default(), |state, event| transition(&state, event))
    }

    #[test]
    fn initial_state_is_idle() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Idle);
    }

    #[test]
    fn successful_handshake_reaches_connected() {
        let status = run(&[
            StatusEvent::ConnectRequested,
            StatusEvent::Opened,
            StatusEvent::AuthSucceeded,
        ]);
        assert_eq!(status, ConnectionStatus::Connected);
        assert_eq!(status.label(), "Connected & Streaming (Authenticated)");
    }

    #[test]
    fn rejected_handshake_then_close_ends_disconnected() {
        let rejected = run(&[
            StatusEvent::ConnectRequested,
            StatusEvent::Opened,
            StatusEvent::AuthRejected,
        ]);
        assert_eq!(rejected, ConnectionStatus::AuthFailed);
        assert_eq!(rejected.label(), "Authentication Failed. Retrying...");

        assert_eq!(
            transition(&rejected, &StatusEvent::Closed),
            ConnectionStatus::Disconnected
        );
    }

    #[test]
    fn transport_error_from_any_state() {
        for state in [
            ConnectionStatus::Connecting,
            ConnectionStatus::Authenticating,
            ConnectionStatus::Connected,
        ] {
            let next = transition(&state, &StatusEvent::TransportFailed);
            assert_eq!(next.label(), "Connection Error");
        }
    }

    #[test]
    fn setup_failure_carries_detail() {
        let status = run(&[
            StatusEvent::ConnectRequested,
            StatusEvent::SetupFailed("URL error: unsupported scheme".into()),
        ]);
        assert_eq!(status.label(), "Error: URL error: unsupported scheme");
    }

    #[test]
    fn opened_is_ignored_outside_connecting() {
        assert_eq!(
            transition(&ConnectionStatus::Connected, &StatusEvent::Opened),
            ConnectionStatus::Connected
        );
        assert_eq!(
            transition(&ConnectionStatus::Disconnected, &StatusEvent::Opened),
            ConnectionStatus::Disconnected
        );
    }

    #[test]
    fn close_after_error_disconnects() {
        let status = run(&[
            StatusEvent::ConnectRequested,
            StatusEvent::TransportFailed,
            StatusEvent::Closed,
        ]);
        assert_eq!(status, ConnectionStatus::Disconnected);
    }
}
