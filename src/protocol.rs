//! Inbound message shapes sent by the log-streaming server.

pub const AUTH_SUCCESS_MARKER: &str = "Authentication Success";
pub const AUTH_FAILED_MARKER: &str = "Authentication Failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Handshake accepted; control only, never rendered.
    AuthSuccess,
    /// Handshake rejected; the client closes the connection.
    AuthFailed,
    /// Any other line.
    Log(&'a str),
}

impl<'a> Inbound<'a> {
    pub fn parse(line: &'a str) -> Self {
        if line.starts_with(AUTH_SUCCESS_MARKER) {
            Self::AuthSuccess
        } else if line.starts_with(AUTH_FAILED_MARKER) {
            Self::AuthFailed
        } else {
            Self::Log(line)
        }
    }
}
