/// Errors that can occur within the control channel.
///
/// # Examples
///
/// ```rust
/// use relaymon_control::error::ControlError;
///
/// let err = ControlError::MissingToken("RELAYMON_TOKEN");
/// assert!(err.to_string().contains("RELAYMON_TOKEN"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The authorization token is absent from the environment. Fatal at
    /// startup, never retried.
    #[error("Control: authorization token not found, set {0} in the environment")]
    MissingToken(&'static str),

    /// Channel configuration could not be read or parsed.
    #[error("Control: invalid channel configuration: {0}")]
    Config(String),

    /// Dial or handshake failure. Retried with a fixed backoff until
    /// success or external cancellation, at which point the last dial
    /// error surfaces to the caller.
    #[error("Control: failed to connect to controller: {0}")]
    Connect(String),

    /// Read failure or malformed inbound message on an established
    /// connection. Terminates the listener; reconnecting requires a fresh
    /// channel.
    #[error("Control: protocol error: {0}")]
    Protocol(String),

    /// A response could not be written. The listener logs this and keeps
    /// the connection open; a subsequent read failure closes it.
    #[error("Control: failed to write to controller: {0}")]
    Write(String),

    /// JSON encoding of an outbound response failed.
    #[error("Control: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience `Result` alias for control channel operations.
pub type Result<T> = std::result::Result<T, ControlError>;
