//! Error types for the session controller.

use thiserror::Error;

/// A controller command was issued in a state that cannot honour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no debug session is active")]
    NoSession,
    #[error("the engine must be halted for this command")]
    NotHalted,
}

/// The engine side of the notification bridge lost its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("notification bridge is disconnected")]
    Disconnected,
}
