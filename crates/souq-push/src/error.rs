use souq_registry::RegistryError;
use thiserror::Error;

/// Push subsystem error taxonomy.
///
/// These never cross the public facade as errors; `service.rs` flattens
/// them into `SendOutcome { success: false, error }` strings that operator
/// UIs render directly. The display strings below are therefore the exact
/// operator-facing wording.
#[derive(Debug, Error)]
pub enum PushError {
    /// Resolution produced zero tokens. A normal terminal state, not a
    /// fault: nobody in the target has a registered device.
    #[error("no registered devices")]
    EmptyTarget,

    /// The gateway responded, but not one device accepted the message.
    #[error("message rejected by all devices")]
    GatewayRejected,

    /// The gateway call itself failed; no per-token report exists, so
    /// nothing may be pruned. The transport error is surfaced verbatim.
    #[error("{0}")]
    GatewayTransport(String),

    #[error("unknown segment: {0}")]
    UnknownSegment(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl PushError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::GatewayTransport(message.into())
    }

    pub fn unknown_segment(name: impl Into<String>) -> Self {
        Self::UnknownSegment(name.into())
    }
}
