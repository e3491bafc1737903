use std::time::Duration;

use super::infrastructure::Signal;

// ============================================================================
// Actor Errors
// ============================================================================
//
// Reasons an actor's `execute` stops, plus the one failure an interrupt can
// observe internally (a listener overrunning its shutdown deadline).
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("caught signal: {0}")]
    Signal(Signal),

    #[error("failed to read input: {0}")]
    Input(#[source] std::io::Error),

    #[error("actor {name} panicked: {message}")]
    Panicked { name: String, message: String },

    #[error("{listener} did not stop within {deadline:?}, connections were force-closed")]
    ShutdownTimeout { listener: String, deadline: Duration },

    #[error("{0} was already served")]
    AlreadyServed(String),
}

impl ActorError {
    /// Short stable label for logs and metrics
    pub fn as_label(&self) -> &'static str {
        match self {
            ActorError::Signal(_) => "signal",
            ActorError::Input(_) => "input",
            ActorError::Panicked { .. } => "panicked",
            ActorError::ShutdownTimeout { .. } => "shutdown_timeout",
            ActorError::AlreadyServed(_) => "already_served",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_error_names_the_signal() {
        let err = ActorError::Signal(Signal::Terminate);
        assert_eq!(err.to_string(), "caught signal: terminated");
        assert_eq!(err.as_label(), "signal");
    }

    #[test]
    fn test_shutdown_timeout_message() {
        let err = ActorError::ShutdownTimeout {
            listener: "grpc".to_string(),
            deadline: Duration::from_millis(50),
        };
        assert_eq!(
            err.to_string(),
            "grpc did not stop within 50ms, connections were force-closed"
        );
    }

    #[test]
    fn test_input_error_keeps_source() {
        use std::error::Error;

        let err = ActorError::Input(std::io::Error::other("disk on fire"));
        assert_eq!(err.to_string(), "failed to read input: disk on fire");
        assert!(err.source().is_some());
    }
}
