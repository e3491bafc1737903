// ============================================================================
// Actors Module
// ============================================================================
//
// Long-lived operations that start and stop together.
//
// Structure:
// - core/           - The Actor contract and the Group supervisor
// - infrastructure/ - Concrete actors (listeners, signals, input, error sink)
//
// Entry points build a Group, register actors, and run it once. The first
// actor to stop decides the process outcome.
//
// ============================================================================

mod core;
mod errors;
mod infrastructure;

pub use core::{Actor, Group, Termination};
pub use errors::ActorError;
pub use infrastructure::{
    error_channel,
    CancellableReader,
    ErrorSender,
    ErrorSink,
    InputActor,
    Line,
    LineSource,
    Listener,
    ListenerActor,
    OsSignals,
    Outbound,
    ShutdownTrigger,
    Signal,
    SignalSource,
    SignalWatcher,
    StdinLines,
};
