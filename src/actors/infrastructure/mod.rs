// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// Concrete actors registered by the server and client commands:
// - Network listeners (HTTP, gRPC)
// - OS signal watching
// - Interactive input
// - Error sink
//
// ============================================================================

mod error_sink;
mod input;
mod listener;
mod signal_watcher;

pub use error_sink::{error_channel, ErrorSender, ErrorSink};
pub use input::{CancellableReader, InputActor, Line, LineSource, Outbound, StdinLines};
pub use listener::{Listener, ListenerActor, ShutdownTrigger};
pub use signal_watcher::{OsSignals, Signal, SignalSource, SignalWatcher};
