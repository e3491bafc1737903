// ============================================================================
// Commands - one actor group per entry point
// ============================================================================
//
// - server:    HTTP + gRPC listeners and a signal watcher
// - client:    stdin reader, error sink and a signal watcher
// - transform: one-shot dataset conversion, no group
//
// ============================================================================

pub mod client;
pub mod server;
pub mod transform;
