use async_trait::async_trait;
use std::sync::Arc;

// ============================================================================
// Actor Trait
// ============================================================================
//
// Common interface for long-lived operations run by a `Group`.
//
// `execute` is the blocking phase; it runs on its own task until the actor's
// work is done or until `interrupt` asks it to stop. `interrupt` runs on the
// group's coordinator and must not block: it flips a token, closes a channel
// or spawns a bounded shutdown, and returns.
//
// ============================================================================

/// A unit of work supervised by a [`Group`](super::Group).
#[async_trait]
pub trait Actor: Send + Sync + 'static {
    /// Name used in logs and in the termination record
    fn name(&self) -> &str;

    /// Runs until the actor's work is over or until `interrupt` is called.
    async fn execute(&self) -> anyhow::Result<()>;

    /// Asks a running `execute` to return.
    ///
    /// `cause` is the error of the actor that stopped the group, or `None` if
    /// it returned cleanly. Must be safe to call after `execute` returned.
    fn interrupt(&self, cause: Option<&anyhow::Error>);
}

#[async_trait]
impl<A: Actor> Actor for Arc<A> {
    fn name(&self) -> &str {
        A::name(self)
    }

    async fn execute(&self) -> anyhow::Result<()> {
        A::execute(self).await
    }

    fn interrupt(&self, cause: Option<&anyhow::Error>) {
        A::interrupt(self, cause)
    }
}
