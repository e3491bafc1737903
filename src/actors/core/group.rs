use futures_util::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::Actor;
use crate::actors::ActorError;

// ============================================================================
// Group Supervisor
// ============================================================================
//
// Runs a set of actors concurrently and stops all of them as soon as one
// stops.
//
// Lifecycle:
//   Group::new() ──► add()/add_actor() ... ──► run() (consumes the group)
//
// run():
//   1. spawn every execute on its own task
//   2. first completion becomes the termination record (written once)
//   3. interrupt every other actor with the trigger's outcome
//   4. wait until every execute has returned
//   5. return the trigger's outcome
//
// There is no timeout: an actor that ignores its interrupt keeps `run` from
// returning.
//
// ============================================================================

type Execute = BoxFuture<'static, anyhow::Result<()>>;
type Interrupt = Box<dyn FnOnce(Option<&anyhow::Error>) + Send>;

struct Member {
    name: String,
    execute: Execute,
    interrupt: Interrupt,
}

/// The actor whose `execute` returned first, and what it returned
#[derive(Debug)]
pub struct Termination {
    pub index: usize,
    pub name: String,
    pub result: anyhow::Result<()>,
}

impl Termination {
    pub fn error(&self) -> Option<&anyhow::Error> {
        self.result.as_ref().err()
    }
}

/// An ordered set of actors that run and stop together
#[derive(Default)]
pub struct Group {
    members: Vec<Member>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an actor built from an execute future and an interrupt closure.
    pub fn add<F, I>(&mut self, name: impl Into<String>, execute: F, interrupt: I) -> &mut Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
        I: FnOnce(Option<&anyhow::Error>) + Send + 'static,
    {
        self.members.push(Member {
            name: name.into(),
            execute: execute.boxed(),
            interrupt: Box::new(interrupt),
        });
        self
    }

    /// Appends a value implementing [`Actor`].
    pub fn add_actor<A: Actor>(&mut self, actor: A) -> &mut Self {
        let actor = Arc::new(actor);
        let runner = Arc::clone(&actor);
        let name = actor.name().to_string();

        self.add(
            name,
            async move { runner.execute().await },
            move |cause| actor.interrupt(cause),
        )
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Runs every actor and returns the outcome of the first one to finish.
    ///
    /// An empty group returns `Ok(())` immediately.
    pub async fn run(self) -> anyhow::Result<()> {
        match self.run_until_terminated().await {
            Some(termination) => termination.result,
            None => Ok(()),
        }
    }

    /// Like [`Group::run`], but hands back the whole termination record.
    ///
    /// Returns `None` only for an empty group.
    pub async fn run_until_terminated(self) -> Option<Termination> {
        if self.is_empty() {
            tracing::debug!("Actor group is empty, nothing to run");
            return None;
        }

        let total = self.len();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(usize, anyhow::Result<()>)>();
        let mut running = JoinSet::new();
        let mut names = Vec::with_capacity(total);
        let mut interrupts = Vec::with_capacity(total);

        for (index, member) in self.members.into_iter().enumerate() {
            let Member { name, execute, interrupt } = member;
            let done_tx = done_tx.clone();
            let task_name = name.clone();

            running.spawn(async move {
                let result = match AssertUnwindSafe(execute).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => Err(ActorError::Panicked {
                        name: task_name,
                        message: panic_message(payload.as_ref()),
                    }
                    .into()),
                };
                let _ = done_tx.send((index, result));
            });

            names.push(name);
            interrupts.push(Some(interrupt));
        }
        drop(done_tx);

        tracing::debug!(actors = total, "Actor group started");

        // Every task reports exactly once, panics included, so the channel
        // cannot close before the first report arrives.
        let (index, result) = done_rx.recv().await?;
        let termination = Termination {
            index,
            name: names[index].clone(),
            result,
        };

        match termination.error() {
            Some(error) => tracing::info!(
                actor = %termination.name,
                reason = error
                    .downcast_ref::<ActorError>()
                    .map_or("error", ActorError::as_label),
                error = %format!("{error:#}"),
                "Actor stopped with error, interrupting group"
            ),
            None => tracing::info!(
                actor = %termination.name,
                "Actor stopped, interrupting group"
            ),
        }

        for (position, interrupt) in interrupts.iter_mut().enumerate() {
            if position == termination.index {
                continue;
            }
            if let Some(interrupt) = interrupt.take() {
                tracing::debug!(actor = %names[position], "Interrupting actor");
                interrupt(termination.error());
            }
        }

        while let Some((position, result)) = done_rx.recv().await {
            match result {
                Ok(()) => tracing::debug!(actor = %names[position], "Actor returned"),
                Err(e) => tracing::debug!(
                    actor = %names[position],
                    error = %format!("{e:#}"),
                    "Actor returned with error after group shutdown"
                ),
            }
        }
        while running.join_next().await.is_some() {}

        tracing::debug!(actor = %termination.name, "Actor group stopped");
        Some(termination)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use tokio_util::sync::CancellationToken;

    /// Adds an actor that blocks until interrupted, counting interrupts.
    fn add_blocking(group: &mut Group, name: &str) -> Arc<AtomicUsize> {
        let interrupts = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let waiter = token.clone();
        let counter = interrupts.clone();

        group.add(
            name,
            async move {
                waiter.cancelled().await;
                Ok(())
            },
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                token.cancel();
            },
        );
        interrupts
    }

    #[tokio::test]
    async fn test_empty_group_returns_immediately() {
        let group = Group::new();
        assert!(group.is_empty());

        let started = Instant::now();
        assert!(group.run().await.is_ok());
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_empty_group_has_no_termination_record() {
        assert!(Group::new().run_until_terminated().await.is_none());
    }

    #[tokio::test]
    async fn test_first_error_stops_blocked_peer() {
        let mut group = Group::new();
        group.add(
            "boom",
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err(anyhow::anyhow!("boom"))
            },
            |_| {},
        );
        let interrupts = add_blocking(&mut group, "blocked");

        let started = Instant::now();
        let err = group.run().await.unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(interrupts.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_external_cancellation_of_one_actor_stops_the_rest() {
        let mut group = Group::new();
        let external = CancellationToken::new();
        let trigger = external.clone();
        let first_interrupted = Arc::new(AtomicUsize::new(0));
        let counter = first_interrupted.clone();

        group.add(
            "first",
            async move {
                trigger.cancelled().await;
                Ok(())
            },
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        let second = add_blocking(&mut group, "second");
        let third = add_blocking(&mut group, "third");
        assert_eq!(group.len(), 3);

        let handle = tokio::spawn(group.run_until_terminated());
        tokio::time::sleep(Duration::from_millis(20)).await;
        external.cancel();

        let termination = handle.await.unwrap().unwrap();
        assert_eq!(termination.index, 0);
        assert_eq!(termination.name, "first");
        assert!(termination.result.is_ok());
        assert_eq!(first_interrupted.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_later_errors_do_not_replace_the_first() {
        let mut group = Group::new();
        group.add("first", async { Err(anyhow::anyhow!("first")) }, |_| {});

        for name in ["second", "third"] {
            let token = CancellationToken::new();
            let waiter = token.clone();
            group.add(
                name,
                async move {
                    waiter.cancelled().await;
                    Err(anyhow::anyhow!("late"))
                },
                move |_| token.cancel(),
            );
        }

        let termination = group.run_until_terminated().await.unwrap();
        assert_eq!(termination.name, "first");
        assert_eq!(termination.error().unwrap().to_string(), "first");
    }

    #[tokio::test]
    async fn test_interrupt_receives_trigger_cause() {
        let mut group = Group::new();
        let seen = Arc::new(Mutex::new(None::<String>));
        let recorder = seen.clone();
        let token = CancellationToken::new();
        let waiter = token.clone();

        group.add("failing", async { Err(anyhow::anyhow!("disk full")) }, |_| {});
        group.add(
            "observer",
            async move {
                waiter.cancelled().await;
                Ok(())
            },
            move |cause| {
                *recorder.lock().unwrap() = cause.map(|e| e.to_string());
                token.cancel();
            },
        );

        let _ = group.run().await;
        assert_eq!(seen.lock().unwrap().as_deref(), Some("disk full"));
    }

    #[tokio::test]
    async fn test_run_waits_for_slow_interrupted_actor() {
        let mut group = Group::new();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let token = CancellationToken::new();
        let waiter = token.clone();

        group.add("quick", async { Ok(()) }, |_| {});
        group.add(
            "slow",
            async move {
                waiter.cancelled().await;
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            },
            move |_| token.cancel(),
        );

        group.run().await.unwrap();
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_interrupt_after_actor_already_returned() {
        let mut group = Group::new();
        let interrupts = Arc::new(AtomicUsize::new(0));
        let counter = interrupts.clone();

        group.add("a", async { Ok(()) }, |_| {});
        group.add(
            "b",
            async {
                tokio::task::yield_now().await;
                Ok(())
            },
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        let termination = group.run_until_terminated().await.unwrap();
        let expected = if termination.index == 0 { 1 } else { 0 };
        assert_eq!(interrupts.load(Ordering::SeqCst), expected);
    }

    #[tokio::test]
    async fn test_panicking_actor_becomes_the_reported_error() {
        let mut group = Group::new();
        group.add(
            "panicky",
            async {
                if true {
                    panic!("exploded");
                }
                Ok(())
            },
            |_| {},
        );
        let interrupts = add_blocking(&mut group, "peer");

        let err = group.run().await.unwrap_err();
        match err.downcast_ref::<ActorError>() {
            Some(ActorError::Panicked { name, message }) => {
                assert_eq!(name, "panicky");
                assert_eq!(message, "exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(interrupts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_actor_ignoring_interrupt_hangs_the_group() {
        let mut group = Group::new();
        group.add("done", async { Ok(()) }, |_| {});
        group.add("deaf", std::future::pending(), |_| {});

        let outcome = tokio::time::timeout(Duration::from_millis(100), group.run()).await;
        assert!(outcome.is_err(), "group must not return while an actor is still running");
    }

    struct Countdown {
        token: CancellationToken,
        interrupts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Actor for Countdown {
        fn name(&self) -> &str {
            "countdown"
        }

        async fn execute(&self) -> anyhow::Result<()> {
            self.token.cancelled().await;
            Ok(())
        }

        fn interrupt(&self, _cause: Option<&anyhow::Error>) {
            self.interrupts.fetch_add(1, Ordering::SeqCst);
            self.token.cancel();
        }
    }

    #[tokio::test]
    async fn test_trait_actors_are_interrupted_once() {
        let actor = Arc::new(Countdown {
            token: CancellationToken::new(),
            interrupts: AtomicUsize::new(0),
        });

        let mut group = Group::new();
        group.add_actor(actor.clone());
        group.add("stopper", async { Err(anyhow::anyhow!("stop")) }, |_| {});

        let termination = group.run_until_terminated().await.unwrap();
        assert_eq!(termination.name, "stopper");
        assert_eq!(actor.interrupts.load(Ordering::SeqCst), 1);
    }
}
