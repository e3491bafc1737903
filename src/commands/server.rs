use std::sync::Arc;

use crate::actors::{Group, ListenerActor, OsSignals, SignalSource, SignalWatcher};
use crate::config::ServerConfig;
use crate::domain::names::NamesTable;
use crate::http::{ApiState, HttpListener};
use crate::metrics::Metrics;
use crate::rpc::{GrpcListener, NamesRpc};

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let signals = OsSignals::new()?;
    build_group(&config, signals).await?.run().await
}

/// Loads the dataset, binds both listeners and wires them into one group.
pub async fn build_group<S: SignalSource>(config: &ServerConfig, signals: S) -> anyhow::Result<Group> {
    let table = match &config.dataset {
        Some(path) => NamesTable::load(path)?,
        None => NamesTable::embedded()?,
    };
    if table.is_empty() {
        tracing::warn!("Names table is empty, every lookup will return not found");
    }
    tracing::info!(
        records = table.len(),
        years = ?table.years(),
        "Names table loaded"
    );

    let table = Arc::new(table);
    let metrics = Arc::new(Metrics::new()?);
    tracing::debug!(
        families = metrics.registry().gather().len(),
        "Metrics registry created"
    );
    let deadline = config.shutdown.deadline;

    let http = HttpListener::bind(
        &config.http_addr,
        ApiState::new(table.clone(), metrics.clone(), config.http_debug),
    )?
    .with_workers(config.http_workers)
    .with_drain_timeout(deadline);
    let grpc = GrpcListener::bind(&config.grpc_addr, NamesRpc::new(table, metrics)).await?;
    tracing::info!(
        http = %http.local_addr(),
        grpc = %grpc.local_addr(),
        "Listeners bound"
    );

    let mut group = Group::new();
    group
        .add_actor(ListenerActor::new(http, deadline))
        .add_actor(ListenerActor::new(grpc, deadline))
        .add_actor(SignalWatcher::new(signals));

    tracing::debug!(actors = group.len(), "Server group assembled");
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{ActorError, Signal};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn local_config() -> ServerConfig {
        ServerConfig {
            http_addr: "127.0.0.1:0".to_string(),
            grpc_addr: "127.0.0.1:0".to_string(),
            http_workers: 1,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_signal_stops_both_listeners() {
        let (tx, rx) = mpsc::unbounded_channel();
        let group = build_group(&local_config(), rx).await.unwrap();
        assert_eq!(group.len(), 3);

        let running = tokio::spawn(group.run_until_terminated());
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(Signal::Interrupt).unwrap();

        let termination = tokio::time::timeout(Duration::from_secs(10), running)
            .await
            .expect("server group should stop after a signal")
            .unwrap()
            .unwrap();
        assert_eq!(termination.name, "signal_watcher");
        assert!(matches!(
            termination.error().and_then(|e| e.downcast_ref::<ActorError>()),
            Some(ActorError::Signal(Signal::Interrupt))
        ));
    }

    #[tokio::test]
    async fn test_missing_dataset_fails_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            dataset: Some(dir.path().join("missing.csv")),
            ..local_config()
        };

        let (_tx, rx) = mpsc::unbounded_channel::<Signal>();
        let err = build_group(&config, rx).await.err().unwrap();
        assert!(err.to_string().contains("missing.csv"));
    }

    #[tokio::test]
    async fn test_custom_dataset_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.csv");
        std::fs::write(&path, "year,id,name\n2020,1,Zoe\n").unwrap();
        let config = ServerConfig {
            dataset: Some(path),
            ..local_config()
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let group = build_group(&config, rx).await.unwrap();
        tx.send(Signal::Terminate).unwrap();

        let err = group.run().await.unwrap_err();
        assert_eq!(err.to_string(), "caught signal: terminated");
    }
}
