use std::sync::Arc;

use crate::actors::{
    error_channel, CancellableReader, Group, InputActor, LineSource, OsSignals, Outbound,
    SignalSource, SignalWatcher, StdinLines,
};
use crate::config::ClientConfig;
use crate::rpc::RpcOutbound;

pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let outbound = Arc::new(RpcOutbound::connect_lazy(
        &config.grpc_addr,
        config.request_timeout,
    )?);
    tracing::info!(address = %config.grpc_addr, "Client ready");

    build_group(&config, OsSignals::new()?, StdinLines::spawn()?, outbound)
        .run()
        .await
}

/// Signal watcher, error sink and input reader sharing one error channel.
pub fn build_group<S, L, O>(config: &ClientConfig, signals: S, lines: L, outbound: Arc<O>) -> Group
where
    S: SignalSource,
    L: LineSource,
    O: Outbound,
{
    let (errors, sink) = error_channel(config.error_buffer);

    let mut group = Group::new();
    group
        .add_actor(SignalWatcher::new(signals))
        .add_actor(sink)
        .add_actor(InputActor::new(
            CancellableReader::new(lines),
            outbound,
            errors,
        ));
    group
}
