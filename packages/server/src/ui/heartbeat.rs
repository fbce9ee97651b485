//! Periodic liveness check.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::usecase::SweepConnectionsUseCase;

/// Spawn the heartbeat loop. Every `period` the connections that missed the
/// previous ping are closed and the rest are pinged again.
pub fn spawn_heartbeat(
    sweep_connections_usecase: Arc<SweepConnectionsUseCase>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval の初回 tick は即時に完了するので読み捨てる
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let closed = sweep_connections_usecase.execute().await;
            if !closed.is_empty() {
                tracing::info!("Heartbeat closed {} stale connection(s)", closed.len());
            }
        }
    })
}
