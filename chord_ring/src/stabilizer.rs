use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::network::Network;

/// Background task that runs [`Network::stabilize_all`] on a fixed period.
/// Ticks are delayed while a walk is still running, so runs never overlap.
pub struct Stabilizer {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Stabilizer {
    pub fn spawn(network: Network, period: Duration) -> Self {
        let (shutdown, mut signal) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = signal.changed() => break,
                    _ = ticker.tick() => {
                        debug!("stabilization tick");
                        network.stabilize_all().await;
                    }
                }
            }
            debug!("stabilizer stopped");
        });
        Stabilizer { shutdown, task }
    }

    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
