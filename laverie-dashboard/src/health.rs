use crate::registry::HandlerRegistry;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

/// États du canal événements : Disconnected → Connecting → Connected,
/// puis retour à Connecting via Reconnecting à chaque coupure. Pas d'état
/// terminal, le canal tourne pour la durée de vie du process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

#[derive(Debug, Serialize)]
pub struct DashboardHealth {
    pub uptime_seconds: u64,
    pub channel_status: ChannelStatus,
    pub channel_reconnects: u32,
    pub handlers_registered: usize,
}

#[derive(Clone)]
pub struct ChannelHealth {
    start_time: Instant,
    reconnects: Arc<AtomicU32>,
    status: Arc<parking_lot::Mutex<ChannelStatus>>,
}

impl ChannelHealth {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            reconnects: Arc::new(AtomicU32::new(0)),
            status: Arc::new(parking_lot::Mutex::new(ChannelStatus::Disconnected)),
        }
    }

    pub fn mark_connecting(&self) {
        *self.status.lock() = ChannelStatus::Connecting;
    }

    pub fn mark_connected(&self) {
        *self.status.lock() = ChannelStatus::Connected;
    }

    pub fn mark_disconnected(&self) {
        *self.status.lock() = ChannelStatus::Disconnected;
    }

    pub fn mark_reconnecting(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
        *self.status.lock() = ChannelStatus::Reconnecting;
    }

    pub fn status(&self) -> ChannelStatus {
        *self.status.lock()
    }

    pub fn reconnects(&self) -> u32 {
        self.reconnects.load(Ordering::Relaxed)
    }

    pub fn get_health(&self, registry: &HandlerRegistry) -> DashboardHealth {
        DashboardHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            channel_status: self.status(),
            channel_reconnects: self.reconnects(),
            handlers_registered: registry.len(),
        }
    }

    /// Trace un résumé de santé toutes les 30s. Le coeur n'a pas de contrat
    /// sortant, le résumé part donc dans le log.
    pub fn spawn_health_logger(&self, registry: HandlerRegistry) {
        let health_tracker = self.clone();

        task::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            interval.tick().await; // premier tick immédiat, on le saute

            loop {
                interval.tick().await;
                let health = health_tracker.get_health(&registry);
                println!(
                    "[health] uptime: {}s, channel: {:?}, reconnects: {}, handlers: {}",
                    health.uptime_seconds,
                    health.channel_status,
                    health.channel_reconnects,
                    health.handlers_registered
                );
            }
        });
    }
}

impl Default for ChannelHealth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        let health = ChannelHealth::new();
        assert_eq!(health.status(), ChannelStatus::Disconnected);

        health.mark_connecting();
        assert_eq!(health.status(), ChannelStatus::Connecting);

        health.mark_connected();
        assert_eq!(health.status(), ChannelStatus::Connected);

        health.mark_reconnecting();
        assert_eq!(health.status(), ChannelStatus::Reconnecting);
        assert_eq!(health.reconnects(), 1);

        health.mark_disconnected();
        assert_eq!(health.status(), ChannelStatus::Disconnected);
    }

    #[test]
    fn test_health_snapshot_counts_handlers() {
        let health = ChannelHealth::new();
        let registry = HandlerRegistry::new();
        let _reg = registry.register(|_| {});

        let snapshot = health.get_health(&registry);
        assert_eq!(snapshot.handlers_registered, 1);
        assert_eq!(snapshot.channel_reconnects, 0);
    }
}
