/*!
Test Harness pour les consommateurs du dashboard

Facilite l'écriture de tests avec:
- Setup automatique du stub de flux + cache mémoire + handlers standards
- Assertions sur les invalidations de cache et les messages livrés
- Expectations sur le nombre de messages par type
*/

use crate::feed_stub::{FeedStub, LaverieMessageBuilder};
use anyhow::Result;
use laverie_dashboard::cache::{keys, DataCache, MemoryCache};
use laverie_dashboard::models::InboundMessage;
use laverie_dashboard::refresh::register_refresh_handlers;
use laverie_dashboard::registry::Registration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Harness de test complet : stub de flux branché sur les consommateurs de
/// rafraîchissement standards, cache mémoire observable, enregistreur de
/// messages livrés.
pub struct TestHarness {
    pub feed: FeedStub,
    pub cache: Arc<MemoryCache>,
    delivered: Arc<Mutex<Vec<InboundMessage>>>,
    expectations: Vec<Expectation>,
    _guards: Vec<Registration>,
}

#[derive(Debug)]
struct Expectation {
    kind: String,
    expected_count: usize,
}

impl TestHarness {
    /// Crée un nouveau harness de test
    pub fn new() -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        let feed = FeedStub::new();
        let cache = Arc::new(MemoryCache::new());

        let mut guards =
            register_refresh_handlers(feed.registry(), cache.clone() as Arc<dyn DataCache>);

        let delivered: Arc<Mutex<Vec<InboundMessage>>> = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&delivered);
        guards.push(
            feed.registry()
                .register(move |msg| recorder.lock().unwrap().push(msg.clone())),
        );

        Self {
            feed,
            cache,
            delivered,
            expectations: Vec::new(),
            _guards: guards,
        }
    }

    /// Remplit le cache avec une réponse vide pour chaque clé standard,
    /// pour pouvoir observer les invalidations.
    pub fn seed_cache(&self) {
        for key in [keys::MACHINES, keys::LOCATIONS, keys::ALERTS, keys::USAGE] {
            self.cache.set(key, serde_json::json!([]));
        }
        log::info!("🌱 Seeded cache with {} keys", 4);
    }

    /// Ajoute une expectation: on s'attend à N messages livrés de ce type
    pub fn expect_messages(&mut self, kind: &str, count: usize) -> &mut Self {
        self.expectations.push(Expectation {
            kind: kind.to_string(),
            expected_count: count,
        });
        self
    }

    /// Simule un événement machine_update
    pub fn send_machine_update(&self, machine_id: &str, status: &str) -> Result<()> {
        self.feed
            .inject_message(&LaverieMessageBuilder::machine_update(machine_id, status))?;
        log::info!("🧺 Sent machine update for: {}", machine_id);
        Ok(())
    }

    /// Simule un événement alert_raised
    pub fn send_alert_raised(&self, alert_id: &str, machine_id: &str, level: &str) -> Result<()> {
        self.feed.inject_message(&LaverieMessageBuilder::alert_raised(
            alert_id, machine_id, level,
        ))?;
        log::info!("🚨 Sent alert for machine: {}", machine_id);
        Ok(())
    }

    /// Simule un événement alert_cleared
    pub fn send_alert_cleared(&self, alert_id: &str) -> Result<()> {
        self.feed
            .inject_message(&LaverieMessageBuilder::alert_cleared(alert_id))?;
        log::info!("✅ Cleared alert: {}", alert_id);
        Ok(())
    }

    /// Simule un événement sync_completed
    pub fn send_sync_completed(&self, location_id: &str, machines_synced: u32) -> Result<()> {
        self.feed.inject_message(&LaverieMessageBuilder::sync_completed(
            location_id.to_string(),
            machines_synced,
        ))?;
        log::info!("🔄 Sent sync completion for: {}", location_id);
        Ok(())
    }

    /// Messages livrés aux handlers pour un type donné
    pub fn messages_of_kind(&self, kind: &str) -> Vec<InboundMessage> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.kind == kind)
            .cloned()
            .collect()
    }

    /// Parse le payload du dernier message livré d'un type donné
    pub fn last_payload_of<T>(&self, kind: &str) -> Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let messages = self.messages_of_kind(kind);
        if let Some(last_msg) = messages.last() {
            let parsed: T = serde_json::from_value(last_msg.payload.clone())?;
            Ok(Some(parsed))
        } else {
            Ok(None)
        }
    }

    /// Attend qu'au moins N messages d'un type soient livrés. Utile quand le
    /// harness est branché derrière un vrai canal plutôt que le stub.
    pub async fn wait_for_messages(&self, kind: &str, count: usize, timeout_ms: u64) -> Result<()> {
        let start = std::time::Instant::now();

        while start.elapsed() < Duration::from_millis(timeout_ms) {
            if self.messages_of_kind(kind).len() >= count {
                log::info!("✅ Received {} messages of kind '{}'", count, kind);
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        log::warn!("⏰ Timeout waiting for messages of kind '{}'", kind);
        anyhow::bail!("Timeout: expected {} messages of kind '{}'", count, kind)
    }

    /// Vérifie toutes les expectations configurées
    pub fn verify_expectations(&self) -> Result<()> {
        log::info!("🔍 Verifying {} expectations...", self.expectations.len());

        for expectation in &self.expectations {
            let actual_count = self.messages_of_kind(&expectation.kind).len();
            if actual_count != expectation.expected_count {
                anyhow::bail!(
                    "Expectation failed for kind '{}': expected {} messages, got {}",
                    expectation.kind,
                    expectation.expected_count,
                    actual_count
                );
            }
            log::info!(
                "✅ Kind '{}': {} messages as expected",
                expectation.kind,
                actual_count
            );
        }

        Ok(())
    }

    /// Assert qu'une clé ressource a bien été invalidée
    pub fn assert_invalidated(&self, key: &str) -> Result<()> {
        if self.cache.get(key).is_some() {
            anyhow::bail!("Expected key '{}' to be invalidated, but it is still cached", key);
        }
        log::info!("✅ Key '{}' invalidated", key);
        Ok(())
    }

    /// Assert qu'une clé ressource est toujours en cache
    pub fn assert_still_cached(&self, key: &str) -> Result<()> {
        if self.cache.get(key).is_none() {
            anyhow::bail!("Expected key '{}' to still be cached, but it is gone", key);
        }
        Ok(())
    }

    /// Stats sur les messages livrés
    pub fn get_stats(&self) -> TestStats {
        let delivered = self.delivered.lock().unwrap();
        let mut kind_counts = HashMap::new();
        for msg in delivered.iter() {
            *kind_counts.entry(msg.kind.clone()).or_insert(0) += 1;
        }

        TestStats {
            total_messages: delivered.len(),
            kind_counts,
            cached_keys: self.cache.len(),
        }
    }

    /// Reset le harness pour un nouveau test
    pub fn reset(&mut self) {
        self.feed.clear();
        self.delivered.lock().unwrap().clear();
        self.expectations.clear();
        log::info!("🧹 Test harness reset");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct TestStats {
    pub total_messages: usize,
    pub kind_counts: HashMap<String, usize>,
    pub cached_keys: usize,
}

impl TestStats {
    pub fn print(&self) {
        println!("📊 Test Statistics:");
        println!("  Total messages: {}", self.total_messages);
        println!("  Kinds with messages:");
        for (kind, count) in &self.kind_counts {
            println!("    {}: {} messages", kind, count);
        }
        println!("  Cached keys: {}", self.cached_keys);
    }
}
