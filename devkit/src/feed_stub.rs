/*!
Stub du flux événements pour développement sans serveur

Permet de développer et tester des consommateurs du canal sans démarrer de
backend WebSocket. Injecte des trames dans un vrai HandlerRegistry et
enregistre tout ce qui a été injecté.
*/

use anyhow::Result;
use laverie_dashboard::channel::dispatch_frame;
use laverie_dashboard::registry::HandlerRegistry;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Stub de flux qui remplace le canal WebSocket : mêmes handlers, mêmes
/// règles de dispatch, zéro réseau.
#[derive(Clone)]
pub struct FeedStub {
    registry: HandlerRegistry,
    injected_frames: Arc<Mutex<Vec<String>>>,
}

impl FeedStub {
    pub fn new() -> Self {
        Self::with_registry(HandlerRegistry::new())
    }

    /// Branche le stub sur un registre existant (celui que l'application
    /// injecterait dans son canal).
    pub fn with_registry(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            injected_frames: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Simule la réception d'une trame texte, exactement comme si elle
    /// arrivait du serveur (trame invalide = jetée sans toucher aux handlers).
    pub fn inject_frame(&self, frame: &str) {
        self.injected_frames
            .lock()
            .unwrap()
            .push(frame.to_string());
        log::info!("📨 [STUB] Injected frame: {} bytes", frame.len());
        dispatch_frame(&self.registry, frame);
    }

    /// Simule la réception d'un message structuré.
    pub fn inject_message(&self, message: &Value) -> Result<()> {
        let frame = serde_json::to_string(message)?;
        self.inject_frame(&frame);
        Ok(())
    }

    /// Récupère toutes les trames injectées (pour assertions de tests)
    pub fn injected_frames(&self) -> Vec<String> {
        self.injected_frames.lock().unwrap().clone()
    }

    /// Reset toutes les trames enregistrées
    pub fn clear(&self) {
        self.injected_frames.lock().unwrap().clear();
    }
}

impl Default for FeedStub {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper pour créer des messages de test au format du backend laveries
pub struct LaverieMessageBuilder;

impl LaverieMessageBuilder {
    /// Crée un événement machine_update
    pub fn machine_update<S: Into<String>>(machine_id: S, status: S) -> Value {
        serde_json::json!({
            "type": "machine_update",
            "payload": {
                "machineId": machine_id.into(),
                "status": status.into(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        })
    }

    /// Crée un événement alert_raised
    pub fn alert_raised<S: Into<String>>(alert_id: S, machine_id: S, level: S) -> Value {
        serde_json::json!({
            "type": "alert_raised",
            "payload": {
                "alertId": alert_id.into(),
                "machineId": machine_id.into(),
                "level": level.into(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        })
    }

    /// Crée un événement alert_cleared
    pub fn alert_cleared<S: Into<String>>(alert_id: S) -> Value {
        serde_json::json!({
            "type": "alert_cleared",
            "payload": {
                "alertId": alert_id.into(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        })
    }

    /// Crée un événement sync_completed
    pub fn sync_completed<S: Into<String>>(location_id: S, machines_synced: u32) -> Value {
        serde_json::json!({
            "type": "sync_completed",
            "payload": {
                "locationId": location_id.into(),
                "machinesSynced": machines_synced,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        })
    }
}
