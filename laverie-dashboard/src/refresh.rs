use crate::cache::{keys, DataCache};
use crate::registry::{HandlerRegistry, Registration};
use std::sync::Arc;

/// Types de messages entrants reconnus par les consommateurs de
/// rafraîchissement. Tout autre type traverse le canal sans effet ici.
pub mod kinds {
    pub const MACHINE_UPDATE: &str = "machine_update";
    pub const LOCATION_UPDATE: &str = "location_update";
    pub const ALERT_RAISED: &str = "alert_raised";
    pub const ALERT_CLEARED: &str = "alert_cleared";
    pub const SYNC_COMPLETED: &str = "sync_completed";
}

/// Branche les consommateurs standards : événement entrant → invalidation
/// des clés ressource concernées. Le prochain rendu refetch des données
/// fraîches. Les gardes retournées maintiennent les enregistrements en vie.
pub fn register_refresh_handlers(
    registry: &HandlerRegistry,
    cache: Arc<dyn DataCache>,
) -> Vec<Registration> {
    let mut guards = Vec::new();

    let machines_cache = Arc::clone(&cache);
    guards.push(registry.register(move |msg| {
        if msg.kind == kinds::MACHINE_UPDATE {
            machines_cache.invalidate(keys::MACHINES);
            println!("[refresh] machines invalidées ({})", msg.kind);
        }
    }));

    let locations_cache = Arc::clone(&cache);
    guards.push(registry.register(move |msg| {
        if msg.kind == kinds::LOCATION_UPDATE {
            locations_cache.invalidate(keys::LOCATIONS);
            println!("[refresh] emplacements invalidés ({})", msg.kind);
        }
    }));

    let alerts_cache = Arc::clone(&cache);
    guards.push(registry.register(move |msg| {
        if msg.kind == kinds::ALERT_RAISED || msg.kind == kinds::ALERT_CLEARED {
            alerts_cache.invalidate(keys::ALERTS);
            println!("[refresh] alertes invalidées ({})", msg.kind);
        }
    }));

    // une synchronisation machine rafraîchit l'inventaire ET l'utilisation
    let sync_cache = Arc::clone(&cache);
    guards.push(registry.register(move |msg| {
        if msg.kind == kinds::SYNC_COMPLETED {
            sync_cache.invalidate(keys::MACHINES);
            sync_cache.invalidate(keys::USAGE);
            println!("[refresh] sync terminée, machines + usage invalidés");
        }
    }));

    guards
}
