/**
 * DATA CACHE - Frontière vers le cache requêtes/réponses du dashboard
 *
 * RÔLE :
 * Le coeur ne fait JAMAIS d'appel réseau lui-même : il consomme ce que le
 * cache lui rend et invalide les clés après une action mutante (sync,
 * acquittement d'alerte). Les clés sont les chemins ressource de l'API.
 *
 * FONCTIONNEMENT :
 * - DataCache trait = interface commune (get/set/invalidate)
 * - MemoryCache = implémentation in-process pour le binaire et les tests
 */

use crate::{new_state, Shared};
use serde_json::Value;
use std::collections::HashMap;

/// Clés ressource adressant le cache.
pub mod keys {
    pub const MACHINES: &str = "/api/machines";
    pub const LOCATIONS: &str = "/api/locations";
    pub const ALERTS: &str = "/api/alerts";
    pub const USAGE: &str = "/api/usage";
}

/// Interface commune que toutes les implémentations de cache exposent.
pub trait DataCache: Send + Sync {
    /// Lecture de la dernière réponse connue pour une clé ressource.
    fn get(&self, key: &str) -> Option<Value>;

    /// Dépôt d'une réponse fraîche pour une clé ressource.
    fn set(&self, key: &str, value: Value);

    /// Invalidation : la prochaine lecture repartira à vide.
    fn invalidate(&self, key: &str);
}

/// Cache mémoire partagé, suffisant pour un process unique sans durabilité.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Shared<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: new_state(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.entries.lock().insert(key.to_string(), value);
    }

    fn invalidate(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_invalidate() {
        let cache = MemoryCache::new();
        assert!(cache.get(keys::MACHINES).is_none());

        cache.set(keys::MACHINES, serde_json::json!([{"id": "m1"}]));
        assert_eq!(cache.get(keys::MACHINES).unwrap()[0]["id"], "m1");

        cache.invalidate(keys::MACHINES);
        assert!(cache.get(keys::MACHINES).is_none());
    }

    #[test]
    fn test_invalidate_unknown_key_is_noop() {
        let cache = MemoryCache::new();
        cache.set(keys::ALERTS, serde_json::json!([]));
        cache.invalidate("/api/inconnue");
        assert!(cache.get(keys::ALERTS).is_some());
    }
}
