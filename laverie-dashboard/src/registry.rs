/**
 * HANDLER REGISTRY - Registre des consommateurs du canal événements
 *
 * RÔLE :
 * Découple la durée de vie des handlers de celle du canal. Chaque
 * enregistrement est indépendant : le même handler peut être enregistré
 * deux fois et chaque enregistrement se retire séparément.
 *
 * FONCTIONNEMENT :
 * - Ordre d'insertion préservé, livraison dans cet ordre
 * - Retrait par identité (id monotone), jamais par égalité de comportement
 * - dispatch() fige la liste courante avant d'invoquer : un retrait pendant
 *   la livraison ne perturbe pas les messages en vol
 */

use crate::models::InboundMessage;
use parking_lot::Mutex;
use std::sync::Arc;

pub type Handler = Arc<dyn Fn(&InboundMessage) + Send + Sync>;

struct Entry {
    id: u64,
    handler: Handler,
}

struct RegistryInner {
    next_id: u64,
    entries: Vec<Entry>,
}

#[derive(Clone)]
pub struct HandlerRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Enregistre un handler et retourne la capacité de le retirer.
    pub fn register<F>(&self, handler: F) -> Registration
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            handler: Arc::new(handler),
        });
        Registration {
            id,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Livre un message à tous les handlers courants, dans l'ordre
    /// d'enregistrement, de manière synchrone.
    pub fn dispatch(&self, msg: &InboundMessage) {
        let snapshot: Vec<Handler> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|e| Arc::clone(&e.handler))
            .collect();
        for handler in snapshot {
            handler(msg);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Capacité de désenregistrement : retire exactement l'enregistrement qui
/// l'a produite. Un second appel est un no-op.
pub struct Registration {
    id: u64,
    inner: Arc<Mutex<RegistryInner>>,
}

impl Registration {
    pub fn unregister(&self) {
        self.inner.lock().entries.retain(|e| e.id != self.id);
    }
}
