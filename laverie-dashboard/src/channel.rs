/**
 * EVENT CHANNEL - Canal événements temps réel du dashboard
 *
 * RÔLE :
 * Maintient LA connexion WebSocket vers le flux événements du backend et
 * garantit la livraison best-effort de chaque message entrant aux handlers
 * enregistrés, avec récupération automatique sur coupure transport.
 *
 * FONCTIONNEMENT :
 * - open() démarre une task superviseur unique : connexion → lecture →
 *   reconnexion après délai fixe (1s), indéfiniment, sans backoff
 * - close() bascule un drapeau watch honoré pendant la lecture ET pendant
 *   l'attente de reconnexion : aucune reconnexion ne part après teardown
 * - Les trames texte sont parsées en InboundMessage ; une trame invalide
 *   est tracée puis jetée, sans toucher aux handlers ni au canal
 *
 * UTILITÉ DANS LE DASHBOARD :
 * 🎯 Rafraîchissement temps réel : événements machines/alertes → invalidation cache
 * 🎯 Résilience : coupure réseau absorbée sans intervention
 * 🎯 Cycle de vie explicite : l'appelant possède l'instance, pas de singleton module
 */

use crate::health::ChannelHealth;
use crate::models::InboundMessage;
use crate::registry::{HandlerRegistry, Registration};
use anyhow::{anyhow, Result};
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Suffixe de chemin fixe du flux événements.
pub const EVENT_PATH: &str = "/ws";

/// Délai fixe avant chaque tentative de reconnexion. Pas de croissance ni de
/// plafond : l'exploitant intervient manuellement si le réseau reste coupé.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Dérive l'URL du flux événements depuis l'origine configurée :
/// schéma basculé vers ws(s), chemin fixé à /ws.
pub fn event_stream_url(origin: &str) -> Result<Url> {
    let mut url = Url::parse(origin)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(anyhow!("schéma d'origine non supporté: {other}")),
    };
    url.set_scheme(scheme)
        .map_err(|_| anyhow!("impossible de basculer le schéma de {origin}"))?;
    url.set_path(EVENT_PATH);
    Ok(url)
}

/// Parse une trame texte et la livre au registre. Une trame indécodable est
/// jetée message par message : le canal et les autres handlers n'en voient rien.
pub fn dispatch_frame(registry: &HandlerRegistry, frame: &str) {
    match serde_json::from_str::<InboundMessage>(frame) {
        Ok(msg) => registry.dispatch(&msg),
        Err(e) => eprintln!("[channel] trame invalide ignorée: {e}"),
    }
}

pub struct EventChannel {
    url: Url,
    registry: HandlerRegistry,
    health: ChannelHealth,
    shutdown: watch::Sender<bool>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl EventChannel {
    /// Le registre est injecté : l'application qui possède le canal décide
    /// de son unique instanciation.
    pub fn new(url: Url, registry: HandlerRegistry, health: ChannelHealth) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            url,
            registry,
            health,
            shutdown,
            supervisor: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn health(&self) -> &ChannelHealth {
        &self.health
    }

    /// Enregistre un handler sur le canal ; retourne la capacité de retrait.
    /// Raccourci vers le registre injecté.
    pub fn register_handler<F>(&self, handler: F) -> Registration
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        self.registry.register(handler)
    }

    /// Démarre la task superviseur. No-op si elle tourne déjà : jamais deux
    /// connexions en parallèle pour une même instance.
    pub fn open(&self) {
        let mut supervisor = self.supervisor.lock();
        if let Some(handle) = supervisor.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }

        self.shutdown.send_replace(false);
        let url = self.url.clone();
        let registry = self.registry.clone();
        let health = self.health.clone();
        let shutdown_rx = self.shutdown.subscribe();

        *supervisor = Some(tokio::spawn(run_supervisor(
            url,
            registry,
            health,
            shutdown_rx,
        )));
    }

    /// Teardown propre : coupe la connexion vive et supprime toute
    /// reconnexion en attente avant de rendre la main.
    pub async fn close(&self) {
        self.shutdown.send_replace(true);
        let handle = self.supervisor.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.health.mark_disconnected();
    }
}

async fn run_supervisor(
    url: Url,
    registry: HandlerRegistry,
    health: ChannelHealth,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut first_attempt = true;

    loop {
        if *shutdown.borrow() {
            break;
        }
        if !first_attempt {
            health.mark_reconnecting();
            // l'attente elle-même est annulable : close() pendant le délai
            // supprime la reconnexion en attente
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
            if *shutdown.borrow() {
                break;
            }
        }
        first_attempt = false;

        health.mark_connecting();
        let connected = tokio::select! {
            _ = shutdown.changed() => break,
            result = connect_async(url.as_str()) => result,
        };

        let mut stream = match connected {
            Ok((stream, _)) => {
                health.mark_connected();
                println!("[channel] connecté à {url}");
                stream
            }
            Err(e) => {
                eprintln!("[channel] connexion impossible: {e}");
                continue;
            }
        };

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    let _ = stream.close(None).await;
                    health.mark_disconnected();
                    return;
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(txt))) => dispatch_frame(&registry, &txt),
                    Some(Ok(Message::Close(_))) | None => {
                        eprintln!("[channel] connexion fermée par le serveur");
                        break;
                    }
                    // une erreur transport est tracée ; c'est la fin de flux
                    // qui suit qui déclenche la reconnexion
                    Some(Err(e)) => {
                        eprintln!("[channel] erreur transport: {e}");
                        break;
                    }
                    Some(Ok(_)) => {} // trames binaires/ping/pong ignorées
                }
            }
        }
    }

    health.mark_disconnected();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_event_stream_url_swaps_scheme() {
        let url = event_stream_url("http://localhost:8080").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8080/ws");

        let url = event_stream_url("https://fleet.example.com").unwrap();
        assert_eq!(url.as_str(), "wss://fleet.example.com/ws");
    }

    #[test]
    fn test_event_stream_url_replaces_existing_path() {
        let url = event_stream_url("https://fleet.example.com/dashboard").unwrap();
        assert_eq!(url.path(), "/ws");
    }

    #[test]
    fn test_event_stream_url_rejects_unknown_scheme() {
        assert!(event_stream_url("ftp://fleet.example.com").is_err());
        assert!(event_stream_url("pas une url").is_err());
    }

    #[test]
    fn test_malformed_frame_reaches_no_handler() {
        let registry = HandlerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _reg = registry.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        dispatch_frame(&registry, "{not json");
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        dispatch_frame(&registry, r#"{"type":"machine_update"}"#);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_frame_passes_message_unmodified() {
        let registry = HandlerRegistry::new();
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let sink = Arc::clone(&seen);
        let _reg = registry.register(move |msg: &InboundMessage| {
            *sink.lock() = Some(msg.clone());
        });

        dispatch_frame(
            &registry,
            r#"{"type":"alert_raised","payload":{"alertId":"a7","level":"error"}}"#,
        );
        let msg = seen.lock().clone().unwrap();
        assert_eq!(msg.kind, "alert_raised");
        assert_eq!(msg.payload["alertId"], "a7");
        assert_eq!(msg.payload["level"], "error");
    }
}
