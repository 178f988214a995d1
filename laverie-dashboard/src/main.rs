/**
 * LAVERIE DASHBOARD - Point d'entrée du coeur temps réel
 *
 * RÔLE : Orchestration des modules : config, cache, registre de handlers,
 * canal événements, health. Bootstrap complet avec teardown propre.
 *
 * ARCHITECTURE : Event-driven via WebSocket + invalidation de cache +
 * pipelines d'agrégation purs consommés par la couche de présentation.
 * UTILITÉ : Process unique côté exploitation, un canal par process — c'est
 * ce main qui garantit l'instanciation unique du canal.
 */

use laverie_dashboard::cache::{DataCache, MemoryCache};
use laverie_dashboard::channel::{event_stream_url, EventChannel};
use laverie_dashboard::config::load_config;
use laverie_dashboard::health::ChannelHealth;
use laverie_dashboard::refresh::register_refresh_handlers;
use laverie_dashboard::registry::HandlerRegistry;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok(); // Ok si .env n'existe pas

    let cfg = load_config().await;

    let url = match event_stream_url(&cfg.server.origin) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("[dashboard] origine serveur invalide: {e}");
            std::process::exit(1);
        }
    };

    // cache partagé + registre, injectés dans le canal
    let cache: Arc<dyn DataCache> = Arc::new(MemoryCache::new());
    let registry = HandlerRegistry::new();

    // consommateurs standards : événement entrant → invalidation des clés
    let _guards = register_refresh_handlers(&registry, Arc::clone(&cache));
    println!("[dashboard] {} handlers de rafraîchissement branchés", registry.len());

    // santé du canal + résumé périodique
    let health = ChannelHealth::new();
    health.spawn_health_logger(registry.clone());

    let channel = EventChannel::new(url.clone(), registry, health);
    channel.open();
    println!("[dashboard] canal événements démarré sur {url}");

    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("[dashboard] attente du signal impossible: {e}");
    }
    println!("[dashboard] arrêt demandé, fermeture du canal");
    channel.close().await;
}
