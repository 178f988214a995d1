//! Tests d'intégration du canal événements contre un vrai serveur WebSocket
//! local : livraison, trame invalide, reconnexion unique, teardown.

use futures_util::SinkExt;
use laverie_dashboard::channel::{event_stream_url, EventChannel};
use laverie_dashboard::health::{ChannelHealth, ChannelStatus};
use laverie_dashboard::models::InboundMessage;
use laverie_dashboard::registry::HandlerRegistry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Attend qu'une condition devienne vraie, avec plafond généreux pour
/// absorber les machines de CI lentes.
async fn wait_until<F: Fn() -> bool>(condition: F, what: &str) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("timeout en attendant: {what}");
}

#[tokio::test]
async fn test_delivery_malformed_frame_and_single_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let connections = Arc::new(AtomicUsize::new(0));
    let server_connections = Arc::clone(&connections);

    let server = tokio::spawn(async move {
        // première connexion : deux trames valides encadrant une trame
        // invalide, puis coupure brutale
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        server_connections.fetch_add(1, Ordering::SeqCst);

        ws.send(Message::Text(
            r#"{"type":"machine_update","payload":{"machineId":"m1"}}"#.to_string(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text("{not json".to_string())).await.unwrap();
        ws.send(Message::Text(
            r#"{"type":"alert_raised","payload":{"alertId":"a1"}}"#.to_string(),
        ))
        .await
        .unwrap();

        // laisser partir les trames avant de couper
        tokio::time::sleep(Duration::from_millis(300)).await;
        drop(ws);

        // le canal doit revenir après le délai fixe — une seule fois
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await.unwrap();
        server_connections.fetch_add(1, Ordering::SeqCst);

        // garder la seconde connexion ouverte le temps des assertions
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(ws);
    });

    let url = event_stream_url(&format!("http://127.0.0.1:{port}")).unwrap();
    let health = ChannelHealth::new();
    let channel = EventChannel::new(url, HandlerRegistry::new(), health.clone());

    let seen: Arc<parking_lot::Mutex<Vec<InboundMessage>>> =
        Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _reg = channel.register_handler(move |msg| sink.lock().push(msg.clone()));

    channel.open();
    // open() est idempotent : pas de seconde connexion parallèle
    channel.open();

    // seules les deux trames valides atteignent les handlers, dans l'ordre
    wait_until(|| seen.lock().len() == 2, "livraison des trames valides").await;
    {
        let messages = seen.lock();
        assert_eq!(messages[0].kind, "machine_update");
        assert_eq!(messages[1].kind, "alert_raised");
    }

    // la coupure déclenche exactement une reconnexion
    wait_until(
        || connections.load(Ordering::SeqCst) == 2,
        "reconnexion après coupure",
    )
    .await;
    assert_eq!(health.status(), ChannelStatus::Connected);
    assert_eq!(health.reconnects(), 1);

    // pas de connexion dupliquée dans la foulée
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(connections.load(Ordering::SeqCst), 2);

    channel.close().await;
    assert_eq!(health.status(), ChannelStatus::Disconnected);
    server.abort();
}

#[tokio::test]
async fn test_close_suppresses_pending_reconnect() {
    // aucun serveur n'écoute : le canal boucle connexion refusée → attente
    let url = event_stream_url("http://127.0.0.1:1").unwrap();
    let registry = HandlerRegistry::new();
    let health = ChannelHealth::new();
    let channel = EventChannel::new(url, registry, health.clone());

    channel.open();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // close() rend la main sans attendre la fin du délai de reconnexion
    tokio::time::timeout(Duration::from_secs(2), channel.close())
        .await
        .expect("close doit annuler la reconnexion en attente");
    assert_eq!(health.status(), ChannelStatus::Disconnected);

    // aucune tentative ne part après le teardown
    let reconnects_at_close = health.reconnects();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(health.reconnects(), reconnects_at_close);
}

#[tokio::test]
async fn test_channel_retries_until_server_appears() {
    // réserve un port puis le libère : premières tentatives refusées
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = event_stream_url(&format!("http://127.0.0.1:{port}")).unwrap();
    let registry = HandlerRegistry::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let _reg = registry.register(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let health = ChannelHealth::new();
    let channel = EventChannel::new(url, registry, health.clone());
    channel.open();

    // laisser échouer au moins une tentative avant d'ouvrir le serveur
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"{"type":"sync_completed","payload":{}}"#.to_string(),
        ))
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(ws);
    });

    wait_until(
        || seen.load(Ordering::SeqCst) == 1,
        "livraison après retries",
    )
    .await;
    assert!(health.reconnects() >= 1);

    channel.close().await;
    server.abort();
}
