use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerConf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConf {
    /// Origine du backend (ex: "https://fleet.example.com") ; le flux
    /// événements en est dérivé par bascule de schéma + chemin /ws.
    pub origin: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server: ServerConf {
                origin: "http://localhost:8080".into(),
            },
        }
    }
}

pub async fn load_config() -> DashboardConfig {
    let path = std::env::var("LAVERIE_DASHBOARD_CONFIG").unwrap_or_else(|_| "dashboard.yaml".into());
    if Path::new(&path).exists() {
        let txt = fs::read_to_string(&path).await.unwrap_or_default();
        if txt.trim().is_empty() {
            return DashboardConfig::default();
        }
        serde_yaml::from_str(&txt).unwrap_or_else(|e| {
            eprintln!("[dashboard] config invalide: {e}");
            DashboardConfig::default()
        })
    } else {
        eprintln!("[dashboard] pas de dashboard.yaml, usage config par défaut");
        DashboardConfig::default()
    }
}
