use crate::models::{Machine, MachineStatus};
use serde::Serialize;

/// Rollup des indicateurs de la flotte. Sur une collection vide, les taux
/// dérivés valent None : jamais de NaN propagé vers un pourcentage rendu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total: usize,
    pub online: usize,
    /// Uptime moyen 0-100, None si aucune machine
    pub avg_uptime: Option<f64>,
    pub total_errors: u64,
    /// Score santé composite 0-100 : moyenne non pondérée de la fraction en
    /// ligne et de (uptime moyen / 100), exprimée en pourcentage. None si
    /// aucune machine.
    pub health_score: Option<f64>,
}

/// Statuts comptés comme "en ligne" : la machine répond et peut servir.
/// Une machine signalée en maintenance n'en fait pas partie.
pub fn is_online(status: MachineStatus) -> bool {
    matches!(status, MachineStatus::Available | MachineStatus::InUse)
}

pub fn kpi_rollup(machines: &[Machine]) -> KpiSummary {
    let total = machines.len();
    let total_errors: u64 = machines.iter().map(|m| m.metrics.errors).sum();

    if total == 0 {
        return KpiSummary {
            total: 0,
            online: 0,
            avg_uptime: None,
            total_errors,
            health_score: None,
        };
    }

    let online = machines.iter().filter(|m| is_online(m.status)).count();
    let avg_uptime = machines.iter().map(|m| m.metrics.uptime).sum::<f64>() / total as f64;
    let online_fraction = online as f64 / total as f64;
    let health_score = (online_fraction + avg_uptime / 100.0) / 2.0 * 100.0;

    KpiSummary {
        total,
        online,
        avg_uptime: Some(avg_uptime),
        total_errors,
        health_score: Some(health_score),
    }
}
