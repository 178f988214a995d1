use crate::models::{Location, Machine};
use serde::Serialize;
use std::collections::HashMap;

/// Taille maximale de la table affichée. La troncature s'applique APRÈS le
/// tri, jamais avant.
pub const MAX_TABLE_ROWS: usize = 15;

/// Ligne de la table de performance des baux : un emplacement et les
/// métriques agrégées de ses machines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaseRow {
    pub location_id: String,
    pub name: String,
    pub machines: u32,
    pub cycles: u64,
    pub errors: u64,
    /// Uptime moyen des machines du bail, 0 si le bail n'a pas de machine
    pub avg_uptime: f64,
}

/// Métrique de classement, choisie par nom dans un ensemble fermé.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseMetric {
    Cycles,
    Errors,
    Uptime,
}

impl LeaseMetric {
    pub fn value(&self, row: &LeaseRow) -> f64 {
        match self {
            LeaseMetric::Cycles => row.cycles as f64,
            LeaseMetric::Errors => row.errors as f64,
            LeaseMetric::Uptime => row.avg_uptime,
        }
    }
}

/// Clé de tri active : la métrique (descendant), le nom (ascendant) ou le
/// compte de machines (descendant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Metric,
    Name,
    MachineCount,
}

/// Agrège les machines par emplacement en lignes de performance. Chaque
/// emplacement produit une ligne, même sans machine (métriques à zéro).
pub fn lease_rows(locations: &[Location], machines: &[Machine]) -> Vec<LeaseRow> {
    let mut grouped: HashMap<&str, Vec<&Machine>> = HashMap::new();
    for machine in machines {
        grouped
            .entry(machine.location_id.as_str())
            .or_default()
            .push(machine);
    }

    locations
        .iter()
        .map(|location| {
            let fleet = grouped.get(location.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let count = fleet.len();
            let avg_uptime = if count == 0 {
                0.0
            } else {
                fleet.iter().map(|m| m.metrics.uptime).sum::<f64>() / count as f64
            };
            LeaseRow {
                location_id: location.id.clone(),
                name: location.name.clone(),
                machines: count as u32,
                cycles: fleet.iter().map(|m| m.metrics.cycles).sum(),
                errors: fleet.iter().map(|m| m.metrics.errors).sum(),
                avg_uptime,
            }
        })
        .collect()
}

/// Trie les lignes selon la clé active puis tronque à MAX_TABLE_ROWS.
/// Le tri est stable : à valeur égale, l'ordre d'entrée est conservé.
pub fn rank_leases(rows: &[LeaseRow], metric: LeaseMetric, sort: SortKey) -> Vec<LeaseRow> {
    let mut ranked: Vec<LeaseRow> = rows.to_vec();

    match sort {
        SortKey::Metric => {
            ranked.sort_by(|a, b| metric.value(b).total_cmp(&metric.value(a)));
        }
        SortKey::Name => {
            ranked.sort_by(|a, b| a.name.cmp(&b.name));
        }
        SortKey::MachineCount => {
            ranked.sort_by(|a, b| b.machines.cmp(&a.machines));
        }
    }

    ranked.truncate(MAX_TABLE_ROWS);
    ranked
}
