use crate::models::{Alert, AlertKind, AlertState, Machine, MachineStatus};
use serde::Serialize;
use std::collections::HashMap;

/// Habillage d'affichage d'un statut : table fermée libellé + couleur fixe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusStyle {
    pub label: &'static str,
    pub color: &'static str,
}

pub fn status_style(status: MachineStatus) -> StatusStyle {
    match status {
        MachineStatus::Available => StatusStyle {
            label: "Available",
            color: "#4caf50",
        },
        MachineStatus::InUse => StatusStyle {
            label: "In use",
            color: "#2196f3",
        },
        MachineStatus::MaintenanceRequired => StatusStyle {
            label: "Maintenance required",
            color: "#ff9800",
        },
        MachineStatus::Offline => StatusStyle {
            label: "Offline",
            color: "#9e9e9e",
        },
        MachineStatus::Error => StatusStyle {
            label: "Error",
            color: "#f44336",
        },
        MachineStatus::Unknown => StatusStyle {
            label: "Unknown",
            color: "#607d8b",
        },
    }
}

/// Un groupe du camembert de répartition des statuts.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSlice {
    pub status: MachineStatus,
    pub label: &'static str,
    pub color: &'static str,
    pub count: usize,
}

/// Regroupe les machines par statut canonique. Seuls les groupes non vides
/// sont émis, dans l'ordre canonique d'affichage : la somme des comptes vaut
/// toujours la taille de la collection d'entrée.
pub fn status_tally(machines: &[Machine]) -> Vec<StatusSlice> {
    let mut counts: HashMap<MachineStatus, usize> = HashMap::new();
    for machine in machines {
        *counts.entry(machine.status).or_insert(0) += 1;
    }

    MachineStatus::ALL
        .iter()
        .filter_map(|&status| {
            counts.get(&status).map(|&count| {
                let style = status_style(status);
                StatusSlice {
                    status,
                    label: style.label,
                    color: style.color,
                    count,
                }
            })
        })
        .collect()
}

pub fn alert_style(kind: AlertKind) -> StatusStyle {
    match kind {
        AlertKind::Error => StatusStyle {
            label: "Error",
            color: "#f44336",
        },
        AlertKind::Warning => StatusStyle {
            label: "Warning",
            color: "#ff9800",
        },
        AlertKind::Info => StatusStyle {
            label: "Info",
            color: "#2196f3",
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertSlice {
    pub kind: AlertKind,
    pub label: &'static str,
    pub color: &'static str,
    pub count: usize,
}

/// Répartition des alertes ACTIVES par type ; les alertes acquittées ne
/// comptent pas dans la distribution.
pub fn alert_tally(alerts: &[Alert]) -> Vec<AlertSlice> {
    let mut counts: HashMap<AlertKind, usize> = HashMap::new();
    for alert in alerts {
        if alert.status == AlertState::Active {
            *counts.entry(alert.kind).or_insert(0) += 1;
        }
    }

    [AlertKind::Error, AlertKind::Warning, AlertKind::Info]
        .iter()
        .filter_map(|&kind| {
            counts.get(&kind).map(|&count| {
                let style = alert_style(kind);
                AlertSlice {
                    kind,
                    label: style.label,
                    color: style.color,
                    count,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(id: &str, status: MachineStatus) -> Machine {
        Machine {
            id: id.to_string(),
            name: String::new(),
            location_id: String::new(),
            status,
            metrics: Default::default(),
            last_ping: None,
        }
    }

    #[test]
    fn test_tally_concrete_scenario() {
        let machines = vec![
            machine("m1", MachineStatus::Available),
            machine("m2", MachineStatus::Available),
            machine("m3", MachineStatus::Error),
        ];
        let tally = status_tally(&machines);

        assert_eq!(tally.len(), 2);
        assert_eq!(tally[0].status, MachineStatus::Available);
        assert_eq!(tally[0].count, 2);
        assert_eq!(tally[1].status, MachineStatus::Error);
        assert_eq!(tally[1].count, 1);
    }

    #[test]
    fn test_tally_counts_sum_to_input_size() {
        let machines = vec![
            machine("m1", MachineStatus::Available),
            machine("m2", MachineStatus::InUse),
            machine("m3", MachineStatus::Offline),
            machine("m4", MachineStatus::Unknown),
            machine("m5", MachineStatus::Unknown),
            machine("m6", MachineStatus::MaintenanceRequired),
        ];
        let tally = status_tally(&machines);
        let sum: usize = tally.iter().map(|s| s.count).sum();
        assert_eq!(sum, machines.len());
    }

    #[test]
    fn test_tally_empty_input() {
        assert!(status_tally(&[]).is_empty());
    }

    #[test]
    fn test_tally_is_referentially_transparent() {
        let machines = vec![
            machine("m1", MachineStatus::Available),
            machine("m2", MachineStatus::Error),
        ];
        let first = status_tally(&machines);
        let second = status_tally(&machines);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_tally_styles_come_from_closed_table() {
        let machines = vec![machine("m1", MachineStatus::MaintenanceRequired)];
        let tally = status_tally(&machines);
        assert_eq!(tally[0].label, "Maintenance required");
        assert_eq!(tally[0].color, "#ff9800");
    }

    fn alert(id: &str, kind: AlertKind, status: AlertState) -> Alert {
        Alert {
            id: id.to_string(),
            machine_id: "m1".into(),
            kind,
            status,
            message: String::new(),
            created_at: None,
        }
    }

    #[test]
    fn test_alert_tally_counts_only_active() {
        let alerts = vec![
            alert("a1", AlertKind::Error, AlertState::Active),
            alert("a2", AlertKind::Error, AlertState::Cleared),
            alert("a3", AlertKind::Warning, AlertState::Active),
            alert("a4", AlertKind::Info, AlertState::Active),
        ];
        let tally = alert_tally(&alerts);
        assert_eq!(tally.len(), 3);
        assert_eq!(tally[0].kind, AlertKind::Error);
        assert_eq!(tally[0].count, 1);
        assert_eq!(tally[1].kind, AlertKind::Warning);
        assert_eq!(tally[1].count, 1);
    }
}
