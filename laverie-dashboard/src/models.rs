use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Statut canonique d'une machine, résolu une seule fois à l'ingestion.
/// Le backend renvoie soit une chaîne, soit un objet legacy { statusId }.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Available,
    InUse,
    MaintenanceRequired,
    Offline,
    Error,
    #[default]
    Unknown,
}

impl MachineStatus {
    /// Tous les statuts, dans l'ordre d'affichage des graphiques.
    pub const ALL: [MachineStatus; 6] = [
        MachineStatus::Available,
        MachineStatus::InUse,
        MachineStatus::MaintenanceRequired,
        MachineStatus::Offline,
        MachineStatus::Error,
        MachineStatus::Unknown,
    ];

    /// Mappe un libellé backend (ou legacy texte libre) vers le statut canonique.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => MachineStatus::Available,
            "IN_USE" => MachineStatus::InUse,
            "MAINTENANCE_REQUIRED" => MachineStatus::MaintenanceRequired,
            "OFFLINE" => MachineStatus::Offline,
            "ERROR" => MachineStatus::Error,
            _ => MachineStatus::Unknown,
        }
    }
}

/// Forme brute du champ statut côté wire : chaîne simple ou objet legacy.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawStatus {
    Simple(String),
    Legacy {
        #[serde(rename = "statusId")]
        status_id: String,
    },
}

impl RawStatus {
    pub fn resolve(&self) -> MachineStatus {
        match self {
            RawStatus::Simple(s) => MachineStatus::from_label(s),
            RawStatus::Legacy { status_id } => MachineStatus::from_label(status_id),
        }
    }
}

/// Désérialisation défensive du statut : toute forme inattendue retombe sur Unknown.
fn de_status<'de, D>(deserializer: D) -> Result<MachineStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match serde_json::from_value::<RawStatus>(value) {
        Ok(raw) => raw.resolve(),
        Err(_) => MachineStatus::Unknown,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MachineMetrics {
    /// Pourcentage de disponibilité 0-100
    #[serde(default)]
    pub uptime: f64,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub cycles: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location_id: String,
    #[serde(default, deserialize_with = "de_status")]
    pub status: MachineStatus,
    #[serde(default)]
    pub metrics: MachineMetrics,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_ping: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    /// Nom composite "<campus> - <emplacement>"
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timezone: String,
}

impl Location {
    pub fn split_name(&self) -> LocationName {
        LocationName::parse(&self.name)
    }
}

/// Décomposition du nom composite d'un emplacement.
/// Le découpage se fait sur le PREMIER " - " : la partie emplacement peut
/// elle-même contenir des tirets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationName {
    pub campus: String,
    pub location: String,
}

impl LocationName {
    pub fn parse(name: &str) -> Self {
        match name.split_once(" - ") {
            Some((campus, location)) => Self {
                campus: campus.to_string(),
                location: location.to_string(),
            },
            None => Self {
                campus: name.to_string(),
                location: String::new(),
            },
        }
    }
}

impl fmt::Display for LocationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}", self.campus)
        } else {
            write!(f, "{} - {}", self.campus, self.location)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    Active,
    Cleared,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(default)]
    pub machine_id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub status: AlertState,
    #[serde(default)]
    pub message: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Échantillon d'utilisation horaire remonté par le backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSample {
    /// Jour de la semaine en toutes lettres ("Sunday".."Saturday")
    pub day: String,
    /// Heure 0-23
    pub hour: u8,
    /// Pourcentage d'utilisation 0-100
    pub value: f64,
    #[serde(default)]
    pub location: Option<String>,
}

/// Message entrant du canal événements. Le canal le traite comme opaque :
/// il est transmis tel quel à chaque handler, seuls les consommateurs
/// interprètent `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_location_name() {
        let name = LocationName::parse("North Campus - Building 4 Laundry");
        assert_eq!(name.campus, "North Campus");
        assert_eq!(name.location, "Building 4 Laundry");
    }

    #[test]
    fn test_split_keeps_dashes_in_location_part() {
        let name = LocationName::parse("East - Hall B - 2nd floor");
        assert_eq!(name.campus, "East");
        assert_eq!(name.location, "Hall B - 2nd floor");
    }

    #[test]
    fn test_split_rejoin_roundtrip() {
        for original in ["North Campus - Building 4 Laundry", "A - B", "Sud - Résidence 12"] {
            let split = LocationName::parse(original);
            assert_eq!(split.to_string(), original);
            // re-découper le résultat redonne la même paire
            assert_eq!(LocationName::parse(&split.to_string()), split);
        }
    }

    #[test]
    fn test_split_without_separator() {
        let name = LocationName::parse("Campus Central");
        assert_eq!(name.campus, "Campus Central");
        assert_eq!(name.location, "");
        assert_eq!(name.to_string(), "Campus Central");
    }

    #[test]
    fn test_status_from_label() {
        assert_eq!(MachineStatus::from_label("AVAILABLE"), MachineStatus::Available);
        assert_eq!(MachineStatus::from_label("in_use"), MachineStatus::InUse);
        assert_eq!(MachineStatus::from_label("hors service"), MachineStatus::Unknown);
    }

    #[test]
    fn test_machine_legacy_status_object() {
        let machine: Machine = serde_json::from_str(
            r#"{"id":"m1","status":{"statusId":"MAINTENANCE_REQUIRED"}}"#,
        )
        .unwrap();
        assert_eq!(machine.status, MachineStatus::MaintenanceRequired);
    }

    #[test]
    fn test_machine_status_shape_mismatch_falls_back_to_unknown() {
        // objet sans statusId
        let machine: Machine =
            serde_json::from_str(r#"{"id":"m1","status":{"code":3}}"#).unwrap();
        assert_eq!(machine.status, MachineStatus::Unknown);

        // statut numérique inattendu
        let machine: Machine = serde_json::from_str(r#"{"id":"m2","status":7}"#).unwrap();
        assert_eq!(machine.status, MachineStatus::Unknown);

        // champ absent
        let machine: Machine = serde_json::from_str(r#"{"id":"m3"}"#).unwrap();
        assert_eq!(machine.status, MachineStatus::Unknown);
    }

    #[test]
    fn test_machine_metrics_default_to_zero() {
        let machine: Machine =
            serde_json::from_str(r#"{"id":"m1","status":"AVAILABLE"}"#).unwrap();
        assert_eq!(machine.metrics.errors, 0);
        assert_eq!(machine.metrics.cycles, 0);
        assert_eq!(machine.metrics.uptime, 0.0);
    }

    #[test]
    fn test_inbound_message_parsing() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"machine_update","payload":{"machineId":"m1"}}"#)
                .unwrap();
        assert_eq!(msg.kind, "machine_update");
        assert_eq!(msg.payload["machineId"], "m1");
    }
}
