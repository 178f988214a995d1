/**
 * EXPORT - Composition d'exports tabulaires et requêtes d'export historique
 *
 * RÔLE :
 * Seul artefact textuel produit par le coeur : transformation d'une liste
 * d'enregistrements uniformes en texte délimité (CSV), plus la construction
 * des paramètres de requête consommés par l'endpoint d'export historique.
 *
 * C'est aussi le seul chemin du coeur autorisé à remonter une erreur à
 * l'appelant : la plage de dates est une précondition, son absence est une
 * erreur typée affichable, pas un défaut silencieux.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::macros::format_description;
use time::Date;

/// Type MIME de l'artefact téléchargé.
pub const CSV_MIME: &str = "text/csv; charset=utf-8";

pub const CSV_DELIMITER: char = ',';

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("date range is required: both fromDate and toDate must be set")]
    MissingDateRange,
    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange { from: Date, to: Date },
}

/// Formate une date au format attendu par l'endpoint d'export (yyyy-MM-dd).
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// Nom de fichier de l'artefact : "<rapport>-<date ISO>.csv".
pub fn report_filename(report: &str, date: Date) -> String {
    format!("{report}-{}.csv", format_date(date))
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        // structures imbriquées rendues telles quelles en JSON
        Some(other) => other.to_string(),
    }
}

fn quote_if_needed(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) {
        format!("\"{field}\"")
    } else {
        field.to_string()
    }
}

/// Transforme une liste d'enregistrements uniformes en texte délimité :
/// ligne d'en-tête issue des noms de champs du PREMIER enregistrement, puis
/// une ligne par enregistrement. Toute valeur contenant le délimiteur est
/// mise entre guillemets. Fonction pure et totale sur entrée bien formée ;
/// entrée vide ou non tabulaire ⇒ chaîne vide.
pub fn to_delimited(records: &[Value], delimiter: char) -> String {
    let Some(first) = records.first().and_then(Value::as_object) else {
        return String::new();
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let sep = delimiter.to_string();

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| quote_if_needed(h, delimiter))
            .collect::<Vec<_>>()
            .join(&sep),
    );

    for record in records {
        let Some(obj) = record.as_object() else {
            continue;
        };
        lines.push(
            headers
                .iter()
                .map(|h| quote_if_needed(&scalar(obj.get(*h)), delimiter))
                .collect::<Vec<_>>()
                .join(&sep),
        );
    }

    lines.join("\n")
}

/// Ensemble fermé des types d'export historique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportType {
    MachineEvents,
    ServiceLogs,
    MachineUsage,
    ErrorCodes,
    EnergyConsumption,
    WaterUsage,
    MaintenanceRecords,
    PartsUsage,
}

impl ExportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportType::MachineEvents => "machine_events",
            ExportType::ServiceLogs => "service_logs",
            ExportType::MachineUsage => "machine_usage",
            ExportType::ErrorCodes => "error_codes",
            ExportType::EnergyConsumption => "energy_consumption",
            ExportType::WaterUsage => "water_usage",
            ExportType::MaintenanceRecords => "maintenance_records",
            ExportType::PartsUsage => "parts_usage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Json => "json",
        }
    }
}

/// Requête d'export historique, construite par le coeur et consommée par un
/// endpoint externe. La plage de dates est obligatoire et ordonnée.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub location_id: String,
    pub export_type: ExportType,
    pub format: ExportFormat,
    pub include_details: bool,
    pub from_date: Date,
    pub to_date: Date,
}

impl ExportRequest {
    pub fn new(
        location_id: impl Into<String>,
        export_type: ExportType,
        format: ExportFormat,
        include_details: bool,
        from_date: Option<Date>,
        to_date: Option<Date>,
    ) -> Result<Self, ExportError> {
        let (from_date, to_date) = match (from_date, to_date) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(ExportError::MissingDateRange),
        };
        if from_date > to_date {
            return Err(ExportError::InvalidDateRange {
                from: from_date,
                to: to_date,
            });
        }
        Ok(Self {
            location_id: location_id.into(),
            export_type,
            format,
            include_details,
            from_date,
            to_date,
        })
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("locationId", self.location_id.clone()),
            ("exportType", self.export_type.as_str().to_string()),
            ("format", self.format.as_str().to_string()),
            ("includeDetails", self.include_details.to_string()),
            ("fromDate", format_date(self.from_date)),
            ("toDate", format_date(self.to_date)),
        ]
    }

    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}
