use crate::models::UsageSample;
use serde::Serialize;

/// Jours calendaires, dimanche en tête, dans l'ordre des lignes de la grille.
pub const DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const HOURS_PER_DAY: usize = 24;

/// Grille d'utilisation 7 jours x 24 heures, toujours complète : chaque
/// cellule est définie, zéro par défaut, quelle que soit la densité des
/// échantillons d'entrée.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageGrid {
    cells: [[f64; HOURS_PER_DAY]; 7],
}

impl UsageGrid {
    pub fn zeroed() -> Self {
        Self {
            cells: [[0.0; HOURS_PER_DAY]; 7],
        }
    }

    pub fn cell(&self, day: usize, hour: usize) -> f64 {
        self.cells[day][hour]
    }

    pub fn rows(&self) -> &[[f64; HOURS_PER_DAY]; 7] {
        &self.cells
    }

    pub fn day_label(day: usize) -> &'static str {
        DAYS[day]
    }
}

fn day_index(label: &str) -> Option<usize> {
    DAYS.iter()
        .position(|d| d.eq_ignore_ascii_case(label.trim()))
}

/// Construit la grille jour x heure pour le filtre d'emplacement donné
/// (None = tous les emplacements).
///
/// Politique de fusion : la première écriture d'une cellule assigne la
/// valeur ; toute écriture suivante moyenne la valeur existante avec
/// l'entrante, soit (cellule + valeur) / 2. C'est une moyenne par paires
/// successives, PAS la moyenne vraie de toutes les contributions — le
/// comportement documenté est conservé tel quel.
///
/// Échantillons défensifs : jour inconnu, heure hors 0-23 ou valeur non
/// finie ⇒ échantillon ignoré ; valeur bornée à 0-100.
pub fn usage_grid(samples: &[UsageSample], location: Option<&str>) -> UsageGrid {
    let mut grid = UsageGrid::zeroed();
    let mut written = [[false; HOURS_PER_DAY]; 7];

    for sample in samples {
        if let Some(wanted) = location {
            match sample.location.as_deref() {
                Some(label) if label == wanted => {}
                _ => continue,
            }
        }

        let Some(day) = day_index(&sample.day) else {
            continue;
        };
        let hour = sample.hour as usize;
        if hour >= HOURS_PER_DAY || !sample.value.is_finite() {
            continue;
        }
        let value = sample.value.clamp(0.0, 100.0);

        if written[day][hour] {
            grid.cells[day][hour] = (grid.cells[day][hour] + value) / 2.0;
        } else {
            grid.cells[day][hour] = value;
            written[day][hour] = true;
        }
    }

    grid
}
