/**
 * ANALYTICS PIPELINES - Transformations pures vers les structures graphiques
 *
 * RÔLE :
 * Ce module regroupe les pipelines qui transforment les collections plates
 * (machines, emplacements, alertes, échantillons d'usage) en structures
 * prêtes pour les visualisations du dashboard.
 *
 * FONCTIONNEMENT :
 * - tally = répartition par statut (machines) et par type (alertes)
 * - filters = cascade campus → emplacement → machine
 * - usage = grille d'utilisation 7 jours x 24 heures
 * - ranking = table de performance des baux, triée et tronquée
 * - kpi = rollup des indicateurs (en ligne, uptime moyen, erreurs, score santé)
 *
 * CONTRAT COMMUN :
 * ✅ Fonctions pures : mêmes entrées ⇒ mêmes sorties, aucun état caché
 * ✅ Défensives : entrée vide ou malformée ⇒ résultat vide explicite, jamais
 *    d'erreur remontée, jamais de NaN ni de division par zéro
 */

pub mod filters;
pub mod kpi;
pub mod ranking;
pub mod tally;
pub mod usage;

pub use filters::{filter_locations, filter_machines, FleetFilter, Pick};
pub use kpi::{kpi_rollup, KpiSummary};
pub use ranking::{lease_rows, rank_leases, LeaseMetric, LeaseRow, SortKey, MAX_TABLE_ROWS};
pub use tally::{alert_tally, status_style, status_tally, AlertSlice, StatusSlice};
pub use usage::{usage_grid, UsageGrid, DAYS};
