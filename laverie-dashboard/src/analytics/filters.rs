use crate::models::{Location, Machine};
use std::collections::HashSet;

/// Sélection d'un étage de la cascade : "all" ou une valeur précise.
/// All est le filtre identité de l'étage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Pick {
    #[default]
    All,
    One(String),
}

impl Pick {
    pub fn one<S: Into<String>>(value: S) -> Self {
        Pick::One(value.into())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Pick::All => true,
            Pick::One(wanted) => wanted == candidate,
        }
    }
}

/// État de sélection de la cascade campus → emplacement → machine.
///
/// Changer le campus remet l'emplacement (et la machine qui en dépend) à All
/// dans la même mise à jour : une sélection d'emplacement ne peut jamais
/// pointer vers un autre campus. Même logique entre emplacement et machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetFilter {
    campus: Pick,
    location: Pick,
    machine: Pick,
}

impl FleetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn campus(&self) -> &Pick {
        &self.campus
    }

    pub fn location(&self) -> &Pick {
        &self.location
    }

    pub fn machine(&self) -> &Pick {
        &self.machine
    }

    pub fn set_campus(&mut self, pick: Pick) {
        self.campus = pick;
        self.location = Pick::All;
        self.machine = Pick::All;
    }

    pub fn set_location(&mut self, pick: Pick) {
        self.location = pick;
        self.machine = Pick::All;
    }

    pub fn set_machine(&mut self, pick: Pick) {
        self.machine = pick;
    }
}

/// Étage 1 de la cascade : restreint les emplacements au campus sélectionné
/// (comparaison sur la composante campus du nom composite), puis à
/// l'emplacement sélectionné.
pub fn filter_locations<'a>(
    locations: &'a [Location],
    campus: &Pick,
    location: &Pick,
) -> Vec<&'a Location> {
    locations
        .iter()
        .filter(|l| campus.matches(&l.split_name().campus))
        .filter(|l| location.matches(&l.id))
        .collect()
}

/// Étages 2 et 3 : restreint les machines aux emplacements survivants, puis
/// à la machine sélectionnée le cas échéant.
pub fn filter_machines<'a>(
    machines: &'a [Machine],
    locations: &[Location],
    filter: &FleetFilter,
) -> Vec<&'a Machine> {
    let allowed: HashSet<&str> = filter_locations(locations, &filter.campus, &filter.location)
        .iter()
        .map(|l| l.id.as_str())
        .collect();

    machines
        .iter()
        .filter(|m| allowed.contains(m.location_id.as_str()))
        .filter(|m| filter.machine.matches(&m.id))
        .collect()
}

/// Liste des campus distincts, triée, pour alimenter le sélecteur.
pub fn campuses(locations: &[Location]) -> Vec<String> {
    let mut seen: Vec<String> = locations
        .iter()
        .map(|l| l.split_name().campus)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    seen.sort();
    seen
}
