//! Agenda d'un médecin : heures travaillées / heures réservées par date.
//!
//! Format persisté (`daysWorking`) : `{"2024-03-18": [[9, 10, 11], [10]]}`.
//! Les anciennes clés par jour de semaine (`"Monday"`) sont conservées telles
//! quelles jusqu'à [`Calendar::migrate_legacy`].

use crate::policy::SeedPolicy;
use crate::scheduler::SchedError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MAX_HOUR: u8 = 23;

/// Parse une date ISO 8601 (`YYYY-MM-DD`).
pub fn parse_date(raw: &str) -> Result<NaiveDate, SchedError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| SchedError::InvalidDate(raw.to_string()))
}

/// Une journée : `booked ⊆ working` en permanence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarDay {
    working: BTreeSet<u8>,
    booked: BTreeSet<u8>,
}

impl CalendarDay {
    pub fn new(working: BTreeSet<u8>, booked: BTreeSet<u8>) -> Result<Self, SchedError> {
        if let Some(&hour) = working.iter().find(|&&h| h > MAX_HOUR) {
            return Err(SchedError::InvalidHour(hour));
        }
        if !booked.is_subset(&working) {
            return Err(SchedError::InvalidSchedule(
                "booked hours must be a subset of working hours",
            ));
        }
        Ok(Self { working, booked })
    }

    /// Construit une journée depuis des données externes en écartant ce qui
    /// viole l'invariant (heures > 23, réservations hors heures travaillées).
    fn sanitized(working: BTreeSet<u8>, booked: BTreeSet<u8>) -> Self {
        let working: BTreeSet<u8> = working.into_iter().filter(|h| *h <= MAX_HOUR).collect();
        let (kept, stray): (BTreeSet<u8>, BTreeSet<u8>) =
            booked.into_iter().partition(|h| working.contains(h));
        if !stray.is_empty() {
            tracing::warn!(?stray, "dropping booked hours outside working hours");
        }
        Self {
            working,
            booked: kept,
        }
    }

    pub fn working(&self) -> &BTreeSet<u8> {
        &self.working
    }
    pub fn booked(&self) -> &BTreeSet<u8> {
        &self.booked
    }

    pub fn is_free(&self, hour: u8) -> bool {
        self.working.contains(&hour) && !self.booked.contains(&hour)
    }

    pub(crate) fn book(&mut self, hour: u8) -> bool {
        if !self.is_free(hour) {
            return false;
        }
        self.booked.insert(hour)
    }

    pub(crate) fn release(&mut self, hour: u8) -> bool {
        self.booked.remove(&hour)
    }

    fn merge(&mut self, other: CalendarDay) {
        self.working.extend(other.working);
        let booked: BTreeSet<u8> = self
            .booked
            .union(&other.booked)
            .copied()
            .filter(|h| self.working.contains(h))
            .collect();
        self.booked = booked;
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.working, &self.booked).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (working, booked) = <(BTreeSet<u8>, BTreeSet<u8>)>::deserialize(deserializer)?;
        Ok(Self::sanitized(working, booked))
    }
}

/// Résultat d'une migration des clés historiques.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: Vec<(String, NaiveDate)>,
    pub dropped: Vec<String>,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.migrated.is_empty() && self.dropped.is_empty()
    }

    pub(crate) fn absorb(&mut self, other: MigrationReport) {
        self.migrated.extend(other.migrated);
        self.dropped.extend(other.dropped);
    }
}

/// Agenda indexé par date. Une date absente = aucune disponibilité.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    days: BTreeMap<NaiveDate, CalendarDay>,
    legacy: BTreeMap<String, CalendarDay>,
}

impl Calendar {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.get(&date)
    }

    pub(crate) fn day_mut(&mut self, date: NaiveDate) -> Option<&mut CalendarDay> {
        self.days.get_mut(&date)
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &CalendarDay)> {
        self.days.iter().map(|(d, day)| (*d, day))
    }

    pub fn legacy_keys(&self) -> impl Iterator<Item = &str> {
        self.legacy.keys().map(String::as_str)
    }

    pub fn working_hours(&self, date: NaiveDate) -> BTreeSet<u8> {
        self.day(date).map(|d| d.working.clone()).unwrap_or_default()
    }

    pub fn booked_hours(&self, date: NaiveDate) -> BTreeSet<u8> {
        self.day(date).map(|d| d.booked.clone()).unwrap_or_default()
    }

    /// Remplace entièrement l'entrée de `date`.
    pub fn set_schedule(
        &mut self,
        date: NaiveDate,
        working: BTreeSet<u8>,
        booked: BTreeSet<u8>,
    ) -> Result<(), SchedError> {
        let day = CalendarDay::new(working, booked)?;
        self.days.insert(date, day);
        Ok(())
    }

    /// Crée l'entrée de `date` selon `policy` si elle n'existe pas encore.
    /// Retourne `true` si une entrée a été ajoutée.
    pub fn ensure_date_seeded(&mut self, date: NaiveDate, policy: &SeedPolicy) -> bool {
        if self.days.contains_key(&date) {
            return false;
        }
        let working = policy.hours_for(date);
        tracing::debug!(%date, ?working, "seeding calendar date");
        self.days.insert(
            date,
            CalendarDay {
                working,
                booked: BTreeSet::new(),
            },
        );
        true
    }

    /// Convertit chaque clé « jour de semaine » vers sa prochaine occurrence
    /// strictement après `reference`, en fusionnant avec une éventuelle entrée
    /// existante. Les clés non reconnues sont supprimées.
    pub fn migrate_legacy(&mut self, reference: NaiveDate) -> MigrationReport {
        let mut report = MigrationReport::default();
        for (key, legacy_day) in std::mem::take(&mut self.legacy) {
            let target = key
                .trim()
                .parse::<Weekday>()
                .ok()
                .and_then(|weekday| next_occurrence(reference, weekday));
            match target {
                Some(date) => {
                    self.days.entry(date).or_default().merge(legacy_day);
                    report.migrated.push((key, date));
                }
                None => {
                    tracing::warn!(key = %key, "dropping unrecognised calendar key");
                    report.dropped.push(key);
                }
            }
        }
        report
    }
}

fn next_occurrence(reference: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let from = i64::from(reference.weekday().num_days_from_monday());
    let to = i64::from(weekday.num_days_from_monday());
    let ahead = match (to - from).rem_euclid(7) {
        0 => 7,
        n => n,
    };
    reference.checked_add_days(Days::new(ahead as u64))
}

impl Serialize for Calendar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self
            .days
            .iter()
            .map(|(date, day)| (date.format(DATE_FORMAT).to_string(), day))
            .chain(self.legacy.iter().map(|(key, day)| (key.clone(), day)));
        serializer.collect_map(entries)
    }
}

impl<'de> Deserialize<'de> for Calendar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, CalendarDay>::deserialize(deserializer)?;
        let mut calendar = Calendar::default();
        for (key, day) in raw {
            match NaiveDate::parse_from_str(&key, DATE_FORMAT) {
                Ok(date) => {
                    calendar.days.insert(date, day);
                }
                Err(_) => {
                    calendar.legacy.insert(key, day);
                }
            }
        }
        Ok(calendar)
    }
}
