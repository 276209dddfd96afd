use crate::calendar::{Calendar, MAX_HOUR};
use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Heures ouvertes par défaut en semaine (pause de midi exclue).
pub const DEFAULT_WEEKDAY_HOURS: [u8; 7] = [9, 10, 11, 13, 14, 15, 16];

/// Politique d'initialisation d'une date absente de l'agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    #[serde(default)]
    pub weekday_hours: BTreeSet<u8>,
    #[serde(default)]
    pub weekend_hours: BTreeSet<u8>,
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            weekday_hours: DEFAULT_WEEKDAY_HOURS.into_iter().collect(),
            weekend_hours: BTreeSet::new(),
        }
    }
}

impl SeedPolicy {
    pub fn validate(&self) -> Result<()> {
        for hour in self.weekday_hours.iter().chain(&self.weekend_hours) {
            if *hour > MAX_HOUR {
                bail!("policy hour {hour} is out of range 0-{MAX_HOUR}");
            }
        }
        Ok(())
    }

    pub fn hours_for(&self, date: NaiveDate) -> BTreeSet<u8> {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => self.weekend_hours.clone(),
            _ => self.weekday_hours.clone(),
        }
    }
}

pub fn load_policy_from_file<P: AsRef<Path>>(path: P) -> Result<SeedPolicy> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading policy {}", path.display()))?;
    let policy: SeedPolicy = serde_json::from_slice(&data)
        .with_context(|| format!("parsing policy {}", path.display()))?;
    policy.validate()?;
    Ok(policy)
}

/// Initialise chaque date de `[start, end]` absente de l'agenda.
/// Retourne le nombre de dates ajoutées.
pub fn seed_range(
    calendar: &mut Calendar,
    start: NaiveDate,
    end: NaiveDate,
    policy: &SeedPolicy,
) -> Result<usize> {
    if end < start {
        bail!("end date must be after start date");
    }

    let mut seeded = 0usize;
    let mut current = start;
    while current <= end {
        if calendar.ensure_date_seeded(current, policy) {
            seeded += 1;
        }
        current = current.succ_opt().context("date overflow")?;
    }
    Ok(seeded)
}
