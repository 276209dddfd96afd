use crate::model::{Appointment, AppointmentId};
use crate::scheduler::SchedError;
use crate::sort::merge_sort_by_key;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registre des rendez-vous + compteur d'identifiants.
///
/// Persisté comme une simple liste ; au chargement le compteur repart de
/// `max(id) + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Appointment>", into = "Vec<Appointment>")]
pub struct AppointmentLedger {
    appointments: Vec<Appointment>,
    next_id: AppointmentId,
}

impl Default for AppointmentLedger {
    fn default() -> Self {
        Self {
            appointments: Vec::new(),
            next_id: AppointmentId::FIRST,
        }
    }
}

impl TryFrom<Vec<Appointment>> for AppointmentLedger {
    type Error = SchedError;

    fn try_from(appointments: Vec<Appointment>) -> Result<Self, Self::Error> {
        let next_id = match appointments.iter().map(|a| a.id).max() {
            Some(max) => max.next().ok_or(SchedError::IdSpaceExhausted(max))?,
            None => AppointmentId::FIRST,
        };
        Ok(Self {
            appointments,
            next_id,
        })
    }
}

impl From<AppointmentLedger> for Vec<Appointment> {
    fn from(ledger: AppointmentLedger) -> Self {
        ledger.appointments
    }
}

impl AppointmentLedger {
    pub fn next_id(&self) -> AppointmentId {
        self.next_id
    }

    /// Ajoute un rendez-vous et avance le compteur au-delà de son id.
    /// Rien n'est ajouté si le compteur ne peut plus avancer.
    pub fn add(&mut self, appointment: Appointment) -> Result<(), SchedError> {
        if appointment.id >= self.next_id {
            self.next_id = appointment
                .id
                .next()
                .ok_or(SchedError::IdSpaceExhausted(appointment.id))?;
        }
        self.appointments.push(appointment);
        Ok(())
    }

    pub fn remove(&mut self, id: AppointmentId) -> bool {
        match self.appointments.iter().position(|a| a.id == id) {
            Some(pos) => {
                self.appointments.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn find(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub(crate) fn find_mut(&mut self, id: AppointmentId) -> Option<&mut Appointment> {
        self.appointments.iter_mut().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Appointment> {
        self.appointments.iter()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Rendez-vous groupés par date, chaque groupe trié par heure.
    pub fn list_by_date(&self) -> BTreeMap<NaiveDate, Vec<Appointment>> {
        let mut grouped: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();
        for appointment in &self.appointments {
            grouped
                .entry(appointment.date)
                .or_default()
                .push(appointment.clone());
        }
        grouped
            .into_iter()
            .map(|(date, group)| (date, merge_sort_by_key(group, &|a: &Appointment| a.hour)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DoctorId, PatientRef};

    fn appt(id: u64, date: &str, hour: u8) -> Appointment {
        Appointment {
            id: AppointmentId::new(id),
            patient: PatientRef::new("Alice"),
            doctor_id: DoctorId::new(1),
            doctor_name: "Dr House".into(),
            date: date.parse().unwrap(),
            hour,
        }
    }

    #[test]
    fn next_id_only_moves_on_add() {
        let mut ledger = AppointmentLedger::default();
        assert_eq!(ledger.next_id(), AppointmentId::new(1));
        assert_eq!(ledger.next_id(), AppointmentId::new(1));
        ledger.add(appt(1, "2024-03-18", 9)).unwrap();
        assert_eq!(ledger.next_id(), AppointmentId::new(2));
        assert!(ledger.remove(AppointmentId::new(1)));
        assert_eq!(ledger.next_id(), AppointmentId::new(2));
    }

    #[test]
    fn remove_unknown_returns_false() {
        let mut ledger = AppointmentLedger::default();
        ledger.add(appt(1, "2024-03-18", 9)).unwrap();
        assert!(!ledger.remove(AppointmentId::new(7)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn counter_restored_from_loaded_list() {
        let ledger =
            AppointmentLedger::try_from(vec![appt(4, "2024-03-18", 9), appt(2, "2024-03-18", 10)])
                .unwrap();
        assert_eq!(ledger.next_id(), AppointmentId::new(5));
        assert!(ledger.find(AppointmentId::new(2)).is_some());
        assert!(ledger.find(AppointmentId::new(3)).is_none());
    }

    #[test]
    fn exhausted_id_space_is_rejected() {
        let err = AppointmentLedger::try_from(vec![appt(u64::MAX, "2024-03-18", 9)]).unwrap_err();
        assert!(matches!(err, SchedError::IdSpaceExhausted(_)));

        let mut ledger =
            AppointmentLedger::try_from(vec![appt(u64::MAX - 1, "2024-03-18", 9)]).unwrap();
        assert_eq!(ledger.next_id(), AppointmentId::new(u64::MAX));
        assert!(ledger.add(appt(u64::MAX, "2024-03-18", 10)).is_err());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.next_id(), AppointmentId::new(u64::MAX));
    }

    #[test]
    fn list_by_date_sorts_each_day_by_hour() {
        let mut ledger = AppointmentLedger::default();
        ledger.add(appt(1, "2024-03-19", 14)).unwrap();
        ledger.add(appt(2, "2024-03-18", 11)).unwrap();
        ledger.add(appt(3, "2024-03-18", 9)).unwrap();
        ledger.add(appt(4, "2024-03-19", 10)).unwrap();

        let grouped = ledger.list_by_date();
        let days: Vec<String> = grouped.keys().map(|d| d.to_string()).collect();
        assert_eq!(days, vec!["2024-03-18", "2024-03-19"]);
        let hours: Vec<Vec<u8>> = grouped
            .values()
            .map(|g| g.iter().map(|a| a.hour).collect())
            .collect();
        assert_eq!(hours, vec![vec![9, 11], vec![10, 14]]);
    }
}
