mod booking;
mod mutate;
mod types;

pub use types::SchedError;

use crate::availability;
use crate::calendar::MigrationReport;
use crate::model::{Appointment, AppointmentId, Doctor, DoctorId, PatientRef, Practice};
use crate::policy::SeedPolicy;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Scheduler : orchestre agendas des médecins et registre des rendez-vous.
///
/// Chaque opération est une transaction logique : soit agenda et registre
/// sont modifiés ensemble, soit rien ne change. Un hôte concurrent doit
/// sérialiser les opérations, au minimum par médecin.
#[derive(Debug, Default)]
pub struct Scheduler {
    practice: Practice,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            practice: Practice::default(),
        }
    }

    pub fn from_practice(practice: Practice) -> Self {
        Self { practice }
    }

    pub fn practice(&self) -> &Practice {
        &self.practice
    }
    pub fn practice_mut(&mut self) -> &mut Practice {
        &mut self.practice
    }

    pub fn doctor(&self, id: DoctorId) -> Result<&Doctor, SchedError> {
        self.practice
            .find_doctor(id)
            .ok_or(SchedError::UnknownDoctor(id))
    }

    fn doctor_mut(&mut self, id: DoctorId) -> Result<&mut Doctor, SchedError> {
        self.practice
            .find_doctor_mut(id)
            .ok_or(SchedError::UnknownDoctor(id))
    }

    pub fn add_doctor(&mut self, doctor: Doctor) -> Result<(), SchedError> {
        if self.practice.find_doctor(doctor.id).is_some() {
            return Err(SchedError::DuplicateDoctor(doctor.id));
        }
        tracing::info!(doctor = %doctor.id, name = %doctor.name, "doctor added");
        self.practice.doctors.push(doctor);
        Ok(())
    }

    /// Heures occupées par des rendez-vous du registre pour ce médecin et cette date.
    fn ledger_hours(&self, doctor: DoctorId, date: NaiveDate) -> BTreeSet<u8> {
        self.practice
            .ledger
            .iter()
            .filter(|a| a.doctor_id == doctor && a.date == date)
            .map(|a| a.hour)
            .collect()
    }

    /// Remplace l'entrée de `date` ; `booked` doit couvrir chaque heure
    /// occupée par un rendez-vous enregistré.
    pub fn set_schedule(
        &mut self,
        doctor: DoctorId,
        date: NaiveDate,
        working: BTreeSet<u8>,
        booked: BTreeSet<u8>,
    ) -> Result<(), SchedError> {
        self.doctor(doctor)?;
        if !self.ledger_hours(doctor, date).is_subset(&booked) {
            return Err(SchedError::InvalidSchedule(
                "booked hours must include every scheduled appointment",
            ));
        }
        self.doctor_mut(doctor)?
            .calendar
            .set_schedule(date, working, booked)
    }

    /// Remplace les heures travaillées en conservant les réservations ; refuse
    /// si une heure réservée disparaîtrait.
    pub fn set_working_hours(
        &mut self,
        doctor: DoctorId,
        date: NaiveDate,
        working: BTreeSet<u8>,
    ) -> Result<(), SchedError> {
        let scheduled = self.ledger_hours(doctor, date);
        let calendar = &mut self.doctor_mut(doctor)?.calendar;
        let booked: BTreeSet<u8> = calendar
            .booked_hours(date)
            .union(&scheduled)
            .copied()
            .collect();
        calendar.set_schedule(date, working, booked)
    }

    pub fn ensure_date_seeded(
        &mut self,
        doctor: DoctorId,
        date: NaiveDate,
        policy: &SeedPolicy,
    ) -> Result<bool, SchedError> {
        Ok(self
            .doctor_mut(doctor)?
            .calendar
            .ensure_date_seeded(date, policy))
    }

    /// Initialise chaque date absente de `[from, to]` ; retourne le nombre de dates ajoutées.
    pub fn seed_range(
        &mut self,
        doctor: DoctorId,
        from: NaiveDate,
        to: NaiveDate,
        policy: &SeedPolicy,
    ) -> Result<usize, SchedError> {
        let calendar = &mut self.doctor_mut(doctor)?.calendar;
        Ok(crate::policy::seed_range(calendar, from, to, policy)?)
    }

    pub fn is_available(&self, doctor: DoctorId, date: NaiveDate, hour: u8) -> bool {
        self.practice
            .find_doctor(doctor)
            .map(|d| availability::is_available(d, date, hour))
            .unwrap_or(false)
    }

    /// Réserve `(date, hour)` chez `doctor` pour `patient`.
    pub fn schedule(
        &mut self,
        date: NaiveDate,
        hour: u8,
        doctor: DoctorId,
        patient: PatientRef,
    ) -> Result<Appointment, SchedError> {
        booking::schedule(self, date, hour, doctor, patient)
    }

    pub fn cancel(&mut self, id: AppointmentId) -> bool {
        self.cancel_checked(id).is_ok()
    }

    pub fn cancel_checked(&mut self, id: AppointmentId) -> Result<(), SchedError> {
        mutate::cancel(self, id)
    }

    pub fn reschedule(&mut self, id: AppointmentId, new_date: NaiveDate, new_hour: u8) -> bool {
        self.reschedule_checked(id, new_date, new_hour).is_ok()
    }

    pub fn reschedule_checked(
        &mut self,
        id: AppointmentId,
        new_date: NaiveDate,
        new_hour: u8,
    ) -> Result<(), SchedError> {
        mutate::reschedule(self, id, new_date, new_hour)
    }

    /// Heures libres triées ; avec `seed`, la date est d'abord initialisée
    /// selon la politique si elle est absente de l'agenda.
    pub fn suggest_available_slots(
        &mut self,
        doctor: DoctorId,
        date: NaiveDate,
        seed: Option<&SeedPolicy>,
    ) -> Result<Vec<u8>, SchedError> {
        if let Some(policy) = seed {
            self.ensure_date_seeded(doctor, date, policy)?;
        }
        Ok(availability::suggest_slots(self.doctor(doctor)?, date))
    }

    /// Migre les clés « jour de semaine » de tous les agendas.
    pub fn migrate_legacy(&mut self, reference: NaiveDate) -> MigrationReport {
        let mut report = MigrationReport::default();
        for doctor in self.practice.doctors.iter_mut() {
            let migrated = doctor.calendar.migrate_legacy(reference);
            if !migrated.is_empty() {
                tracing::info!(
                    doctor = %doctor.id,
                    migrated = migrated.migrated.len(),
                    dropped = migrated.dropped.len(),
                    "legacy calendar migrated"
                );
            }
            report.absorb(migrated);
        }
        report
    }
}
