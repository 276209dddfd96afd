use crate::calendar::Calendar;
use crate::ledger::AppointmentLedger;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifiant fort pour Doctor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoctorId(u32);

impl DoctorId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifiant de rendez-vous, attribué de façon monotone par le ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppointmentId(u64);

impl AppointmentId {
    pub const FIRST: AppointmentId = AppointmentId(1);

    pub fn new(id: u64) -> Self {
        Self(id)
    }
    pub fn get(self) -> u64 {
        self.0
    }
    /// Identifiant suivant ; `None` une fois l'espace des ids épuisé.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Référence vers un patient (le dossier patient vit hors de cette lib).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientRef(String);

impl PatientRef {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Médecin et son agenda (seul propriétaire du calendrier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(rename = "DoctorID")]
    pub id: DoctorId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "daysWorking", default)]
    pub calendar: Calendar,
}

impl Doctor {
    pub fn new<N: Into<String>>(id: DoctorId, name: N) -> Self {
        Self {
            id,
            name: name.into(),
            calendar: Calendar::default(),
        }
    }
}

/// Rendez-vous : un patient sur un créneau `(date, heure)` d'un médecin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(rename = "appointmentID")]
    pub id: AppointmentId,
    pub patient: PatientRef,
    #[serde(rename = "doctorID")]
    pub doctor_id: DoctorId,
    #[serde(rename = "doctorName", default)]
    pub doctor_name: String,
    #[serde(alias = "day")]
    pub date: NaiveDate,
    #[serde(rename = "time")]
    pub hour: u8,
}

/// Document persisté : médecins + rendez-vous.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Practice {
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(rename = "appointments", default)]
    pub ledger: AppointmentLedger,
}

impl Practice {
    pub fn find_doctor(&self, id: DoctorId) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }
    pub fn find_doctor_mut(&mut self, id: DoctorId) -> Option<&mut Doctor> {
        self.doctors.iter_mut().find(|d| d.id == id)
    }

    /// Nom courant du médecin ; la copie stockée sur le rendez-vous ne sert
    /// que si le médecin a disparu.
    pub fn doctor_name_for<'a>(&'a self, appointment: &'a Appointment) -> &'a str {
        self.find_doctor(appointment.doctor_id)
            .map(|d| d.name.as_str())
            .unwrap_or(appointment.doctor_name.as_str())
    }
}
