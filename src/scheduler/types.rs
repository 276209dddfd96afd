use crate::model::{AppointmentId, DoctorId};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("slot unavailable: doctor {doctor} on {date} at {hour}:00")]
    SlotUnavailable {
        doctor: DoctorId,
        date: NaiveDate,
        hour: u8,
    },
    #[error("unknown doctor: {0}")]
    UnknownDoctor(DoctorId),
    #[error("unknown appointment: {0}")]
    UnknownAppointment(AppointmentId),
    #[error("invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
    #[error("invalid hour (expected 0-23): {0}")]
    InvalidHour(u8),
    #[error("invalid schedule: {0}")]
    InvalidSchedule(&'static str),
    #[error("appointment id space exhausted after {0}")]
    IdSpaceExhausted(AppointmentId),
    #[error("doctor already exists: {0}")]
    DuplicateDoctor(DoctorId),
    #[error("permission denied: level {required} required")]
    PermissionDenied { required: u8 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SchedError {
    /// Vrai pour les erreurs de type « introuvable ».
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SchedError::UnknownDoctor(_) | SchedError::UnknownAppointment(_)
        )
    }
}
