use super::{SchedError, Scheduler};
use crate::availability;
use crate::calendar::MAX_HOUR;
use crate::model::{Appointment, DoctorId, PatientRef, Practice};
use chrono::NaiveDate;

pub(super) fn schedule(
    scheduler: &mut Scheduler,
    date: NaiveDate,
    hour: u8,
    doctor_id: DoctorId,
    patient: PatientRef,
) -> Result<Appointment, SchedError> {
    if hour > MAX_HOUR {
        return Err(SchedError::InvalidHour(hour));
    }

    let Practice { doctors, ledger } = &mut scheduler.practice;
    let doctor = doctors
        .iter_mut()
        .find(|d| d.id == doctor_id)
        .ok_or(SchedError::UnknownDoctor(doctor_id))?;

    let unavailable = SchedError::SlotUnavailable {
        doctor: doctor_id,
        date,
        hour,
    };
    if !availability::is_available(doctor, date, hour) {
        return Err(unavailable);
    }
    if !availability::book(doctor, date, hour) {
        return Err(unavailable);
    }

    let appointment = Appointment {
        id: ledger.next_id(),
        patient,
        doctor_id,
        doctor_name: doctor.name.clone(),
        date,
        hour,
    };
    if let Err(err) = ledger.add(appointment.clone()) {
        availability::release(doctor, date, hour);
        return Err(err);
    }

    tracing::info!(
        appointment = %appointment.id,
        doctor = %doctor_id,
        %date,
        hour,
        "appointment scheduled"
    );
    Ok(appointment)
}
