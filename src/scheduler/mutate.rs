use super::{SchedError, Scheduler};
use crate::availability;
use crate::model::{AppointmentId, Practice};
use chrono::NaiveDate;

pub(super) fn cancel(scheduler: &mut Scheduler, id: AppointmentId) -> Result<(), SchedError> {
    let Practice { doctors, ledger } = &mut scheduler.practice;
    let Some(appointment) = ledger.find(id).cloned() else {
        return Err(SchedError::UnknownAppointment(id));
    };

    ledger.remove(id);

    // l'annulation réussit même si l'agenda a divergé
    match doctors.iter_mut().find(|d| d.id == appointment.doctor_id) {
        Some(doctor) => {
            availability::release(doctor, appointment.date, appointment.hour);
        }
        None => {
            tracing::warn!(
                appointment = %id,
                doctor = %appointment.doctor_id,
                "cancelled appointment references unknown doctor"
            );
        }
    }

    tracing::info!(appointment = %id, "appointment cancelled");
    Ok(())
}

pub(super) fn reschedule(
    scheduler: &mut Scheduler,
    id: AppointmentId,
    new_date: NaiveDate,
    new_hour: u8,
) -> Result<(), SchedError> {
    let Practice { doctors, ledger } = &mut scheduler.practice;
    let Some(appointment) = ledger.find_mut(id) else {
        return Err(SchedError::UnknownAppointment(id));
    };
    let doctor = doctors
        .iter_mut()
        .find(|d| d.id == appointment.doctor_id)
        .ok_or(SchedError::UnknownDoctor(appointment.doctor_id))?;

    // le nouveau créneau est vérifié avant toute libération de l'ancien
    if !availability::is_available(doctor, new_date, new_hour) {
        return Err(SchedError::SlotUnavailable {
            doctor: doctor.id,
            date: new_date,
            hour: new_hour,
        });
    }

    let (old_date, old_hour) = (appointment.date, appointment.hour);
    let released = availability::release(doctor, old_date, old_hour);
    if !availability::book(doctor, new_date, new_hour) {
        if released {
            availability::book(doctor, old_date, old_hour);
        }
        return Err(SchedError::SlotUnavailable {
            doctor: doctor.id,
            date: new_date,
            hour: new_hour,
        });
    }

    appointment.date = new_date;
    appointment.hour = new_hour;

    tracing::info!(
        appointment = %id,
        from = %old_date,
        from_hour = old_hour,
        to = %new_date,
        to_hour = new_hour,
        "appointment rescheduled"
    );
    Ok(())
}
