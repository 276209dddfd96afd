use crate::model::Doctor;
use crate::sort::merge_sort_by_key;
use chrono::NaiveDate;

/// Vrai ssi `hour` est travaillée et pas encore réservée ce jour-là.
pub fn is_available(doctor: &Doctor, date: NaiveDate, hour: u8) -> bool {
    let free = doctor
        .calendar
        .day(date)
        .map(|day| day.is_free(hour))
        .unwrap_or(false);
    tracing::debug!(doctor = %doctor.id, %date, hour, free, "availability check");
    free
}

/// Réserve le créneau s'il est libre. Aucune mutation en cas d'échec.
pub fn book(doctor: &mut Doctor, date: NaiveDate, hour: u8) -> bool {
    match doctor.calendar.day_mut(date) {
        Some(day) => day.book(hour),
        None => false,
    }
}

/// Libère le créneau ; sans effet s'il n'était pas réservé.
/// Retourne `true` si une réservation a effectivement été retirée.
pub fn release(doctor: &mut Doctor, date: NaiveDate, hour: u8) -> bool {
    let released = doctor
        .calendar
        .day_mut(date)
        .map(|day| day.release(hour))
        .unwrap_or(false);
    if !released {
        tracing::warn!(doctor = %doctor.id, %date, hour, "released hour was not booked");
    }
    released
}

/// Heures libres du jour, strictement croissantes.
pub fn suggest_slots(doctor: &Doctor, date: NaiveDate) -> Vec<u8> {
    let Some(day) = doctor.calendar.day(date) else {
        return Vec::new();
    };
    let free: Vec<u8> = day
        .working()
        .difference(day.booked())
        .copied()
        .collect();
    merge_sort_by_key(free, &|hour| *hour)
}
