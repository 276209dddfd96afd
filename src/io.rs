use crate::calendar::{parse_date, MAX_HOUR};
use crate::model::{Doctor, DoctorId, Practice};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

/// Ligne d'import d'horaires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursRow {
    pub doctor: DoctorId,
    pub date: NaiveDate,
    pub hours: BTreeSet<u8>,
}

/// Import d'horaires depuis CSV: header `doctor_id,date,hours` (heures séparées par `;`)
pub fn import_hours_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<HoursRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let doctor = rec.get(0).context("missing doctor_id")?.trim();
        let date = rec.get(1).context("missing date")?.trim();
        let hours = rec.get(2).unwrap_or("").trim();

        let doctor: u32 = doctor
            .parse()
            .with_context(|| format!("invalid doctor_id: {doctor}"))?;
        let date = parse_date(date)?;
        let hours = parse_hours(hours).with_context(|| format!("invalid hours for {date}"))?;
        out.push(HoursRow {
            doctor: DoctorId::new(doctor),
            date,
            hours,
        });
    }
    Ok(out)
}

/// Parse `9;10;11` (séparateurs `;` ou `,` acceptés).
pub fn parse_hours(raw: &str) -> anyhow::Result<BTreeSet<u8>> {
    let mut hours = BTreeSet::new();
    for chunk in raw.split([';', ',']).map(str::trim).filter(|c| !c.is_empty()) {
        let hour: u8 = chunk
            .parse()
            .with_context(|| format!("invalid hour: {chunk}"))?;
        if hour > MAX_HOUR {
            bail!("hour {hour} is out of range 0-{MAX_HOUR}");
        }
        hours.insert(hour);
    }
    Ok(hours)
}

/// Export CSV: header `appointment_id,date,hour,doctor_id,doctor_name,patient`
pub fn export_appointments_csv<P: AsRef<Path>>(path: P, practice: &Practice) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "appointment_id",
        "date",
        "hour",
        "doctor_id",
        "doctor_name",
        "patient",
    ])?;
    for (date, group) in practice.ledger.list_by_date() {
        for a in group {
            w.write_record([
                a.id.to_string(),
                date.to_string(),
                a.hour.to_string(),
                a.doctor_id.to_string(),
                practice.doctor_name_for(&a).to_string(),
                a.patient.as_str().to_string(),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Agenda d'un médecin, une ligne par date.
pub fn render_schedule(doctor: &Doctor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", doctor.name, doctor.id);
    if doctor.calendar.days().next().is_none() {
        let _ = writeln!(out, "  no working days");
    }
    for (date, day) in doctor.calendar.days() {
        let _ = writeln!(
            out,
            "  {date}: working {:?} booked {:?}",
            day.working(),
            day.booked()
        );
    }
    for key in doctor.calendar.legacy_keys() {
        let _ = writeln!(out, "  {key}: legacy entry (run migrate)");
    }
    out
}

/// Liste des rendez-vous groupés par date puis par heure.
pub fn render_appointments(practice: &Practice) -> String {
    if practice.ledger.is_empty() {
        return "No appointments scheduled.\n".to_string();
    }
    let mut out = String::new();
    for (date, group) in practice.ledger.list_by_date() {
        let _ = writeln!(out, "{date}");
        for a in group {
            let _ = writeln!(
                out,
                "  #{} {:02}:00 | {} | {}",
                a.id,
                a.hour,
                a.patient.as_str(),
                practice.doctor_name_for(&a)
            );
        }
    }
    out
}
