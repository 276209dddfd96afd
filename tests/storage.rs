#![forbid(unsafe_code)]
use rendezvous::{
    parse_date, AppointmentId, DoctorId, JsonStorage, PatientRef, Scheduler, Storage,
};
use tempfile::tempdir;

const LEGACY: &str = r#"{
  "doctors": [
    {"DoctorID": 1, "Name": "Dr House", "daysWorking": {
      "2024-03-18": [[9, 10, 11], [10]],
      "Monday": [[9, 10], [9]]
    }}
  ],
  "appointments": [
    {"appointmentID": 7, "patient": "Alice", "doctorID": 1, "doctorName": "Dr House", "day": "2024-03-18", "time": 10}
  ]
}"#;

#[test]
fn missing_file_starts_empty() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("absent.json")).unwrap();
    let practice = storage.load().unwrap();
    assert!(practice.doctors.is_empty());
    assert!(practice.ledger.is_empty());
    assert_eq!(practice.ledger.next_id(), AppointmentId::new(1));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let storage = JsonStorage::open(&path).unwrap();
    assert!(storage.load().is_err());
}

#[test]
fn legacy_document_loads_with_day_alias_and_next_id() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("practice.json");
    std::fs::write(&path, LEGACY).unwrap();
    let storage = JsonStorage::open(&path).unwrap();

    let practice = storage.load().unwrap();
    let appt = practice.ledger.find(AppointmentId::new(7)).unwrap();
    assert_eq!(appt.date, parse_date("2024-03-18").unwrap());
    assert_eq!(appt.hour, 10);
    assert_eq!(practice.ledger.next_id(), AppointmentId::new(8));

    let doctor = practice.find_doctor(DoctorId::new(1)).unwrap();
    assert_eq!(doctor.calendar.legacy_keys().collect::<Vec<_>>(), vec!["Monday"]);
}

#[test]
fn save_then_reload_preserves_state_and_counter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("practice.json");
    std::fs::write(&path, LEGACY).unwrap();
    let storage = JsonStorage::open(&path).unwrap();

    let mut s = Scheduler::from_practice(storage.load().unwrap());
    let monday = parse_date("2024-03-18").unwrap();
    let appt = s
        .schedule(monday, 11, DoctorId::new(1), PatientRef::new("Bob"))
        .unwrap();
    assert_eq!(appt.id, AppointmentId::new(8));
    storage.save(s.practice()).unwrap();

    let mut reloaded = Scheduler::from_practice(storage.load().unwrap());
    assert_eq!(reloaded.practice().ledger.len(), 2);
    assert_eq!(reloaded.practice().ledger.next_id(), AppointmentId::new(9));
    let next = reloaded
        .schedule(monday, 9, DoctorId::new(1), PatientRef::new("Carol"))
        .unwrap();
    assert_eq!(next.id, AppointmentId::new(9));

    // la clé historique survit au cycle load/save
    let doctor = reloaded.doctor(DoctorId::new(1)).unwrap();
    assert_eq!(doctor.calendar.legacy_keys().count(), 1);
}

#[test]
fn saved_records_use_persisted_field_names() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("practice.json");
    std::fs::write(&path, LEGACY).unwrap();
    let storage = JsonStorage::open(&path).unwrap();
    storage.save(&storage.load().unwrap()).unwrap();

    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let appt = &value["appointments"][0];
    assert_eq!(appt["appointmentID"], 7);
    assert_eq!(appt["patient"], "Alice");
    assert_eq!(appt["doctorID"], 1);
    assert_eq!(appt["doctorName"], "Dr House");
    assert_eq!(appt["date"], "2024-03-18");
    assert_eq!(appt["time"], 10);
    let doctor = &value["doctors"][0];
    assert_eq!(doctor["DoctorID"], 1);
    assert_eq!(doctor["Name"], "Dr House");
    assert_eq!(
        doctor["daysWorking"]["2024-03-18"],
        serde_json::json!([[9, 10, 11], [10]])
    );
}

#[test]
fn migration_after_load_merges_weekday_into_date() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("practice.json");
    std::fs::write(&path, LEGACY).unwrap();
    let storage = JsonStorage::open(&path).unwrap();

    let mut s = Scheduler::from_practice(storage.load().unwrap());
    // 2024-03-13 est un mercredi : lundi suivant = 2024-03-18
    let report = s.migrate_legacy(parse_date("2024-03-13").unwrap());
    let monday = parse_date("2024-03-18").unwrap();
    assert_eq!(report.migrated, vec![("Monday".to_string(), monday)]);

    let cal = &s.doctor(DoctorId::new(1)).unwrap().calendar;
    assert_eq!(cal.working_hours(monday).into_iter().collect::<Vec<_>>(), vec![9, 10, 11]);
    assert_eq!(cal.booked_hours(monday).into_iter().collect::<Vec<_>>(), vec![9, 10]);
    assert_eq!(cal.legacy_keys().count(), 0);
}

fn document_with_appointment_id(id: u64) -> String {
    format!(
        r#"{{"doctors": [{{"DoctorID": 1, "Name": "Dr House", "daysWorking": {{"2024-03-18": [[9, 10], [9]]}}}}],
"appointments": [{{"appointmentID": {id}, "patient": "Alice", "doctorID": 1, "doctorName": "Dr House", "date": "2024-03-18", "time": 9}}]}}"#
    )
}

#[test]
fn exhausted_appointment_ids_fail_to_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("practice.json");
    std::fs::write(&path, document_with_appointment_id(u64::MAX)).unwrap();
    let storage = JsonStorage::open(&path).unwrap();
    let err = storage.load().unwrap_err();
    assert!(format!("{err:#}").contains("id space exhausted"));
}

#[test]
fn schedule_rolls_back_booking_when_ids_run_out() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("practice.json");
    std::fs::write(&path, document_with_appointment_id(u64::MAX - 1)).unwrap();
    let storage = JsonStorage::open(&path).unwrap();

    let mut s = Scheduler::from_practice(storage.load().unwrap());
    let monday = parse_date("2024-03-18").unwrap();
    assert!(s
        .schedule(monday, 10, DoctorId::new(1), PatientRef::new("Bob"))
        .is_err());
    assert_eq!(s.practice().ledger.len(), 1);
    let cal = &s.doctor(DoctorId::new(1)).unwrap().calendar;
    assert_eq!(cal.booked_hours(monday).into_iter().collect::<Vec<_>>(), vec![9]);
}
