#![forbid(unsafe_code)]
use rendezvous::{io, parse_date, Doctor, DoctorId, PatientRef, Scheduler};
use std::collections::BTreeSet;

fn practice() -> Scheduler {
    let mut s = Scheduler::new();
    let house = DoctorId::new(1);
    s.add_doctor(Doctor::new(house, "Dr House")).unwrap();
    for (day, hours) in [("2024-03-18", vec![9u8, 10, 11]), ("2024-03-19", vec![14, 15])] {
        s.set_schedule(
            house,
            parse_date(day).unwrap(),
            hours.into_iter().collect(),
            BTreeSet::new(),
        )
        .unwrap();
    }
    s.schedule(parse_date("2024-03-19").unwrap(), 15, house, PatientRef::new("Carol"))
        .unwrap();
    s.schedule(parse_date("2024-03-18").unwrap(), 11, house, PatientRef::new("Alice"))
        .unwrap();
    s.schedule(parse_date("2024-03-18").unwrap(), 9, house, PatientRef::new("Bob"))
        .unwrap();
    s
}

#[test]
fn schedule_view() {
    let s = practice();
    let doctor = s.doctor(DoctorId::new(1)).unwrap();
    insta::assert_snapshot!(io::render_schedule(doctor), @r###"
    Dr House (#1)
      2024-03-18: working {9, 10, 11} booked {9, 11}
      2024-03-19: working {14, 15} booked {15}
    "###);
}

#[test]
fn appointments_grouped_by_date_then_hour() {
    let s = practice();
    insta::assert_snapshot!(io::render_appointments(s.practice()), @r###"
    2024-03-18
      #3 09:00 | Bob | Dr House
      #2 11:00 | Alice | Dr House
    2024-03-19
      #1 15:00 | Carol | Dr House
    "###);
}

#[test]
fn csv_export_follows_listing_order() {
    let s = practice();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("appointments.csv");
    io::export_appointments_csv(&path, s.practice()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "appointment_id,date,hour,doctor_id,doctor_name,patient",
            "3,2024-03-18,9,1,Dr House,Bob",
            "2,2024-03-18,11,1,Dr House,Alice",
            "1,2024-03-19,15,1,Dr House,Carol",
        ]
    );
}

#[test]
fn hours_csv_import() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hours.csv");
    std::fs::write(&path, "doctor_id,date,hours\n1,2024-03-18,9;10;11\n2,2024-03-19,\n").unwrap();

    let rows = io::import_hours_csv(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].doctor, DoctorId::new(1));
    assert_eq!(rows[0].hours.iter().copied().collect::<Vec<_>>(), vec![9, 10, 11]);
    assert!(rows[1].hours.is_empty());
}
