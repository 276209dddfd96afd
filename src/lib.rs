#![forbid(unsafe_code)]
//! Rendezvous — planification de rendez-vous médicaux sur l'agenda horaire
//! des médecins, stockage fichier (JSON/CSV), sans base de données.
//!
//! - Agenda par date : heures travaillées / heures réservées.
//! - Prise, annulation, déplacement de rendez-vous sans double réservation.
//! - Suggestion des créneaux libres, migration des agendas « par jour de semaine ».

pub mod access;
pub mod availability;
pub mod calendar;
pub mod io;
pub mod ledger;
pub mod model;
pub mod policy;
pub mod scheduler;
pub mod sort;
pub mod storage;

pub use access::{require, PermissionGate, StaticLevel, LEVEL_ADMIN, LEVEL_STAFF};
pub use calendar::{parse_date, Calendar, CalendarDay, MigrationReport};
pub use ledger::AppointmentLedger;
pub use model::{Appointment, AppointmentId, Doctor, DoctorId, PatientRef, Practice};
pub use policy::{load_policy_from_file, seed_range, SeedPolicy};
pub use scheduler::{SchedError, Scheduler};
pub use storage::{JsonStorage, Storage};
