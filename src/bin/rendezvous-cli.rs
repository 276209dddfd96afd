#![forbid(unsafe_code)]
use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use rendezvous::{
    access::{require, StaticLevel, LEVEL_ADMIN, LEVEL_STAFF},
    calendar::parse_date,
    io,
    model::{AppointmentId, Doctor, DoctorId, PatientRef},
    policy::{load_policy_from_file, SeedPolicy},
    scheduler::Scheduler,
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de prise de rendez-vous (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du cabinet (médecins + rendez-vous)
    #[arg(long, global = true, default_value = "practice.json")]
    data: String,

    /// Politique d'initialisation des dates (JSON)
    #[arg(long, global = true)]
    policy: Option<String>,

    /// Niveau de permission de l'appelant
    #[arg(long, global = true, default_value_t = 0)]
    level: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un médecin
    AddDoctor {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        name: String,
    },

    /// Définir les heures travaillées d'une date (réservations conservées)
    SetHours {
        #[arg(long)]
        doctor: u32,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// liste "9;10;11"
        #[arg(long)]
        hours: String,
    },

    /// Importer des horaires depuis un CSV
    ImportHours {
        #[arg(long)]
        csv: String,
    },

    /// Initialiser les dates d'une période selon la politique
    Seed {
        #[arg(long)]
        doctor: u32,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Prendre un rendez-vous
    Schedule {
        #[arg(long)]
        doctor: u32,
        #[arg(long)]
        date: String,
        #[arg(long)]
        hour: u8,
        #[arg(long)]
        patient: String,
    },

    /// Annuler un rendez-vous
    Cancel {
        #[arg(long)]
        id: u64,
    },

    /// Déplacer un rendez-vous chez le même médecin
    Reschedule {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        date: String,
        #[arg(long)]
        hour: u8,
    },

    /// Proposer les créneaux libres d'une date
    Suggest {
        #[arg(long)]
        doctor: u32,
        #[arg(long)]
        date: String,
        /// Initialise la date selon la politique si absente
        #[arg(long)]
        seed: bool,
    },

    /// Lister les rendez-vous et optionnellement exporter
    List {
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Afficher l'agenda d'un médecin
    View {
        #[arg(long)]
        doctor: u32,
    },

    /// Convertir les agendas « jour de semaine » en dates
    Migrate {
        /// Date de référence (défaut : aujourd'hui)
        #[arg(long)]
        reference: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let gate = StaticLevel(cli.level);
    let policy = match &cli.policy {
        Some(path) => load_policy_from_file(path)?,
        None => SeedPolicy::default(),
    };
    let storage = JsonStorage::open(&cli.data)?;
    let mut scheduler = Scheduler::from_practice(storage.load()?);

    match cli.cmd {
        Commands::AddDoctor { id, name } => {
            require(&gate, LEVEL_ADMIN)?;
            scheduler.add_doctor(Doctor::new(DoctorId::new(id), name))?;
            storage.save(scheduler.practice())?;
        }
        Commands::SetHours { doctor, date, hours } => {
            require(&gate, LEVEL_ADMIN)?;
            let date = parse_date(&date)?;
            let hours = io::parse_hours(&hours)?;
            scheduler.set_working_hours(DoctorId::new(doctor), date, hours)?;
            storage.save(scheduler.practice())?;
        }
        Commands::ImportHours { csv } => {
            require(&gate, LEVEL_ADMIN)?;
            let rows = io::import_hours_csv(csv)?;
            let count = rows.len();
            for row in rows {
                scheduler.set_working_hours(row.doctor, row.date, row.hours)?;
            }
            storage.save(scheduler.practice())?;
            println!("Imported {count} date(s)");
        }
        Commands::Seed { doctor, from, to } => {
            require(&gate, LEVEL_STAFF)?;
            let (from, to) = (parse_date(&from)?, parse_date(&to)?);
            let seeded = scheduler.seed_range(DoctorId::new(doctor), from, to, &policy)?;
            storage.save(scheduler.practice())?;
            println!("Seeded {seeded} date(s)");
        }
        Commands::Schedule {
            doctor,
            date,
            hour,
            patient,
        } => {
            require(&gate, LEVEL_STAFF)?;
            let date = parse_date(&date)?;
            let appointment = scheduler.schedule(
                date,
                hour,
                DoctorId::new(doctor),
                PatientRef::new(patient),
            )?;
            storage.save(scheduler.practice())?;
            println!(
                "Scheduled appointment #{} on {} at {:02}:00 with {}",
                appointment.id, appointment.date, appointment.hour, appointment.doctor_name
            );
        }
        Commands::Cancel { id } => {
            require(&gate, LEVEL_STAFF)?;
            scheduler.cancel_checked(AppointmentId::new(id))?;
            storage.save(scheduler.practice())?;
            println!("Cancelled appointment #{id}");
        }
        Commands::Reschedule { id, date, hour } => {
            require(&gate, LEVEL_STAFF)?;
            let date = parse_date(&date)?;
            scheduler.reschedule_checked(AppointmentId::new(id), date, hour)?;
            storage.save(scheduler.practice())?;
            println!("Rescheduled appointment #{id} to {date} at {hour:02}:00");
        }
        Commands::Suggest { doctor, date, seed } => {
            let date = parse_date(&date)?;
            let seed = if seed {
                require(&gate, LEVEL_STAFF)?;
                Some(&policy)
            } else {
                None
            };
            let slots = scheduler.suggest_available_slots(DoctorId::new(doctor), date, seed)?;
            if seed.is_some() {
                storage.save(scheduler.practice())?;
            }
            if slots.is_empty() {
                println!("No available slots on {date}");
            } else {
                let slots: Vec<String> = slots.iter().map(|h| format!("{h:02}:00")).collect();
                println!("{}", slots.join(" "));
            }
        }
        Commands::List { out_csv } => {
            if let Some(path) = out_csv {
                io::export_appointments_csv(path, scheduler.practice())?;
            }
            print!("{}", io::render_appointments(scheduler.practice()));
        }
        Commands::View { doctor } => {
            let doctor = scheduler.doctor(DoctorId::new(doctor))?;
            print!("{}", io::render_schedule(doctor));
        }
        Commands::Migrate { reference } => {
            require(&gate, LEVEL_ADMIN)?;
            let reference = match reference {
                Some(raw) => parse_date(&raw)?,
                None => Local::now().date_naive(),
            };
            let report = scheduler.migrate_legacy(reference);
            storage.save(scheduler.practice())?;
            for (key, date) in &report.migrated {
                println!("{key} -> {date}");
            }
            for key in &report.dropped {
                eprintln!("dropped unrecognised key {key}");
            }
        }
    }

    Ok(())
}
