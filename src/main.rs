use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

// Use library instead of local modules
use enrollment_ledger::{
    check_expiry, load_all_athletes, load_roster_csv, setup_database, ConsoleNotifier,
    EnrollmentService, Guardian, LifecycleStatus, SqliteGateway,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let roster = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("roster.csv"));
            run_import(&roster)?;
        }
        _ => run_summary()?,
    }

    Ok(())
}

fn db_path() -> PathBuf {
    env::var("ENROLLMENT_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("enrollments.db"))
}

fn run_import(roster_path: &Path) -> Result<()> {
    println!("📋 Roster Import - CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading roster...");
    let rows = load_roster_csv(roster_path)?;
    println!("✓ Loaded {} athletes from {}", rows.len(), roster_path.display());

    println!("\n🔧 Setting up database...");
    let conn = Connection::open(db_path())?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    println!("\n💾 Registering athletes...");
    let service = EnrollmentService::new(SqliteGateway::new(conn), ConsoleNotifier::new(true));

    let mut registered = 0;
    for (athlete, guardian_name) in rows {
        let guardian_id = match guardian_name {
            Some(name) => {
                let guardian = Guardian::new(name, None);
                enrollment_ledger::insert_guardian(service.gateway().conn(), &guardian)?;
                Some(guardian.id)
            }
            None => None,
        };

        match service.register_athlete(&athlete.name, athlete.category, guardian_id.as_deref()) {
            Ok(created) => {
                registered += 1;
                // Roster rows marked Inactivo go through the lifecycle edit,
                // so the enrollment cascade applies as it would on screen
                if athlete.lifecycle_status == LifecycleStatus::Inactive {
                    if let Err(e) =
                        service.set_lifecycle_status(&created.id, LifecycleStatus::Inactive)
                    {
                        eprintln!("❌ {}: {}", athlete.name, e);
                    }
                }
            }
            Err(e) => eprintln!("❌ {}: {}", athlete.name, e),
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Registered {} athletes with Initial enrollment records", registered);

    Ok(())
}

fn run_summary() -> Result<()> {
    let path = db_path();
    if !path.exists() {
        eprintln!("❌ Database not found!");
        eprintln!("   Run: enrollment-ledger import <roster.csv>");
        eprintln!("   to register athletes first.");
        std::process::exit(1);
    }

    let conn = Connection::open(&path)?;
    let athletes = load_all_athletes(&conn)?;
    let now = Utc::now();

    println!("🏃 Enrollment Summary ({} athletes)", athletes.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for (athlete, history) in &athletes {
        // Displayed status is derived from the head of the history
        let current = history.iter().max_by_key(|r| r.recorded_at);
        let (status, expiry_flag) = match current {
            Some(record) => (
                record.state.display_label(),
                if check_expiry(record, now) { " ⏳ vencimiento pendiente" } else { "" },
            ),
            None => ("Sin inscripción", ""),
        };

        println!(
            "  {:<28} {:<9} {:<9} {}{}",
            athlete.name,
            athlete.category.as_str(),
            athlete.lifecycle_status.display_label(),
            status,
            expiry_flag,
        );
    }

    Ok(())
}
