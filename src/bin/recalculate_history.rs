//! Simple utility to replay stored conversions against the current catalog
//! and rewrite any results that have drifted (e.g. after a multiplier fix).
//! Usage: cargo run --bin recalculate_history -- [--dry-run]

use std::path::PathBuf;

use huc::conversion::{convert_value, HormoneCatalog};
use huc::models::Conversion;

fn get_database_path() -> PathBuf {
    std::env::var("HUC_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("huc.db");
            path
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");

    let db_path = get_database_path();
    println!("Database: {}", db_path.display());
    if dry_run {
        println!("Dry run: no rows will be rewritten");
    }

    let database = huc::db::Database::new(&db_path)?;
    let catalog = HormoneCatalog::builtin();

    let mut checked = 0usize;
    let mut rewritten = 0usize;
    let mut skipped = 0usize;

    database.with_conn(|conn| {
        let conversions = Conversion::list_all(conn)?;
        println!("Found {} stored conversions", conversions.len());

        for record in &conversions {
            checked += 1;

            let hormone = match catalog.get(&record.hormone_id) {
                Some(h) => h,
                None => {
                    println!(
                        "  #{}: hormone {} no longer in catalog, skipping",
                        record.id, record.hormone_id
                    );
                    skipped += 1;
                    continue;
                }
            };

            let current = match convert_value(
                record.input_value,
                &record.from_unit,
                &record.to_unit,
                hormone,
            ) {
                Ok(v) => v,
                Err(e) => {
                    println!("  #{}: {}, skipping", record.id, e);
                    skipped += 1;
                    continue;
                }
            };

            if (current - record.result_value).abs() <= 1e-9 * current.abs().max(1.0) {
                continue;
            }

            println!(
                "  #{}: {} {} {} -> {}: stored {}, current {}",
                record.id,
                record.hormone_id,
                record.input_value,
                record.from_unit,
                record.to_unit,
                record.result_value,
                current
            );

            if !dry_run {
                Conversion::update_result(conn, record.id, current)?;
            }
            rewritten += 1;
        }

        Ok(())
    })?;

    if dry_run {
        println!(
            "\nChecked {} rows: {} drifted (not rewritten), {} skipped",
            checked, rewritten, skipped
        );
    } else {
        println!(
            "\nChecked {} rows: {} rewritten, {} skipped",
            checked, rewritten, skipped
        );
    }

    Ok(())
}
