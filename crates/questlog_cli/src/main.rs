//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `questlog_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use questlog_core::db::open_db_in_memory;
use questlog_core::{JournalService, SqliteJournalStore};

fn main() {
    println!("questlog_core version={}", questlog_core::core_version());

    // Exercise the full store path against a throwaway in-memory database.
    let mut conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open in-memory database: {err}");
            std::process::exit(1);
        }
    };
    let probe = SqliteJournalStore::try_new(&mut conn)
        .map(JournalService::new)
        .and_then(|service| service.stats());
    match probe {
        Ok(stats) => println!("questlog_core stats xp={} level={}", stats.xp, stats.level),
        Err(err) => {
            eprintln!("store probe failed: {err}");
            std::process::exit(1);
        }
    }
}
