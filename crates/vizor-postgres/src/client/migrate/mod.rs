//! Embedded schema migrations.
//!
//! Migrations live under `src/migrations` and are compiled into the binary.
//! [`PgClientExt`] applies the pending ones at startup.

mod client_ext;
mod custom_hooks;
mod migrate_result;
mod run_migration;
mod run_utility;

pub use client_ext::PgClientExt;
pub use migrate_result::MigrationResult;
pub(crate) use migrate_result::MigrationStatus;
pub use run_migration::run_pending_migrations;
pub(crate) use run_utility::get_migration_status;
