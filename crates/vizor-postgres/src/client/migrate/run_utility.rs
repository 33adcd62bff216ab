use diesel::migration::{Migration, MigrationName, MigrationSource};
use diesel::pg::Pg;
use diesel::sql_query;
use diesel::sql_types::{Bool, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::MigrationStatus;
use crate::{MIGRATIONS, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Name of the bookkeeping table diesel creates on first migration.
const MIGRATION_TABLE: &str = "__diesel_schema_migrations";

#[derive(diesel::QueryableByName)]
struct Exists {
    #[diesel(sql_type = Bool)]
    exists: bool,
}

#[derive(diesel::QueryableByName)]
struct AppliedVersion {
    #[diesel(sql_type = Text)]
    version: String,
}

/// Returns the versions of every migration compiled into the binary, oldest first.
pub(crate) fn embedded_migration_versions() -> PgResult<Vec<String>> {
    let mut versions: Vec<String> = MigrationSource::<Pg>::migrations(&MIGRATIONS)
        .map_err(PgError::Migration)?
        .iter()
        .map(|migration| migration.name().version().to_string())
        .collect();

    versions.sort();
    Ok(versions)
}

/// Computes applied and pending versions for the connected database.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub(crate) async fn get_migration_status(conn: &mut AsyncPgConnection) -> PgResult<MigrationStatus> {
    let applied = get_applied_migrations(conn).await?;
    let pending: Vec<String> = embedded_migration_versions()?
        .into_iter()
        .filter(|version| !applied.contains(version))
        .collect();

    let status = MigrationStatus::new(applied, pending);

    tracing::debug!(
        target: TRACING_TARGET_MIGRATION,
        applied = status.applied_migrations(),
        pending = status.pending_migrations(),
        "Migration status retrieved"
    );

    Ok(status)
}

/// Lists applied versions; an uninitialized database has none.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    if !migration_table_exists(conn).await? {
        tracing::debug!(
            target: TRACING_TARGET_MIGRATION,
            "Migration table is missing, treating database as empty"
        );
        return Ok(Vec::new());
    }

    let rows: Vec<AppliedVersion> =
        sql_query(format!("SELECT version FROM {MIGRATION_TABLE} ORDER BY version"))
            .get_results(conn)
            .await
            .map_err(|err| {
                PgError::Migration(format!("failed to read applied migrations: {err}").into())
            })?;

    Ok(rows.into_iter().map(|row| row.version).collect())
}

async fn migration_table_exists(conn: &mut AsyncPgConnection) -> PgResult<bool> {
    let row: Exists = sql_query(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_name = $1
        ) AS exists",
    )
    .bind::<Text, _>(MIGRATION_TABLE)
    .get_result(conn)
    .await
    .map_err(|err| PgError::Migration(format!("failed to check migration table: {err}").into()))?;

    Ok(row.exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_migrations_are_enumerated() {
        let versions = embedded_migration_versions().expect("embedded migrations should load");
        assert_eq!(versions, vec!["20240601000000".to_owned()]);
    }
}
