use std::ops::DerefMut;
use std::time::Instant;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use super::{MigrationResult, custom_hooks, get_migration_status};
use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Applies all pending embedded migrations.
///
/// Diesel's migration harness is synchronous, so it runs on a blocking thread
/// over an [`AsyncConnectionWrapper`].
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let started_at = Instant::now();
    let mut conn = pg.get_pooled_connection().await?;
    let status = get_migration_status(&mut conn).await?;

    if status.is_up_to_date() {
        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            applied = status.applied_migrations(),
            "Database schema is up to date"
        );
        return Ok(MigrationResult::success(started_at.elapsed(), Vec::new()));
    }

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        pending = status.pending_migrations(),
        next = status.next_pending_version(),
        "Applying pending migrations"
    );

    custom_hooks::pre_migrate(&mut conn).await?;

    let mut wrapper: AsyncConnectionWrapper<_> = conn.into();
    let joined = spawn_blocking(move || {
        let applied = wrapper
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.iter().map(ToString::to_string).collect::<Vec<_>>());
        (applied, wrapper)
    })
    .await;

    let duration = started_at.elapsed();
    let (applied, mut wrapper) = joined.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            error = %err,
            "Migration task failed to join"
        );
        PgError::Migration(err.into())
    })?;

    custom_hooks::post_migrate(wrapper.deref_mut()).await?;

    let versions = applied.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            error = %err,
            "Database migration failed"
        );
        PgError::Migration(err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?duration,
        applied = versions.len(),
        "Database migrations applied"
    );

    Ok(MigrationResult::success(duration, versions))
}
