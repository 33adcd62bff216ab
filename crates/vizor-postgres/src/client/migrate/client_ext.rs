//! Migration methods on [`PgClient`].

use super::run_pending_migrations;
use crate::{MigrationResult, PgClient, PgResult};

/// Extension trait adding migration management to [`PgClient`].
pub trait PgClientExt {
    /// Applies every embedded migration that has not been applied yet.
    ///
    /// Calling this on an up-to-date database is a no-op.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>>;
}

impl PgClientExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }
}
