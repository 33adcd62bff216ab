//! Monitor response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::Serialize;
use vizor_postgres::PgPoolStatus;

/// Database reachability and pool counters.
#[must_use]
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    /// Whether `SELECT 1` succeeded.
    pub is_reachable: bool,
    /// Pool counters at check time.
    pub pool: PgPoolStatus,
}

/// System monitoring status response.
#[must_use]
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Overall health; `false` answers with 503.
    pub is_healthy: bool,
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
    /// Application version.
    pub version: String,
    /// Database status.
    pub database: DatabaseStatus,
}

impl MonitorStatus {
    /// Builds a status from the database check.
    pub fn new(database: DatabaseStatus) -> Self {
        Self {
            is_healthy: database.is_reachable,
            checked_at: Timestamp::now(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            database,
        }
    }
}
