//! Health check handler.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use vizor_postgres::PgClient;

use crate::extract::Json;
use crate::handler::response::{DatabaseStatus, MonitorStatus};
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "vizor_server::handler::monitors";

/// Reports whether the database answers.
#[tracing::instrument(skip_all)]
async fn health_status(State(pg_client): State<PgClient>) -> (StatusCode, Json<MonitorStatus>) {
    let is_reachable = match pg_client.ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(target: TRACING_TARGET, error = %err, "Database ping failed");
            false
        }
    };

    let database = DatabaseStatus {
        is_reachable,
        pool: pg_client.pool_status(),
    };
    let status = MonitorStatus::new(database);

    let status_code = if status.is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        is_healthy = status.is_healthy,
        status_code = status_code.as_u16(),
        "Health status prepared"
    );

    (status_code, Json(status))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get system health status")
        .description("Pings the database and reports connection pool counters.")
        .response::<200, Json<MonitorStatus>>()
        .response::<503, Json<MonitorStatus>>()
}

/// Returns a [`Router`] with all health monitoring routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}
