//! Analysis request repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{AnalysisRequest, NewAnalysisRequest};
use crate::{PgClient, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for analysis request rows.
pub trait AnalysisRequestRepository {
    /// Inserts a new analysis request and returns the stored row.
    fn create_analysis_request(
        &self,
        new_request: NewAnalysisRequest,
    ) -> impl Future<Output = PgResult<AnalysisRequest>> + Send;

    /// Finds an analysis request by its identifier.
    fn find_analysis_request(
        &self,
        request_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<AnalysisRequest>>> + Send;
}

impl AnalysisRequestRepository for PgClient {
    async fn create_analysis_request(
        &self,
        new_request: NewAnalysisRequest,
    ) -> PgResult<AnalysisRequest> {
        let mut conn = self.get_connection().await?;

        use schema::analysis_requests;

        let request = diesel::insert_into(analysis_requests::table)
            .values(&new_request)
            .returning(AnalysisRequest::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            request_id = %request.id,
            "Analysis request stored"
        );

        Ok(request)
    }

    async fn find_analysis_request(&self, request_id: Uuid) -> PgResult<Option<AnalysisRequest>> {
        let mut conn = self.get_connection().await?;

        use schema::analysis_requests::{self, dsl};

        let request = analysis_requests::table
            .filter(dsl::id.eq(request_id))
            .select(AnalysisRequest::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(request)
    }
}
