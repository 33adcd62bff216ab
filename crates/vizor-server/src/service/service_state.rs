//! Application state and dependency injection.

use vizor_postgres::PgClient;

use crate::service::{AnalysisService, Result, ServiceConfig};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    postgres: PgClient,
    analysis: AnalysisService,
}

impl ServiceState {
    /// Connects to all external services described by `config`.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let postgres = config.connect_postgres().await?;
        let vision = config.connect_vision()?;
        let analysis = AnalysisService::new(postgres.clone(), vision);

        Ok(Self::new(postgres, analysis))
    }

    /// Assembles state from already built services.
    pub fn new(postgres: PgClient, analysis: AnalysisService) -> Self {
        Self { postgres, analysis }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(postgres: PgClient);
impl_di!(analysis: AnalysisService);
