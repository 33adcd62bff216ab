use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use vizor_gigachat::{GigaChatClient, GigaChatConfig, ImageFetcher, VisionService};
use vizor_postgres::{PgClient, PgClientExt, PgConfig};

use crate::{Error, Result, TRACING_TARGET_SERVICE};

/// Default image download timeout in seconds.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

const MAX_FETCH_TIMEOUT_SECS: u64 = 300;

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Postgres connection pool configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres_config: PgConfig,

    /// GigaChat provider configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub gigachat_config: GigaChatConfig,

    /// Timeout in seconds for downloading the caller's image
    #[cfg_attr(
        feature = "config",
        arg(long = "fetch-timeout-secs", env = "FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)
    )]
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

impl ServiceConfig {
    pub fn new(postgres_config: PgConfig, gigachat_config: GigaChatConfig) -> Self {
        Self {
            postgres_config,
            gigachat_config,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }

    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    #[inline]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validates every nested configuration group.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the first invalid group.
    pub fn validate(&self) -> Result<()> {
        self.postgres_config.validate().map_err(|err| {
            Error::config("Invalid Postgres configuration").with_source(err)
        })?;

        self.gigachat_config.validate().map_err(|err| {
            Error::config("Invalid GigaChat configuration").with_source(err)
        })?;

        if self.fetch_timeout_secs == 0 || self.fetch_timeout_secs > MAX_FETCH_TIMEOUT_SECS {
            return Err(Error::config(format!(
                "Fetch timeout {} seconds is invalid. Must be between 1 and {MAX_FETCH_TIMEOUT_SECS} seconds.",
                self.fetch_timeout_secs
            )));
        }

        Ok(())
    }

    /// Connects to Postgres and runs pending migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = PgClient::new_with_test(self.postgres_config.clone())
            .await
            .map_err(|err| {
                Error::internal("postgres", "Failed to connect to the database").with_source(err)
            })?;

        let migrations = pg_client.run_pending_migrations().await.map_err(|err| {
            Error::internal("postgres", "Failed to apply database migrations").with_source(err)
        })?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            applied_migrations = migrations.processed_versions.len(),
            elapsed_ms = migrations.duration.as_millis(),
            "Database ready"
        );

        Ok(pg_client)
    }

    /// Builds the GigaChat client and its image fetcher.
    pub fn connect_vision(&self) -> Result<VisionService> {
        let fetcher = ImageFetcher::new(self.fetch_timeout())?;
        let client = GigaChatClient::new(self.gigachat_config.clone(), fetcher)?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            model = %client.config().gigachat_model,
            fetch_timeout_secs = self.fetch_timeout_secs,
            "Vision provider ready"
        );

        Ok(client.into_service())
    }
}
