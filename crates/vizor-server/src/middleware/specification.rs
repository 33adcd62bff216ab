//! OpenAPI document and Scalar UI serving.
//!
//! The document is generated from the aide [`ApiRouter`] once, when the
//! router is finished, and served from an [`Extension`].
//!
//! [`ApiRouter`]: aide::axum::ApiRouter

use aide::axum::ApiRouter;
use aide::openapi::{Info, License, OpenApi};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// OpenAPI configuration for aide integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path which exposes the OpenAPI JSON document.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = "/api/openapi.json")
    )]
    pub open_api_json: String,

    /// Path which exposes the Scalar API reference UI.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = "/api/scalar")
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

/// Extension trait for [`ApiRouter`] to add OpenAPI documentation with Scalar UI.
///
/// [`ApiRouter`]: aide::axum::ApiRouter
pub trait RouterOpenApiExt<S> {
    /// Finishes the router with the vizor API info.
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S>;

    /// Finishes the router with custom API info.
    fn with_open_api_info(self, config: &OpenApiConfig, info: Info) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S> {
        let info = Info {
            title: "Vizor API".to_owned(),
            summary: Some("Object and material detection for photos".to_owned()),
            description: Some(
                "Vizor suggests the physical objects visible on a photo, then classifies \
                the materials of the objects the caller confirms. Every request is \
                recorded with the raw model answer."
                    .to_owned(),
            ),
            license: Some(License {
                name: "MIT".to_owned(),
                identifier: Some("MIT".to_owned()),
                ..License::default()
            }),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Info::default()
        };

        self.with_open_api_info(config, info)
    }

    fn with_open_api_info(self, config: &OpenApiConfig, info: Info) -> Router<S> {
        async fn serve_openapi(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
            Json(api)
        }

        let mut api = OpenApi {
            info,
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json);
        let router = self
            .route(&config.scalar_ui, scalar.axum_route())
            .route(&config.open_api_json, get(serve_openapi));

        router.finish_api(&mut api).layer(Extension(api))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::handler::routes;
    use crate::handler::test::test_state;

    #[tokio::test]
    async fn openapi_document_lists_every_route() -> anyhow::Result<()> {
        let router = routes()
            .with_open_api(&OpenApiConfig::default())
            .with_state(test_state()?);
        let server = axum_test::TestServer::new(router)?;

        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();

        let document = response.json::<Value>();
        assert_eq!(document["info"]["title"], "Vizor API");
        assert!(document["paths"]["/analysis/detect-objects"]["post"].is_object());
        assert!(document["paths"]["/analysis/detect-materials"]["post"].is_object());
        assert!(document["paths"]["/analysis/{requestId}"]["get"].is_object());
        assert!(document["paths"]["/health"]["get"].is_object());

        server.get("/api/scalar").await.assert_status_ok();
        Ok(())
    }
}
