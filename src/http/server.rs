//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit, metrics)
//! - Mount the admin API and the optional static frontend
//! - Serve until the shutdown signal, then drain

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::blockchain::ContentLedger;
use crate::config::{NotaryConfig, SecurityConfig};
use crate::http::handlers;
use crate::http::middleware::track_metrics;
use crate::http::request::{request_id_of, MakeRequestUuid, X_REQUEST_ID};

/// Headroom on top of the file limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NotaryConfig>,
    pub ledger: Arc<dyn ContentLedger>,
}

/// HTTP server for the notary API.
pub struct HttpServer {
    router: Router,
    config: Arc<NotaryConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and ledger.
    pub fn new(config: NotaryConfig, ledger: Arc<dyn ContentLedger>) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            ledger,
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.clone();
        let body_limit = config.upload.max_file_size.saturating_add(MULTIPART_OVERHEAD);

        let mut router = Router::new()
            .route("/api/upload", post(handlers::upload))
            .route("/api/verify/{hash}", get(handlers::verify))
            .route("/api/attest", post(handlers::attest))
            .route("/api/revoke", post(handlers::revoke))
            .route("/api/status/{hash}", get(handlers::status))
            .route("/api/history/{hash}", get(handlers::history))
            .route("/health", get(handlers::health));

        if config.admin.enabled {
            router = router.merge(admin::router(state.clone()));
        }

        let mut router = router
            .route_layer(middleware::from_fn(track_metrics))
            .layer(DefaultBodyLimit::max(body_limit));

        if let Some(dir) = &config.frontend.static_dir {
            tracing::info!(static_dir = %dir.display(), "Serving static frontend");
            router = router.fallback_service(ServeDir::new(dir));
        }

        let request_id = HeaderName::from_static(X_REQUEST_ID);
        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id_of(request),
                        )
                    }),
                )
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(cors_layer(&config.security))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                ))),
        )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &NotaryConfig {
        &self.config
    }
}

/// Every origin when none are configured, otherwise exactly the list.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::MemoryLedger;
    use alloy::primitives::Address;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server(config: NotaryConfig) -> HttpServer {
        let ledger = Arc::new(MemoryLedger::new(Address::repeat_byte(0x42), 31337));
        HttpServer::new(config, ledger)
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let response = server(NotaryConfig::default())
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_client_request_id_is_echoed() {
        let response = server(NotaryConfig::default())
            .router()
            .oneshot(
                Request::get("/health")
                    .header(X_REQUEST_ID, "trace-me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "trace-me");
    }

    #[tokio::test]
    async fn test_admin_routes_absent_when_disabled() {
        let response = server(NotaryConfig::default())
            .router()
            .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_restricted_cors_origin() {
        let mut config = NotaryConfig::default();
        config.security.cors_allowed_origins = vec!["https://notary.example".to_string()];

        let response = server(config)
            .router()
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "https://notary.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://notary.example"
        );
    }
}
