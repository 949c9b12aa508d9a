//! HTTP listener for the metrics endpoint
//!
//! Gathering runs the collectors, which do blocking socket I/O, so it is
//! moved off the async workers with `spawn_blocking`. Concurrent requests
//! each gather independently; per-pool serialization is the collectors' job.

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::net::TcpListener;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    registry: Registry,
    metrics_path: String,
}

/// Build the router: the metrics endpoint, plus a landing page at `/`
/// unless the metrics endpoint is mounted there
pub fn router(registry: Registry, metrics_path: &str) -> Router {
    let state = AppState {
        registry,
        metrics_path: metrics_path.to_string(),
    };

    let mut router = Router::new().route(metrics_path, get(metrics_handler));
    if metrics_path != "/" {
        router = router.route("/", get(index_handler));
    }
    router.with_state(state)
}

/// Serve until Ctrl+C or SIGTERM, then finish in-flight requests
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    let registry = state.registry.clone();
    match tokio::task::spawn_blocking(move || encode_registry(&registry)).await {
        Ok(Ok((content_type, body))) => {
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
        Err(e) => {
            tracing::error!("Metrics gathering task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to gather metrics").into_response()
        }
    }
}

/// Gather every collector and render the text exposition format
fn encode_registry(registry: &Registry) -> prometheus::Result<(String, Vec<u8>)> {
    let families = registry.gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::with_capacity(4096);
    encoder.encode(&families, &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n<head><title>PHP-FPM Exporter</title></head>\n<body>\n\
         <h1>PHP-FPM Exporter</h1>\n<p><a href=\"{0}\">{0}</a></p>\n</body>\n</html>\n",
        state.metrics_path
    ))
}

/// Wait for Ctrl+C or SIGTERM
///
/// If a handler cannot be installed the error is logged and that signal is
/// never reported.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining in-flight requests");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use prometheus::IntGauge;
    use tower::ServiceExt;

    fn registry() -> Registry {
        let registry = Registry::new();
        let gauge = IntGauge::new("fpm_test_gauge", "Test gauge").unwrap();
        gauge.set(7);
        registry.register(Box::new(gauge)).unwrap();
        registry
    }

    async fn send(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (status, content_type, body) = send(router(registry(), "/metrics"), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert!(body.contains("fpm_test_gauge 7"));
    }

    #[tokio::test]
    async fn test_index_links_metrics_path() {
        let (status, _, body) = send(router(registry(), "/stats"), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href=\"/stats\""));
    }

    #[tokio::test]
    async fn test_metrics_at_root() {
        let (status, _, body) = send(router(registry(), "/"), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("fpm_test_gauge 7"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (status, _, _) = send(router(registry(), "/metrics"), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
