//! Per-route request instrumentation.
//!
//! # Metrics
//! - `railboard_api_request_duration_seconds` (histogram): handler latency by route template
//! - `railboard_api_requests_total` (counter): handled requests by route template
//!
//! Both are labelled `path` with the registered template, e.g.
//! `/v2/arrivals/station/{station}`, never the concrete request path.
//!
//! The registry is an explicit [`ApiMetrics`] value rather than the global
//! `metrics` recorder, so every router (and every test) can own an isolated
//! instance. Requests that match no route are not recorded, and neither are
//! 405 responses: those come from the method router, not from a handler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use metrics::{Key, Label, Level, Metadata, Recorder, Unit};
use metrics_exporter_prometheus::{
    BuildError, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

/// Request duration histogram name.
pub const REQUEST_DURATION: &str = "railboard_api_request_duration_seconds";

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "railboard_api_requests_total";

/// Label carrying the route template.
pub const PATH_LABEL: &str = "path";

/// Content type of the Prometheus text format.
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Histogram buckets in seconds, tuned for in-memory lookups.
const DURATION_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Registry of the API request metrics.
pub struct ApiMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl ApiMetrics {
    /// Create an empty registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the Prometheus recorder rejects the bucket layout.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets(DURATION_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        recorder.describe_histogram(
            REQUEST_DURATION.into(),
            Some(Unit::Seconds),
            "Duration of HTTP API requests.".into(),
        );
        recorder.describe_counter(REQUESTS_TOTAL.into(), None, "HTTP API requests.".into());

        Ok(Self { recorder, handle })
    }

    /// Create a registry ready to be shared with the middleware.
    ///
    /// # Errors
    ///
    /// See [`ApiMetrics::new`].
    pub fn shared() -> Result<Arc<Self>, BuildError> {
        Self::new().map(Arc::new)
    }

    /// Record one handled request against its route template.
    ///
    /// The duration sample is written before the counter is incremented.
    pub fn observe(&self, template: &str, elapsed: Duration) {
        let labels = vec![Label::new(PATH_LABEL, template.to_owned())];
        let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

        self.recorder
            .register_histogram(&Key::from_parts(REQUEST_DURATION, labels.clone()), &metadata)
            .record(elapsed.as_secs_f64());
        self.recorder
            .register_counter(&Key::from_parts(REQUESTS_TOTAL, labels), &metadata)
            .increment(1);
    }

    /// Prometheus text exposition of all recorded metrics.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Middleware timing the wrapped handler and recording it by route template.
///
/// Install with `route_layer` so it only sees requests that matched a route.
pub async fn track_metrics(
    State(metrics): State<Arc<ApiMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(template) = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
    else {
        return next.run(request).await;
    };

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        metrics.observe(&template, elapsed);
    }

    response
}

/// Router serving the registry at `/metrics` for a separate listener.
///
/// Requests to it are not themselves recorded.
pub fn exposition_router(metrics: Arc<ApiMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics)
}

async fn render_metrics(State(metrics): State<Arc<ApiMetrics>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;

    use super::*;

    fn count_line(metrics: &ApiMetrics, template: &str) -> Option<String> {
        let prefix = format!("{REQUESTS_TOTAL}{{{PATH_LABEL}=\"{template}\"}} ");
        metrics
            .render()
            .lines()
            .find(|line| line.starts_with(&prefix))
            .map(str::to_owned)
    }

    #[test]
    fn test_new_registry_is_empty() {
        let metrics = ApiMetrics::new().unwrap();
        assert!(count_line(&metrics, "/v2").is_none());
    }

    #[test]
    fn test_observe_records_duration_and_count() {
        let metrics = ApiMetrics::new().unwrap();
        metrics.observe("/v2/status", Duration::from_millis(3));
        metrics.observe("/v2/status", Duration::from_millis(4));

        assert_eq!(
            count_line(&metrics, "/v2/status").as_deref(),
            Some("railboard_api_requests_total{path=\"/v2/status\"} 2")
        );
        assert!(metrics
            .render()
            .contains("railboard_api_request_duration_seconds_count{path=\"/v2/status\"} 2"));
    }

    #[test]
    fn test_registries_are_isolated() {
        let first = ApiMetrics::new().unwrap();
        let second = ApiMetrics::new().unwrap();
        first.observe("/v2", Duration::from_millis(1));

        assert!(count_line(&first, "/v2").is_some());
        assert!(count_line(&second, "/v2").is_none());
    }

    #[tokio::test]
    async fn test_exposition_router_renders_registry() {
        let metrics = ApiMetrics::shared().unwrap();
        metrics.observe("/v2/status", Duration::from_millis(2));
        let server = TestServer::new(exposition_router(metrics.clone())).unwrap();

        let response = server.get("/metrics").await;
        response.assert_status_ok();
        assert_eq!(
            response.header("content-type").to_str().unwrap(),
            EXPOSITION_CONTENT_TYPE
        );
        assert!(response
            .text()
            .contains("railboard_api_requests_total{path=\"/v2/status\"} 1"));

        server.get("/metrics").await.assert_status_ok();
        assert_eq!(
            count_line(&metrics, "/metrics"),
            None,
            "exposition requests are not recorded"
        );
    }
}
