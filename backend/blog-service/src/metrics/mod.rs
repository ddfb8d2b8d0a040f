//! Prometheus metrics for blog-service.
//!
//! Exposes HTTP, search mirroring, upload and keyword job collectors and an
//! HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
};
use std::time::Duration;

/// HTTP requests by method, matched route and status
static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "blog_http_requests_total",
        "Total number of HTTP requests",
        &["method", "route", "status"]
    )
    .expect("failed to register blog_http_requests_total")
});

static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "blog_http_request_duration_seconds",
        "HTTP request latency",
        &["method", "route"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("failed to register blog_http_request_duration_seconds")
});

/// Search index mirror operations (index/delete) by outcome
static SEARCH_MIRROR_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "blog_search_mirror_total",
        "Search index mirror operations after post writes",
        &["operation", "status"]
    )
    .expect("failed to register blog_search_mirror_total")
});

static KEYWORD_JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "blog_keyword_jobs_total",
        "Keyword jobs dispatched and processed, by outcome",
        &["outcome"]
    )
    .expect("failed to register blog_keyword_jobs_total")
});

static MEDIA_UPLOAD_BYTES: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "blog_media_upload_bytes",
        "Size of accepted media uploads",
        vec![1024.0, 16_384.0, 131_072.0, 1_048_576.0, 5_242_880.0, 20_971_520.0]
    )
    .expect("failed to register blog_media_upload_bytes")
});

pub fn record_http_request(method: &str, route: &str, status: u16, elapsed: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, route, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, route])
        .observe(elapsed.as_secs_f64());
}

pub fn record_search_mirror(operation: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    SEARCH_MIRROR_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

pub fn record_keyword_job(outcome: &str) {
    KEYWORD_JOBS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_upload(bytes: usize) {
    MEDIA_UPLOAD_BYTES.observe(bytes as f64);
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
