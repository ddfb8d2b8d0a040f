/// Health check endpoints
use crate::AppState;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

async fn check_postgres(state: &AppState) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1")
        .fetch_one(&state.db)
        .await
        .map(|_| ())
}

pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    match check_postgres(&state).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

pub async fn readiness_summary(state: web::Data<AppState>) -> HttpResponse {
    let mut checks = HashMap::new();

    let start = Instant::now();
    let postgres_check = match check_postgres(&state).await {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: format!("PostgreSQL connection failed: {}", e),
            latency_ms: start.elapsed().as_millis() as u64,
        },
    };
    checks.insert("postgresql".to_string(), postgres_check);

    let start = Instant::now();
    let search_check = match state.search.ping().await {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "Elasticsearch ping successful".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: format!("Elasticsearch ping failed: {}", e),
            latency_ms: start.elapsed().as_millis() as u64,
        },
    };
    checks.insert("elasticsearch".to_string(), search_check);

    let ready = checks
        .values()
        .all(|c| matches!(c.status, ComponentStatus::Healthy));
    let status = if ready {
        ComponentStatus::Healthy
    } else {
        ComponentStatus::Unhealthy
    };

    let response = ReadinessResponse {
        ready,
        status,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
