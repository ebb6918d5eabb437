use anyhow::Result;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use diary_core::auth::{jwt_config_from_env, JwtConfig};
use diary_core::{config, db, http, logging, metrics, server};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use std::net::SocketAddr;
use std::time::Duration;

mod auth;
mod diaries;
mod error;
mod likes;
mod model;
mod openapi;
mod queries;
mod service;
mod writer;


const SERVICE_NAME: &str = "diary-api";

#[derive(Clone)]
pub(crate) struct AppState {
    pool: Pool<Sqlite>,
    writer: writer::WriterClient,
    jwt_config: JwtConfig,
}

/// Service-family success envelope. The user service answers profile reads
/// in the same shape, so the writer client reuses it for decoding.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Data<T> {
    pub data: T,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    details: Option<Value>,
}

#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
    headers: Vec<(&'static str, String)>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            headers: Vec::new(),
        }
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    fn with_header(mut self, name: &'static str, value: String) -> Self {
        self.headers.push((name, value));
        self
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = ErrorResponse {
            code: self.code,
            message: self.message,
            details: self.details,
        };
        let mut response = (self.status, Json(payload)).into_response();
        for (name, value) in self.headers {
            if let Ok(value) = value.parse() {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, utoipa::ToSchema)]
struct HealthStatus {
    status: String,
}

pub struct DiaryApiConfig {
    pub addr: SocketAddr,
    pub database_url: String,
    pub user_service_url: String,
    pub jwt: JwtConfig,
}

pub fn load_config() -> Result<DiaryApiConfig> {
    let addr = config::socket_addr_from_env("DIARY_API_ADDR", "0.0.0.0:8080")?;
    let database_url = config::required_env("DATABASE_URL")?;
    let user_service_url = config::env_or("USER_SERVICE_URL", "http://127.0.0.1:3000");
    let jwt = jwt_config_from_env()?;
    Ok(DiaryApiConfig {
        addr,
        database_url,
        user_service_url,
        jwt,
    })
}

pub async fn run(config: DiaryApiConfig) -> Result<()> {
    logging::init(SERVICE_NAME);
    metrics::init(SERVICE_NAME);

    let pool = db::connect(&config.database_url).await?;
    let writer = writer::WriterClient::new(&config.user_service_url, Duration::from_secs(5))?;
    let state = AppState {
        pool,
        writer,
        jwt_config: config.jwt,
    };

    let router = http::apply_standard_layers(router(state), SERVICE_NAME);
    server::serve(config.addr, router).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/diary/openapi.json", get(openapi_json))
        .route("/api/diary", post(diaries::create_diary))
        .route(
            "/api/diary/:diary_id",
            get(diaries::read_diary_detail)
                .patch(diaries::update_diary)
                .delete(diaries::delete_diary),
        )
        .route(
            "/api/diary/:diary_id/like",
            post(likes::create_diary_like).delete(likes::delete_diary_like),
        )
        .with_state(state)
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    match db::check_ready(&state.pool).await {
        Ok(_) => (StatusCode::OK, Json(HealthStatus { status: "ok".into() })),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "unavailable".into(),
            }),
        ),
    }
}

async fn metrics_endpoint() -> impl IntoResponse {
    metrics::metrics_response(SERVICE_NAME)
}

async fn openapi_json(headers: HeaderMap) -> impl IntoResponse {
    let server_url = openapi::infer_server_url(&headers);
    Json(openapi::document(server_url.as_deref()))
}
