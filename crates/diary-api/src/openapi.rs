#![allow(dead_code)]

use axum::http::HeaderMap;
use utoipa::openapi::server::ServerBuilder;
use utoipa::OpenApi;

use crate::model::{CreateDiaryRequest, Diary, DiaryDetail, UpdateDiaryRequest};
use crate::{ErrorResponse, HealthStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz_doc,
        metrics_doc,
        openapi_doc,
        diary_create_doc,
        diary_detail_doc,
        diary_update_doc,
        diary_delete_doc,
        diary_like_doc,
        diary_unlike_doc
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        Diary,
        DiaryDetail,
        CreateDiaryRequest,
        UpdateDiaryRequest
    )),
    tags(
        (name = "diary", description = "Diary CRUD and like workflow")
    )
)]
pub struct DiaryApiDoc;

pub fn document(server_url: Option<&str>) -> utoipa::openapi::OpenApi {
    let mut doc = DiaryApiDoc::openapi();
    if let Some(url) = server_url {
        doc.servers = Some(vec![ServerBuilder::new().url(url).build()]);
    }
    doc
}

pub fn infer_server_url(headers: &HeaderMap) -> Option<String> {
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|value| value.to_str().ok())?;
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");
    Some(format!("{proto}://{host}"))
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses((status = 200, body = HealthStatus), (status = 503, body = HealthStatus))
)]
fn healthz_doc() {}

#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, content_type = "text/plain", body = String))
)]
fn metrics_doc() {}

#[utoipa::path(
    get,
    path = "/api/diary/openapi.json",
    responses((status = 200, body = serde_json::Value))
)]
fn openapi_doc() {}

#[utoipa::path(
    post,
    path = "/api/diary",
    request_body = CreateDiaryRequest,
    responses(
        (status = 201, body = serde_json::Value),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse)
    )
)]
fn diary_create_doc() {}

#[utoipa::path(
    get,
    path = "/api/diary/{diary_id}",
    params(("diary_id" = i64, Path, description = "Diary identifier")),
    responses(
        (status = 200, body = serde_json::Value),
        (status = 404, body = ErrorResponse),
        (status = 502, body = ErrorResponse)
    )
)]
fn diary_detail_doc() {}

#[utoipa::path(
    patch,
    path = "/api/diary/{diary_id}",
    params(("diary_id" = i64, Path, description = "Diary identifier")),
    request_body = UpdateDiaryRequest,
    responses(
        (status = 204),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
fn diary_update_doc() {}

#[utoipa::path(
    delete,
    path = "/api/diary/{diary_id}",
    params(("diary_id" = i64, Path, description = "Diary identifier")),
    responses(
        (status = 204),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
fn diary_delete_doc() {}

#[utoipa::path(
    post,
    path = "/api/diary/{diary_id}/like",
    params(("diary_id" = i64, Path, description = "Diary identifier")),
    responses(
        (status = 204),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    )
)]
fn diary_like_doc() {}

#[utoipa::path(
    delete,
    path = "/api/diary/{diary_id}/like",
    params(("diary_id" = i64, Path, description = "Diary identifier")),
    responses(
        (status = 204),
        (status = 409, body = ErrorResponse)
    )
)]
fn diary_unlike_doc() {}
