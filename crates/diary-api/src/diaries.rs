use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::json;

use crate::model::{CreateDiaryRequest, Diary, DiaryDetail, UpdateDiaryRequest, Validate};
use crate::{auth, service, ApiError, ApiResult, AppState, Data};

pub(crate) async fn create_diary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateDiaryRequest>,
) -> ApiResult<(StatusCode, Json<Data<Diary>>)> {
    let caller = auth::require_auth(&state.jwt_config, &headers)?;
    payload.validate().map_err(invalid_request)?;

    let mut tx = state.pool.begin().await?;
    let diary = service::create_diary(&mut tx, caller.user_id, &payload).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(Data { data: diary })))
}

pub(crate) async fn read_diary_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(diary_id): Path<i64>,
) -> ApiResult<Json<Data<DiaryDetail>>> {
    let caller = auth::require_auth(&state.jwt_config, &headers)?;
    let detail =
        service::read_diary_detail(&state.pool, &state.writer, diary_id, &caller.token).await?;
    Ok(Json(Data { data: detail }))
}

pub(crate) async fn update_diary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(diary_id): Path<i64>,
    Json(payload): Json<UpdateDiaryRequest>,
) -> ApiResult<StatusCode> {
    let caller = auth::require_auth(&state.jwt_config, &headers)?;
    payload.validate().map_err(invalid_request)?;

    let mut tx = state.pool.begin().await?;
    service::update_diary(&mut tx, diary_id, caller.user_id, &payload).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn delete_diary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(diary_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let caller = auth::require_auth(&state.jwt_config, &headers)?;

    let mut tx = state.pool.begin().await?;
    service::delete_diary(&mut tx, diary_id, caller.user_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

fn invalid_request(message: String) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", "invalid diary payload")
        .with_details(json!({ "reason": message }))
}
