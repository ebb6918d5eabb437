use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};

use crate::{auth, service, ApiResult, AppState};

pub(crate) async fn create_diary_like(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(diary_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let caller = auth::require_auth(&state.jwt_config, &headers)?;

    let mut tx = state.pool.begin().await?;
    service::create_diary_like(&mut tx, diary_id, caller.user_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn delete_diary_like(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(diary_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let caller = auth::require_auth(&state.jwt_config, &headers)?;

    let mut tx = state.pool.begin().await?;
    service::delete_diary_like(&mut tx, diary_id, caller.user_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
