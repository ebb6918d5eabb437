use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::error::DiaryError;
use crate::model::{CreateDiaryRequest, Diary, DiaryDetail, UpdateDiaryRequest};
use crate::queries;
use crate::writer::WriterClient;

// The diary workflow. Write operations run on a transaction connection owned
// by the calling handler; nothing here begins, commits, or rolls back. Every
// operation logs its failure before propagating it.

pub(crate) async fn create_diary(
    tx: &mut SqliteConnection,
    user_id: i64,
    payload: &CreateDiaryRequest,
) -> Result<Diary, DiaryError> {
    let result = async {
        if user_id <= 0 {
            return Err(DiaryError::BadRequest("user id is required"));
        }
        let now = chrono::Utc::now().timestamp();
        let inserted = sqlx::query(queries::INSERT_DIARY)
            .bind(user_id)
            .bind(&payload.title)
            .bind(&payload.content)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        Ok(Diary {
            diary_id: inserted.last_insert_rowid(),
            user_id,
            title: payload.title.clone(),
            content: payload.content.clone(),
            likes: 0,
            created_at: now,
            updated_at: now,
        })
    }
    .await;
    if let Err(err) = &result {
        tracing::error!(user_id, error = %err, "create diary failed");
    }
    result
}

pub(crate) async fn update_diary(
    tx: &mut SqliteConnection,
    diary_id: i64,
    user_id: i64,
    payload: &UpdateDiaryRequest,
) -> Result<(), DiaryError> {
    let result = async {
        ensure_ids(diary_id, user_id)?;
        if !is_diary_owner(&mut *tx, user_id, diary_id).await? {
            return Err(DiaryError::PermissionDenied);
        }
        let now = chrono::Utc::now().timestamp();
        let updated = sqlx::query(queries::UPDATE_DIARY)
            .bind(diary_id)
            .bind(payload.title.as_deref())
            .bind(payload.content.as_deref())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(DiaryError::BadRequest("diary update failed: nothing updated"));
        }
        Ok(())
    }
    .await;
    if let Err(err) = &result {
        tracing::error!(diary_id, user_id, error = %err, "update diary failed");
    }
    result
}

pub(crate) async fn delete_diary(
    tx: &mut SqliteConnection,
    diary_id: i64,
    user_id: i64,
) -> Result<(), DiaryError> {
    let result = async {
        ensure_ids(diary_id, user_id)?;
        if !is_diary_owner(&mut *tx, user_id, diary_id).await? {
            return Err(DiaryError::PermissionDenied);
        }
        // Likes carry no foreign key; they are removed as an explicit step
        // before the diary itself.
        sqlx::query(queries::DELETE_DIARY_LIKES_BY_DIARY)
            .bind(diary_id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query(queries::DELETE_DIARY)
            .bind(diary_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(DiaryError::BadRequest("diary delete failed: nothing deleted"));
        }
        Ok(())
    }
    .await;
    if let Err(err) = &result {
        tracing::error!(diary_id, user_id, error = %err, "delete diary failed");
    }
    result
}

pub(crate) async fn read_diary_detail(
    pool: &Pool<Sqlite>,
    writer: &WriterClient,
    diary_id: i64,
    token: &str,
) -> Result<DiaryDetail, DiaryError> {
    let result = async {
        if diary_id <= 0 {
            return Err(DiaryError::BadRequest("diary id is required"));
        }
        let diary = sqlx::query_as::<_, Diary>(queries::SELECT_DIARY_BY_ID)
            .bind(diary_id)
            .fetch_optional(pool)
            .await?
            .ok_or(DiaryError::NotFound)?;
        let profile = writer.fetch_writer(diary.user_id, token).await?;
        Ok(DiaryDetail::new(diary, profile))
    }
    .await;
    if let Err(err) = &result {
        tracing::error!(diary_id, error = %err, "read diary detail failed");
    }
    result
}

pub(crate) async fn create_diary_like(
    tx: &mut SqliteConnection,
    diary_id: i64,
    user_id: i64,
) -> Result<(), DiaryError> {
    let result = async {
        ensure_ids(diary_id, user_id)?;
        let existing: Option<i64> = sqlx::query_scalar(queries::SELECT_DIARY_LIKE_ID)
            .bind(diary_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(DiaryError::AlreadyLiked);
        }
        let now = chrono::Utc::now().timestamp();
        sqlx::query(queries::INSERT_DIARY_LIKE)
            .bind(diary_id)
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(like_insert_error)?;
        sqlx::query(queries::INCREMENT_DIARY_LIKES)
            .bind(diary_id)
            .execute(&mut *tx)
            .await?;
        // The diary may have been deleted out from under the like; surface
        // that as NotFound so the transaction rolls back the orphan row.
        let diary = fetch_diary(&mut *tx, diary_id).await?;
        if diary.is_none() {
            return Err(DiaryError::NotFound);
        }
        Ok(())
    }
    .await;
    if let Err(err) = &result {
        tracing::error!(diary_id, user_id, error = %err, "create diary like failed");
    }
    result
}

pub(crate) async fn delete_diary_like(
    tx: &mut SqliteConnection,
    diary_id: i64,
    user_id: i64,
) -> Result<(), DiaryError> {
    let result = async {
        ensure_ids(diary_id, user_id)?;
        let deleted = sqlx::query(queries::DELETE_DIARY_LIKE)
            .bind(diary_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(DiaryError::NotLiked);
        }
        sqlx::query(queries::DECREMENT_DIARY_LIKES)
            .bind(diary_id)
            .execute(&mut *tx)
            .await?;
        Ok(())
    }
    .await;
    if let Err(err) = &result {
        tracing::error!(diary_id, user_id, error = %err, "delete diary like failed");
    }
    result
}

fn ensure_ids(diary_id: i64, user_id: i64) -> Result<(), DiaryError> {
    if diary_id <= 0 || user_id <= 0 {
        return Err(DiaryError::BadRequest("diary id and user id are required"));
    }
    Ok(())
}

/// Owner check with exact id equality. An absent diary is NotFound here so
/// callers never compare against a missing row.
async fn is_diary_owner(
    conn: &mut SqliteConnection,
    user_id: i64,
    diary_id: i64,
) -> Result<bool, DiaryError> {
    let diary = fetch_diary(conn, diary_id)
        .await?
        .ok_or(DiaryError::NotFound)?;
    Ok(diary.user_id == user_id)
}

async fn fetch_diary(
    conn: &mut SqliteConnection,
    diary_id: i64,
) -> Result<Option<Diary>, DiaryError> {
    let diary = sqlx::query_as::<_, Diary>(queries::SELECT_DIARY_BY_ID)
        .bind(diary_id)
        .fetch_optional(conn)
        .await?;
    Ok(diary)
}

fn like_insert_error(err: sqlx::Error) -> DiaryError {
    let unique_violation = err
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique_violation {
        DiaryError::AlreadyLiked
    } else {
        DiaryError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> Pool<Sqlite> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        diary_core::migrations::run(&pool).await.expect("migrations");
        pool
    }

    fn payload(title: &str, content: &str) -> CreateDiaryRequest {
        CreateDiaryRequest {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    async fn seed_diary(pool: &Pool<Sqlite>, user_id: i64) -> Diary {
        let mut tx = pool.begin().await.unwrap();
        let diary = create_diary(&mut tx, user_id, &payload("day one", "first entry"))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        diary
    }

    async fn seed_like(pool: &Pool<Sqlite>, diary_id: i64, user_id: i64) {
        let mut tx = pool.begin().await.unwrap();
        create_diary_like(&mut tx, diary_id, user_id).await.unwrap();
        tx.commit().await.unwrap();
    }

    async fn stored_diary(pool: &Pool<Sqlite>, diary_id: i64) -> Option<Diary> {
        sqlx::query_as::<_, Diary>(queries::SELECT_DIARY_BY_ID)
            .bind(diary_id)
            .fetch_optional(pool)
            .await
            .unwrap()
    }

    async fn like_count(pool: &Pool<Sqlite>, diary_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM diary_likes WHERE diary_id = ?1")
            .bind(diary_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_persists_diary_with_owner() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;

        assert!(diary.diary_id > 0);
        assert_eq!(diary.user_id, 42);
        assert_eq!(diary.likes, 0);
        assert!(diary.created_at > 0);

        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.title, "day one");
        assert_eq!(stored.content, "first entry");
        assert_eq!(stored.user_id, 42);
        assert_eq!(stored.likes, 0);
    }

    #[tokio::test]
    async fn create_rejects_falsy_owner() {
        let pool = test_pool().await;
        let mut tx = pool.begin().await.unwrap();
        let err = create_diary(&mut tx, 0, &payload("day one", "first entry"))
            .await
            .unwrap_err();
        assert!(matches!(err, DiaryError::BadRequest(_)));
    }

    #[tokio::test]
    async fn update_by_owner_changes_only_provided_fields() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;

        let mut tx = pool.begin().await.unwrap();
        let update = UpdateDiaryRequest {
            title: Some("day two".to_string()),
            content: None,
        };
        update_diary(&mut tx, diary.diary_id, 42, &update)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.title, "day two");
        assert_eq!(stored.content, "first entry");
        assert!(stored.updated_at >= diary.updated_at);
    }

    #[tokio::test]
    async fn update_by_non_owner_is_forbidden() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;

        let mut tx = pool.begin().await.unwrap();
        let update = UpdateDiaryRequest {
            title: Some("hijacked".to_string()),
            content: None,
        };
        let err = update_diary(&mut tx, diary.diary_id, 7, &update)
            .await
            .unwrap_err();
        assert!(matches!(err, DiaryError::PermissionDenied));
        drop(tx);

        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.title, "day one");
    }

    #[tokio::test]
    async fn update_missing_diary_is_not_found() {
        let pool = test_pool().await;
        let mut tx = pool.begin().await.unwrap();
        let update = UpdateDiaryRequest {
            title: Some("ghost".to_string()),
            content: None,
        };
        let err = update_diary(&mut tx, 999, 42, &update).await.unwrap_err();
        assert!(matches!(err, DiaryError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_diary_and_its_likes() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;
        seed_like(&pool, diary.diary_id, 2).await;
        seed_like(&pool, diary.diary_id, 3).await;
        assert_eq!(like_count(&pool, diary.diary_id).await, 2);

        let mut tx = pool.begin().await.unwrap();
        delete_diary(&mut tx, diary.diary_id, 42).await.unwrap();
        tx.commit().await.unwrap();

        assert!(stored_diary(&pool, diary.diary_id).await.is_none());
        assert_eq!(like_count(&pool, diary.diary_id).await, 0);
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_forbidden() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;
        seed_like(&pool, diary.diary_id, 2).await;

        let mut tx = pool.begin().await.unwrap();
        let err = delete_diary(&mut tx, diary.diary_id, 7).await.unwrap_err();
        assert!(matches!(err, DiaryError::PermissionDenied));
        drop(tx);

        assert!(stored_diary(&pool, diary.diary_id).await.is_some());
        assert_eq!(like_count(&pool, diary.diary_id).await, 1);
    }

    #[tokio::test]
    async fn delete_missing_diary_is_not_found() {
        let pool = test_pool().await;
        let mut tx = pool.begin().await.unwrap();
        let err = delete_diary(&mut tx, 999, 42).await.unwrap_err();
        assert!(matches!(err, DiaryError::NotFound));
    }

    #[tokio::test]
    async fn delete_rejects_falsy_ids() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;

        let mut tx = pool.begin().await.unwrap();
        assert!(matches!(
            delete_diary(&mut tx, 0, 42).await.unwrap_err(),
            DiaryError::BadRequest(_)
        ));
        assert!(matches!(
            delete_diary(&mut tx, diary.diary_id, 0).await.unwrap_err(),
            DiaryError::BadRequest(_)
        ));
        drop(tx);

        assert!(stored_diary(&pool, diary.diary_id).await.is_some());
    }

    #[tokio::test]
    async fn like_inserts_row_and_increments_counter() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;

        seed_like(&pool, diary.diary_id, 7).await;

        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.likes, 1);
        assert_eq!(like_count(&pool, diary.diary_id).await, 1);
    }

    #[tokio::test]
    async fn second_like_by_same_user_conflicts() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;
        seed_like(&pool, diary.diary_id, 7).await;

        let mut tx = pool.begin().await.unwrap();
        let err = create_diary_like(&mut tx, diary.diary_id, 7)
            .await
            .unwrap_err();
        assert!(matches!(err, DiaryError::AlreadyLiked));
        drop(tx);

        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.likes, 1);
    }

    #[tokio::test]
    async fn like_rejects_falsy_ids() {
        let pool = test_pool().await;
        let mut tx = pool.begin().await.unwrap();
        assert!(matches!(
            create_diary_like(&mut tx, 0, 7).await.unwrap_err(),
            DiaryError::BadRequest(_)
        ));
        assert!(matches!(
            create_diary_like(&mut tx, 5, 0).await.unwrap_err(),
            DiaryError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn like_on_missing_diary_is_not_found_and_rolls_back() {
        let pool = test_pool().await;

        let mut tx = pool.begin().await.unwrap();
        let err = create_diary_like(&mut tx, 999, 7).await.unwrap_err();
        assert!(matches!(err, DiaryError::NotFound));
        drop(tx);

        assert_eq!(like_count(&pool, 999).await, 0);
    }

    #[tokio::test]
    async fn unlike_removes_row_and_decrements_counter() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;
        seed_like(&pool, diary.diary_id, 7).await;

        let mut tx = pool.begin().await.unwrap();
        delete_diary_like(&mut tx, diary.diary_id, 7).await.unwrap();
        tx.commit().await.unwrap();

        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.likes, 0);
        assert_eq!(like_count(&pool, diary.diary_id).await, 0);
    }

    #[tokio::test]
    async fn unlike_without_existing_like_conflicts() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;

        let mut tx = pool.begin().await.unwrap();
        let err = delete_diary_like(&mut tx, diary.diary_id, 7)
            .await
            .unwrap_err();
        assert!(matches!(err, DiaryError::NotLiked));
        drop(tx);

        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.likes, 0);
    }

    #[tokio::test]
    async fn likes_counter_never_goes_negative() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 42).await;

        // The clamped decrement holds even if it runs with no likes left.
        sqlx::query(queries::DECREMENT_DIARY_LIKES)
            .bind(diary.diary_id)
            .execute(&pool)
            .await
            .unwrap();

        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.likes, 0);
    }

    #[tokio::test]
    async fn read_detail_missing_diary_is_not_found() {
        let pool = test_pool().await;
        // The writer client must never be reached for an absent diary.
        let writer =
            WriterClient::new("http://127.0.0.1:1", std::time::Duration::from_secs(1)).unwrap();

        let err = read_diary_detail(&pool, &writer, 999, "token")
            .await
            .unwrap_err();
        assert!(matches!(err, DiaryError::NotFound));
    }

    #[tokio::test]
    async fn diary_lifecycle_walkthrough() {
        let pool = test_pool().await;
        let diary = seed_diary(&pool, 1).await;

        seed_like(&pool, diary.diary_id, 2).await;
        seed_like(&pool, diary.diary_id, 3).await;
        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.likes, 2);
        assert_eq!(stored.likes, like_count(&pool, diary.diary_id).await);

        let mut tx = pool.begin().await.unwrap();
        delete_diary_like(&mut tx, diary.diary_id, 2).await.unwrap();
        tx.commit().await.unwrap();
        let stored = stored_diary(&pool, diary.diary_id).await.unwrap();
        assert_eq!(stored.likes, 1);

        let mut tx = pool.begin().await.unwrap();
        let update = UpdateDiaryRequest {
            title: None,
            content: Some("second entry".to_string()),
        };
        update_diary(&mut tx, diary.diary_id, 1, &update)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let err = update_diary(&mut tx, diary.diary_id, 2, &update)
            .await
            .unwrap_err();
        assert!(matches!(err, DiaryError::PermissionDenied));
        drop(tx);

        let mut tx = pool.begin().await.unwrap();
        delete_diary(&mut tx, diary.diary_id, 1).await.unwrap();
        tx.commit().await.unwrap();

        assert!(stored_diary(&pool, diary.diary_id).await.is_none());
        assert_eq!(like_count(&pool, diary.diary_id).await, 0);
    }
}
