use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

/// One diary row. `likes` is a denormalized counter kept in step with the
/// `diary_likes` table by the like/unlike workflow.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Diary {
    pub diary_id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub likes: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDiaryRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDiaryRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Detail view returned on reads: the diary's public fields with the owner
/// id replaced by the profile fetched from the user service.
#[derive(Debug, Serialize, ToSchema)]
pub struct DiaryDetail {
    pub diary_id: i64,
    pub title: String,
    pub content: String,
    pub likes: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub writer: Value,
}

impl DiaryDetail {
    pub fn new(diary: Diary, writer: Value) -> Self {
        Self {
            diary_id: diary.diary_id,
            title: diary.title,
            content: diary.content,
            likes: diary.likes,
            created_at: diary.created_at,
            updated_at: diary.updated_at,
            writer,
        }
    }
}

const MAX_TITLE_LENGTH: usize = 200;
const MAX_CONTENT_LENGTH: usize = 5000;

pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for CreateDiaryRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.title.len() > MAX_TITLE_LENGTH {
            return Err(format!("title must be at most {MAX_TITLE_LENGTH} bytes"));
        }
        if self.content.trim().is_empty() {
            return Err("content must not be empty".to_string());
        }
        if self.content.len() > MAX_CONTENT_LENGTH {
            return Err(format!("content must be at most {MAX_CONTENT_LENGTH} bytes"));
        }
        Ok(())
    }
}

impl Validate for UpdateDiaryRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.is_none() && self.content.is_none() {
            return Err("nothing to update".to_string());
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("title must not be empty".to_string());
            }
            if title.len() > MAX_TITLE_LENGTH {
                return Err(format!("title must be at most {MAX_TITLE_LENGTH} bytes"));
            }
        }
        if let Some(content) = &self.content {
            if content.trim().is_empty() {
                return Err("content must not be empty".to_string());
            }
            if content.len() > MAX_CONTENT_LENGTH {
                return Err(format!("content must be at most {MAX_CONTENT_LENGTH} bytes"));
            }
        }
        Ok(())
    }
}
