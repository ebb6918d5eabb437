pub(crate) const INSERT_DIARY: &str = r#"
    INSERT INTO diaries (user_id, title, content, likes, created_at, updated_at)
    VALUES (?1, ?2, ?3, 0, ?4, ?4)
"#;

pub(crate) const SELECT_DIARY_BY_ID: &str = r#"
    SELECT diary_id, user_id, title, content, likes, created_at, updated_at
    FROM diaries
    WHERE diary_id = ?1
"#;

pub(crate) const UPDATE_DIARY: &str = r#"
    UPDATE diaries
    SET title = COALESCE(?2, title),
        content = COALESCE(?3, content),
        updated_at = ?4
    WHERE diary_id = ?1
"#;

pub(crate) const DELETE_DIARY: &str = r#"
    DELETE FROM diaries
    WHERE diary_id = ?1
"#;

pub(crate) const INCREMENT_DIARY_LIKES: &str = r#"
    UPDATE diaries
    SET likes = likes + 1
    WHERE diary_id = ?1
"#;

pub(crate) const DECREMENT_DIARY_LIKES: &str = r#"
    UPDATE diaries
    SET likes = MAX(likes - 1, 0)
    WHERE diary_id = ?1
"#;

pub(crate) const INSERT_DIARY_LIKE: &str = r#"
    INSERT INTO diary_likes (diary_id, user_id, created_at)
    VALUES (?1, ?2, ?3)
"#;

pub(crate) const SELECT_DIARY_LIKE_ID: &str = r#"
    SELECT diary_like_id
    FROM diary_likes
    WHERE diary_id = ?1 AND user_id = ?2
"#;

pub(crate) const DELETE_DIARY_LIKE: &str = r#"
    DELETE FROM diary_likes
    WHERE diary_id = ?1 AND user_id = ?2
"#;

pub(crate) const DELETE_DIARY_LIKES_BY_DIARY: &str = r#"
    DELETE FROM diary_likes
    WHERE diary_id = ?1
"#;
