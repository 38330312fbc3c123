// src/handlers/comment.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::comment::{ANONYMOUS_AUTHOR, Comment, CommentListParams, CreateCommentRequest},
    services::threads::load_thread,
    store::DynStore,
    utils::{html::clean_text, session::Session},
};

/// Create a new comment, or a threaded reply when `parent_id` is given.
pub async fn create_comment(
    State(store): State<DynStore>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let content = clean_text(&payload.content)
        .ok_or(AppError::BadRequest("Comment must not be empty".to_string()))?;

    let article = store
        .find_article(&payload.article_id)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    // A reply must stay within the same article.
    let parent_id = match payload
        .parent_id
        .as_deref()
        .map(str::trim)
        .filter(|pid| !pid.is_empty())
    {
        Some(pid) => {
            let parent = store
                .find_comment(pid)
                .await?
                .ok_or(AppError::NotFound("Parent comment not found".to_string()))?;
            if parent.article_id != article.id {
                return Err(AppError::BadRequest(
                    "Parent comment belongs to another article".to_string(),
                ));
            }
            Some(parent.id)
        }
        None => None,
    };

    let comment = Comment {
        id: Uuid::new_v4().to_string(),
        article_id: article.id,
        content,
        author: payload
            .author
            .as_deref()
            .and_then(clean_text)
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
        parent_id,
        created_at: Utc::now(),
        likes: 0,
        dislikes: 0,
    };

    store.insert_comment(&comment).await.map_err(|e| {
        tracing::error!("Failed to create comment: {:?}", e);
        e
    })?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /api/comments?article_id=...`: the nested thread for an article.
pub async fn list_comments(
    State(store): State<DynStore>,
    Extension(session): Extension<Session>,
    Query(params): Query<CommentListParams>,
) -> Result<impl IntoResponse, AppError> {
    let thread = load_thread(&*store, &params.article_id, &session.id).await?;

    Ok(Json(thread))
}

/// `GET /api/articles/{id}/comments`: same as [`list_comments`], keyed by path.
pub async fn list_article_comments(
    State(store): State<DynStore>,
    Extension(session): Extension<Session>,
    Path(article_key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let thread = load_thread(&*store, &article_key, &session.id).await?;

    Ok(Json(thread))
}
