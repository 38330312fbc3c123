use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{comment::ReactionKind, interaction::ArticleReaction},
    services::reactions,
    store::DynStore,
    utils::session::Session,
};

/// Toggle Like on a comment. Clears a dislike held by the same session.
pub async fn toggle_comment_like(
    State(store): State<DynStore>,
    Extension(session): Extension<Session>,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = session.client_id()?;
    let state =
        reactions::toggle_comment_reaction(&*store, &comment_id, session_id, ReactionKind::Like)
            .await?;

    Ok(Json(state))
}

/// Toggle Dislike on a comment. Clears a like held by the same session.
pub async fn toggle_comment_dislike(
    State(store): State<DynStore>,
    Extension(session): Extension<Session>,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = session.client_id()?;
    let state = reactions::toggle_comment_reaction(
        &*store,
        &comment_id,
        session_id,
        ReactionKind::Dislike,
    )
    .await?;

    Ok(Json(state))
}

/// Toggle Like on an article.
pub async fn toggle_article_like(
    State(store): State<DynStore>,
    Extension(session): Extension<Session>,
    Path(article_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = session.client_id()?;
    let state =
        reactions::toggle_article_reaction(&*store, &article_id, session_id, ArticleReaction::Like)
            .await?;

    Ok(Json(state))
}

/// Toggle Bookmark on an article.
pub async fn toggle_article_bookmark(
    State(store): State<DynStore>,
    Extension(session): Extension<Session>,
    Path(article_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = session.client_id()?;
    let state = reactions::toggle_article_reaction(
        &*store,
        &article_id,
        session_id,
        ArticleReaction::Bookmark,
    )
    .await?;

    Ok(Json(state))
}

/// Count a share of an article. Works without a session.
pub async fn share_article(
    State(store): State<DynStore>,
    Extension(session): Extension<Session>,
    Path(article_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = session.client_id().ok();
    let state = reactions::record_share(&*store, &article_id, session_id).await?;

    Ok(Json(state))
}
