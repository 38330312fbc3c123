// src/services/threads.rs

use crate::{
    error::AppError,
    models::comment::CommentThread,
    store::Store,
    utils::thread::assemble_thread,
};

/// Loads every comment of an article and nests them for the given session.
pub async fn load_thread(
    store: &dyn Store,
    article_key: &str,
    session_id: &str,
) -> Result<CommentThread, AppError> {
    let article = store
        .find_article(article_key)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    let comments = store.list_comments(&article.id).await?;
    let reactions = store.session_reactions(&article.id, session_id).await?;

    let total = comments.len();
    let comments = assemble_thread(comments, &reactions.liked, &reactions.disliked);

    Ok(CommentThread {
        article_id: article.id,
        total,
        comments,
    })
}
