// src/services/reactions.rs

use crate::{
    error::AppError,
    models::{
        comment::{CommentReactionState, ReactionKind},
        interaction::{ArticleCounter, ArticleReaction, ArticleReactionState},
    },
    store::Store,
};

/// Toggles a session's like or dislike on a comment.
///
/// * Holding `kind` already: the reaction is removed.
/// * Holding the opposite: the opposite is removed and `kind` is added.
/// * Holding neither: `kind` is added.
///
/// Each change moves the matching counter by one (never below zero). The
/// steps are separate store calls without a transaction, so two concurrent
/// toggles on one comment can lose an update.
pub async fn toggle_comment_reaction(
    store: &dyn Store,
    comment_id: &str,
    session_id: &str,
    kind: ReactionKind,
) -> Result<CommentReactionState, AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::missing_session());
    }

    store
        .find_comment(comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    let held = store.comment_reactions(comment_id, session_id).await?;

    if held.contains(&kind) {
        // Toggle off. A corrupt row of the opposite kind goes too.
        for existing in held {
            remove_comment_reaction(store, comment_id, session_id, existing).await?;
        }
    } else {
        for existing in held {
            remove_comment_reaction(store, comment_id, session_id, existing).await?;
        }
        store
            .insert_comment_reaction(comment_id, session_id, kind)
            .await?;
        store.adjust_comment_counter(comment_id, kind, 1).await?;
    }

    let comment = store
        .find_comment(comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;
    let now_held = store.comment_reactions(comment_id, session_id).await?;

    tracing::info!(comment_id, %kind, "comment reaction toggled");

    Ok(CommentReactionState {
        comment_id: comment.id,
        likes: comment.likes,
        dislikes: comment.dislikes,
        liked: now_held.contains(&ReactionKind::Like),
        disliked: now_held.contains(&ReactionKind::Dislike),
    })
}

async fn remove_comment_reaction(
    store: &dyn Store,
    comment_id: &str,
    session_id: &str,
    kind: ReactionKind,
) -> Result<(), AppError> {
    store
        .delete_comment_reaction(comment_id, session_id, kind)
        .await?;
    store.adjust_comment_counter(comment_id, kind, -1).await
}

/// Toggles a session's like or bookmark on an article. The two are independent.
pub async fn toggle_article_reaction(
    store: &dyn Store,
    article_id: &str,
    session_id: &str,
    reaction: ArticleReaction,
) -> Result<ArticleReactionState, AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::missing_session());
    }

    let article = store
        .find_article(article_id)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    let counter = ArticleCounter::from(reaction);
    if store
        .has_article_reaction(&article.id, session_id, reaction)
        .await?
    {
        store
            .delete_article_reaction(&article.id, session_id, reaction)
            .await?;
        store.adjust_article_counter(&article.id, counter, -1).await?;
    } else {
        store
            .insert_article_reaction(&article.id, session_id, reaction)
            .await?;
        store.adjust_article_counter(&article.id, counter, 1).await?;
    }

    tracing::info!(article_id = %article.id, %reaction, "article reaction toggled");

    article_state(store, &article.id, Some(session_id)).await
}

/// Counts one share of an article. Shares are not tied to a session.
pub async fn record_share(
    store: &dyn Store,
    article_id: &str,
    session_id: Option<&str>,
) -> Result<ArticleReactionState, AppError> {
    let article = store
        .find_article(article_id)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    store
        .adjust_article_counter(&article.id, ArticleCounter::Shares, 1)
        .await?;

    article_state(store, &article.id, session_id).await
}

async fn article_state(
    store: &dyn Store,
    article_id: &str,
    session_id: Option<&str>,
) -> Result<ArticleReactionState, AppError> {
    let article = store
        .find_article(article_id)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    let (liked, bookmarked) = match session_id {
        Some(session_id) => (
            store
                .has_article_reaction(article_id, session_id, ArticleReaction::Like)
                .await?,
            store
                .has_article_reaction(article_id, session_id, ArticleReaction::Bookmark)
                .await?,
        ),
        None => (false, false),
    };

    Ok(ArticleReactionState {
        article_id: article.id,
        likes: article.likes,
        bookmarks: article.bookmarks,
        shares: article.shares,
        liked,
        bookmarked,
    })
}
