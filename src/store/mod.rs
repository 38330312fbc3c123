// src/store/mod.rs

//! Data store boundary.
//!
//! Handlers and services only talk to [`Store`]; the concrete backend is
//! chosen once at startup and injected through `AppState`.

pub mod memory;
pub mod postgres;

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        article::{Article, ArticleListParams, CategoryStat, UpdateArticleRequest},
        comment::{Comment, ReactionKind},
        interaction::{ArticleCounter, ArticleReaction},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle to the configured store.
pub type DynStore = Arc<dyn Store>;

/// Comments a session currently likes or dislikes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReactions {
    pub liked: HashSet<String>,
    pub disliked: HashSet<String>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Articles

    async fn list_articles(&self, params: &ArticleListParams) -> Result<Vec<Article>, AppError>;

    /// Looks an article up by id or slug.
    async fn find_article(&self, key: &str) -> Result<Option<Article>, AppError>;

    /// Fails with `Conflict` when the id or slug is taken.
    async fn insert_article(&self, article: &Article) -> Result<(), AppError>;

    async fn update_article(
        &self,
        id: &str,
        changes: &UpdateArticleRequest,
    ) -> Result<Option<Article>, AppError>;

    /// Removes the article with its comments and every reaction record. Returns false when absent.
    async fn delete_article(&self, id: &str) -> Result<bool, AppError>;

    async fn category_stats(&self) -> Result<Vec<CategoryStat>, AppError>;

    async fn has_article_reaction(
        &self,
        article_id: &str,
        session_id: &str,
        reaction: ArticleReaction,
    ) -> Result<bool, AppError>;

    async fn insert_article_reaction(
        &self,
        article_id: &str,
        session_id: &str,
        reaction: ArticleReaction,
    ) -> Result<(), AppError>;

    async fn delete_article_reaction(
        &self,
        article_id: &str,
        session_id: &str,
        reaction: ArticleReaction,
    ) -> Result<(), AppError>;

    /// Adds `delta` to a counter, flooring at zero.
    async fn adjust_article_counter(
        &self,
        article_id: &str,
        counter: ArticleCounter,
        delta: i64,
    ) -> Result<(), AppError>;

    // Comments

    async fn list_comments(&self, article_id: &str) -> Result<Vec<Comment>, AppError>;

    async fn find_comment(&self, id: &str) -> Result<Option<Comment>, AppError>;

    /// Stores the comment and bumps the owning article's comment counter.
    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError>;

    /// The session's reactions on comments of one article.
    async fn session_reactions(
        &self,
        article_id: &str,
        session_id: &str,
    ) -> Result<SessionReactions, AppError>;

    /// Reaction kinds the session holds on a comment. At most one unless the data is corrupt.
    async fn comment_reactions(
        &self,
        comment_id: &str,
        session_id: &str,
    ) -> Result<Vec<ReactionKind>, AppError>;

    async fn insert_comment_reaction(
        &self,
        comment_id: &str,
        session_id: &str,
        kind: ReactionKind,
    ) -> Result<(), AppError>;

    async fn delete_comment_reaction(
        &self,
        comment_id: &str,
        session_id: &str,
        kind: ReactionKind,
    ) -> Result<(), AppError>;

    /// Adds `delta` to the like or dislike counter, flooring at zero.
    async fn adjust_comment_counter(
        &self,
        comment_id: &str,
        kind: ReactionKind,
        delta: i64,
    ) -> Result<(), AppError>;
}
