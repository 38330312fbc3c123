// src/store/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use super::{SessionReactions, Store};
use crate::{
    config::Config,
    error::AppError,
    models::{
        article::{Article, ArticleListParams, CategoryStat, UNCATEGORIZED, UpdateArticleRequest},
        comment::{Comment, ReactionKind},
        interaction::{ArticleCounter, ArticleReaction},
    },
};

const CONNECT_RETRIES: u32 = 5;

/// Store backed by a Postgres database through a shared `PgPool`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with retry, then applies the embedded migrations.
    pub async fn connect(database_url: &str, config: &Config) -> Result<Self, AppError> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count > CONNECT_RETRIES {
                        return Err(AppError::InternalServerError(format!(
                            "Failed to connect to database after {} retries: {}",
                            CONNECT_RETRIES, e
                        )));
                    }
                    tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };

        tracing::info!("Database connected...");

        tracing::info!("Running migrations...");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        tracing::info!("Migrations applied successfully.");

        Ok(Self::new(pool))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// Name of the unique constraint a violation tripped, if any.
fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    err.as_database_error()
        .filter(|db_err| db_err.is_unique_violation())
        .and_then(|db_err| db_err.constraint())
}

#[async_trait]
impl Store for PgStore {
    async fn list_articles(&self, params: &ArticleListParams) -> Result<Vec<Article>, AppError> {
        let search_pattern = params.q.as_ref().map(|k| format!("%{}%", k));

        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT *
            FROM articles
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND ($2::BOOLEAN IS NULL OR is_featured = $2)
              AND ($3::BOOLEAN IS NULL OR published = $3)
              AND ($4::TEXT IS NULL OR title ILIKE $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at < $5)
            ORDER BY created_at DESC, id ASC
            LIMIT $6
            "#,
        )
        .bind(&params.category)
        .bind(params.featured)
        .bind(params.published)
        .bind(search_pattern)
        .bind(params.cursor)
        .bind(params.effective_limit())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list articles: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(articles)
    }

    async fn find_article(&self, key: &str) -> Result<Option<Article>, AppError> {
        let article = sqlx::query_as::<_, Article>(
            "SELECT * FROM articles WHERE id = $1 OR slug = $1 ORDER BY (id = $1) DESC LIMIT 1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    async fn insert_article(&self, article: &Article) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO articles (
                id, slug, title, content, excerpt, image, category, tags, author,
                is_featured, published, likes, bookmarks, shares, comments_count,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(&article.id)
        .bind(&article.slug)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.excerpt)
        .bind(&article.image)
        .bind(&article.category)
        .bind(&article.tags)
        .bind(&article.author)
        .bind(article.is_featured)
        .bind(article.published)
        .bind(article.likes)
        .bind(article.bookmarks)
        .bind(article.shares)
        .bind(article.comments_count)
        .bind(article.created_at)
        .bind(article.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some("articles_pkey") {
                AppError::Conflict(format!("Article '{}' already exists", article.id))
            } else if is_unique_violation(&e) {
                AppError::Conflict(format!("Slug '{}' already exists", article.slug))
            } else {
                tracing::error!("Failed to create article: {:?}", e);
                AppError::InternalServerError(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn update_article(
        &self,
        id: &str,
        changes: &UpdateArticleRequest,
    ) -> Result<Option<Article>, AppError> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                content = COALESCE($4, content),
                excerpt = COALESCE($5, excerpt),
                image = COALESCE($6, image),
                category = COALESCE($7, category),
                tags = COALESCE($8, tags),
                author = COALESCE($9, author),
                is_featured = COALESCE($10, is_featured),
                published = COALESCE($11, published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.content)
        .bind(&changes.excerpt)
        .bind(&changes.image)
        .bind(&changes.category)
        .bind(&changes.tags)
        .bind(&changes.author)
        .bind(changes.is_featured)
        .bind(changes.published)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Slug already exists".to_string())
            } else {
                tracing::error!("Failed to update article: {:?}", e);
                AppError::InternalServerError(e.to_string())
            }
        })?;

        Ok(article)
    }

    async fn delete_article(&self, id: &str) -> Result<bool, AppError> {
        // comments and reaction rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete article: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStat>, AppError> {
        let stats = sqlx::query_as::<_, CategoryStat>(
            r#"
            SELECT COALESCE(category, $1) AS category, COUNT(*) AS count
            FROM articles
            GROUP BY 1
            ORDER BY count DESC, category ASC
            "#,
        )
        .bind(UNCATEGORIZED)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn has_article_reaction(
        &self,
        article_id: &str,
        session_id: &str,
        reaction: ArticleReaction,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM article_reactions
                WHERE article_id = $1 AND session_id = $2 AND kind = $3
            )
            "#,
        )
        .bind(article_id)
        .bind(session_id)
        .bind(reaction.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_article_reaction(
        &self,
        article_id: &str,
        session_id: &str,
        reaction: ArticleReaction,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO article_reactions (article_id, session_id, kind)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(session_id)
        .bind(reaction.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_article_reaction(
        &self,
        article_id: &str,
        session_id: &str,
        reaction: ArticleReaction,
    ) -> Result<(), AppError> {
        sqlx::query(
            "DELETE FROM article_reactions WHERE article_id = $1 AND session_id = $2 AND kind = $3",
        )
        .bind(article_id)
        .bind(session_id)
        .bind(reaction.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn adjust_article_counter(
        &self,
        article_id: &str,
        counter: ArticleCounter,
        delta: i64,
    ) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE articles SET {col} = GREATEST(0, {col} + $2) WHERE id = $1",
            col = counter.column()
        );
        sqlx::query(&sql)
            .bind(article_id)
            .bind(delta)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_comments(&self, article_id: &str) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, article_id, content, author, parent_id, created_at, likes, dislikes
            FROM comments
            WHERE article_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn find_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, article_id, content, author, parent_id, created_at, likes, dislikes
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO comments (id, article_id, content, author, parent_id, created_at, likes, dislikes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.article_id)
        .bind(&comment.content)
        .bind(&comment.author)
        .bind(&comment.parent_id)
        .bind(comment.created_at)
        .bind(comment.likes)
        .bind(comment.dislikes)
        .execute(&mut *tx)
        .await?;

        let bump = format!(
            "UPDATE articles SET {col} = {col} + 1 WHERE id = $1",
            col = ArticleCounter::Comments.column()
        );
        sqlx::query(&bump)
            .bind(&comment.article_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn session_reactions(
        &self,
        article_id: &str,
        session_id: &str,
    ) -> Result<SessionReactions, AppError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT r.comment_id, r.kind
            FROM comment_reactions r
            JOIN comments c ON c.id = r.comment_id
            WHERE c.article_id = $1 AND r.session_id = $2
            "#,
        )
        .bind(article_id)
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let mut reactions = SessionReactions::default();
        for (comment_id, kind) in rows {
            match kind.parse::<ReactionKind>() {
                Ok(ReactionKind::Like) => {
                    reactions.liked.insert(comment_id);
                }
                Ok(ReactionKind::Dislike) => {
                    reactions.disliked.insert(comment_id);
                }
                Err(e) => tracing::warn!("Skipping reaction row: {}", e),
            }
        }

        Ok(reactions)
    }

    async fn comment_reactions(
        &self,
        comment_id: &str,
        session_id: &str,
    ) -> Result<Vec<ReactionKind>, AppError> {
        let kinds = sqlx::query_scalar::<_, String>(
            "SELECT kind FROM comment_reactions WHERE comment_id = $1 AND session_id = $2",
        )
        .bind(comment_id)
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(kinds
            .iter()
            .filter_map(|kind| kind.parse::<ReactionKind>().ok())
            .collect())
    }

    async fn insert_comment_reaction(
        &self,
        comment_id: &str,
        session_id: &str,
        kind: ReactionKind,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO comment_reactions (comment_id, session_id, kind)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(comment_id)
        .bind(session_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_comment_reaction(
        &self,
        comment_id: &str,
        session_id: &str,
        kind: ReactionKind,
    ) -> Result<(), AppError> {
        sqlx::query(
            "DELETE FROM comment_reactions WHERE comment_id = $1 AND session_id = $2 AND kind = $3",
        )
        .bind(comment_id)
        .bind(session_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn adjust_comment_counter(
        &self,
        comment_id: &str,
        kind: ReactionKind,
        delta: i64,
    ) -> Result<(), AppError> {
        let sql = match kind {
            ReactionKind::Like => "UPDATE comments SET likes = GREATEST(0, likes + $2) WHERE id = $1",
            ReactionKind::Dislike => {
                "UPDATE comments SET dislikes = GREATEST(0, dislikes + $2) WHERE id = $1"
            }
        };
        sqlx::query(sql)
            .bind(comment_id)
            .bind(delta)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
