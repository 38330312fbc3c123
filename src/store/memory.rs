// src/store/memory.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{SessionReactions, Store};
use crate::{
    error::AppError,
    models::{
        article::{Article, ArticleListParams, CategoryStat, UNCATEGORIZED, UpdateArticleRequest},
        comment::{Comment, ReactionKind},
        interaction::{ArticleCounter, ArticleReaction},
    },
};

#[derive(Default)]
struct Tables {
    articles: HashMap<String, Article>,
    comments: HashMap<String, Comment>,
    article_reactions: HashSet<(String, String, ArticleReaction)>,
    comment_reactions: HashSet<(String, String, ReactionKind)>,
}

/// Process-local store used for tests and for running without a database.
/// Data lives as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slug_taken(tables: &Tables, slug: &str, except_id: Option<&str>) -> bool {
    tables
        .articles
        .values()
        .any(|a| a.slug == slug && Some(a.id.as_str()) != except_id)
}

fn counter_mut(article: &mut Article, counter: ArticleCounter) -> &mut i64 {
    match counter {
        ArticleCounter::Likes => &mut article.likes,
        ArticleCounter::Bookmarks => &mut article.bookmarks,
        ArticleCounter::Shares => &mut article.shares,
        ArticleCounter::Comments => &mut article.comments_count,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_articles(&self, params: &ArticleListParams) -> Result<Vec<Article>, AppError> {
        let tables = self.tables.read().await;
        let keyword = params.q.as_ref().map(|q| q.to_lowercase());

        let mut articles: Vec<Article> = tables
            .articles
            .values()
            .filter(|a| {
                params
                    .category
                    .as_ref()
                    .is_none_or(|c| a.category.as_ref() == Some(c))
            })
            .filter(|a| params.featured.is_none_or(|f| a.is_featured == f))
            .filter(|a| params.published.is_none_or(|p| a.published == p))
            .filter(|a| {
                keyword
                    .as_ref()
                    .is_none_or(|k| a.title.to_lowercase().contains(k))
            })
            .filter(|a| params.cursor.is_none_or(|cursor| a.created_at < cursor))
            .cloned()
            .collect();

        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        articles.truncate(params.effective_limit() as usize);

        Ok(articles)
    }

    async fn find_article(&self, key: &str) -> Result<Option<Article>, AppError> {
        let tables = self.tables.read().await;
        if let Some(article) = tables.articles.get(key) {
            return Ok(Some(article.clone()));
        }
        Ok(tables.articles.values().find(|a| a.slug == key).cloned())
    }

    async fn insert_article(&self, article: &Article) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.articles.contains_key(&article.id) {
            return Err(AppError::Conflict(format!(
                "Article '{}' already exists",
                article.id
            )));
        }
        if slug_taken(&tables, &article.slug, None) {
            return Err(AppError::Conflict(format!(
                "Slug '{}' already exists",
                article.slug
            )));
        }
        tables.articles.insert(article.id.clone(), article.clone());
        Ok(())
    }

    async fn update_article(
        &self,
        id: &str,
        changes: &UpdateArticleRequest,
    ) -> Result<Option<Article>, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(slug) = &changes.slug {
            if slug_taken(&tables, slug, Some(id)) {
                return Err(AppError::Conflict(format!("Slug '{}' already exists", slug)));
            }
        }

        let Some(article) = tables.articles.get_mut(id) else {
            return Ok(None);
        };
        changes.apply_to(article);
        article.updated_at = Utc::now();

        Ok(Some(article.clone()))
    }

    async fn delete_article(&self, id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.articles.remove(id).is_none() {
            return Ok(false);
        }

        let removed: HashSet<String> = tables
            .comments
            .values()
            .filter(|c| c.article_id == id)
            .map(|c| c.id.clone())
            .collect();
        tables.comments.retain(|cid, _| !removed.contains(cid));
        tables
            .comment_reactions
            .retain(|(cid, _, _)| !removed.contains(cid));
        tables.article_reactions.retain(|(aid, _, _)| aid != id);

        Ok(true)
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStat>, AppError> {
        let tables = self.tables.read().await;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for article in tables.articles.values() {
            let category = article
                .category
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            *counts.entry(category).or_default() += 1;
        }

        let mut stats: Vec<CategoryStat> = counts
            .into_iter()
            .map(|(category, count)| CategoryStat { category, count })
            .collect();
        stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

        Ok(stats)
    }

    async fn has_article_reaction(
        &self,
        article_id: &str,
        session_id: &str,
        reaction: ArticleReaction,
    ) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.article_reactions.contains(&(
            article_id.to_string(),
            session_id.to_string(),
            reaction,
        )))
    }

    async fn insert_article_reaction(
        &self,
        article_id: &str,
        session_id: &str,
        reaction: ArticleReaction,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables
            .article_reactions
            .insert((article_id.to_string(), session_id.to_string(), reaction));
        Ok(())
    }

    async fn delete_article_reaction(
        &self,
        article_id: &str,
        session_id: &str,
        reaction: ArticleReaction,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables
            .article_reactions
            .remove(&(article_id.to_string(), session_id.to_string(), reaction));
        Ok(())
    }

    async fn adjust_article_counter(
        &self,
        article_id: &str,
        counter: ArticleCounter,
        delta: i64,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if let Some(article) = tables.articles.get_mut(article_id) {
            let value = counter_mut(article, counter);
            *value = (*value + delta).max(0);
        }
        Ok(())
    }

    async fn list_comments(&self, article_id: &str) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn find_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.get(id).cloned())
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.comments.contains_key(&comment.id) {
            return Err(AppError::Conflict(format!(
                "Comment '{}' already exists",
                comment.id
            )));
        }
        tables.comments.insert(comment.id.clone(), comment.clone());
        if let Some(article) = tables.articles.get_mut(&comment.article_id) {
            *counter_mut(article, ArticleCounter::Comments) += 1;
        }
        Ok(())
    }

    async fn session_reactions(
        &self,
        article_id: &str,
        session_id: &str,
    ) -> Result<SessionReactions, AppError> {
        let tables = self.tables.read().await;
        let mut reactions = SessionReactions::default();
        for (comment_id, session, kind) in &tables.comment_reactions {
            if session != session_id {
                continue;
            }
            let on_article = tables
                .comments
                .get(comment_id)
                .is_some_and(|c| c.article_id == article_id);
            if !on_article {
                continue;
            }
            match kind {
                ReactionKind::Like => reactions.liked.insert(comment_id.clone()),
                ReactionKind::Dislike => reactions.disliked.insert(comment_id.clone()),
            };
        }
        Ok(reactions)
    }

    async fn comment_reactions(
        &self,
        comment_id: &str,
        session_id: &str,
    ) -> Result<Vec<ReactionKind>, AppError> {
        let tables = self.tables.read().await;
        Ok([ReactionKind::Like, ReactionKind::Dislike]
            .into_iter()
            .filter(|kind| {
                tables.comment_reactions.contains(&(
                    comment_id.to_string(),
                    session_id.to_string(),
                    *kind,
                ))
            })
            .collect())
    }

    async fn insert_comment_reaction(
        &self,
        comment_id: &str,
        session_id: &str,
        kind: ReactionKind,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables
            .comment_reactions
            .insert((comment_id.to_string(), session_id.to_string(), kind));
        Ok(())
    }

    async fn delete_comment_reaction(
        &self,
        comment_id: &str,
        session_id: &str,
        kind: ReactionKind,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables
            .comment_reactions
            .remove(&(comment_id.to_string(), session_id.to_string(), kind));
        Ok(())
    }

    async fn adjust_comment_counter(
        &self,
        comment_id: &str,
        kind: ReactionKind,
        delta: i64,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if let Some(comment) = tables.comments.get_mut(comment_id) {
            let value = match kind {
                ReactionKind::Like => &mut comment.likes,
                ReactionKind::Dislike => &mut comment.dislikes,
            };
            *value = (*value + delta).max(0);
        }
        Ok(())
    }
}
