// src/handlers/article.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::article::{Article, ArticleListParams, CreateArticleRequest, UpdateArticleRequest},
    store::DynStore,
    utils::{html::clean_text, slug::slugify},
};

/// List articles (Recent first).
/// Supports category / featured / published / title filters and cursor-based pagination.
pub async fn list_articles(
    State(store): State<DynStore>,
    Query(params): Query<ArticleListParams>,
) -> Result<impl IntoResponse, AppError> {
    let articles = store.list_articles(&params).await?;

    Ok(Json(articles))
}

/// Get a single article by ID or slug.
pub async fn get_article(
    State(store): State<DynStore>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let article = store
        .find_article(&key)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    Ok(Json(article))
}

/// Create a new article.
pub async fn create_article(
    State(store): State<DynStore>,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // 2. Normalize fields
    let slug = slugify(payload.slug.as_deref().unwrap_or(&payload.title)).ok_or(
        AppError::BadRequest("Could not derive a slug from the title".to_string()),
    )?;
    let content = clean_text(&payload.content)
        .ok_or(AppError::BadRequest("Content must not be empty".to_string()))?;

    let now = Utc::now();
    let article = Article {
        id: Uuid::new_v4().to_string(),
        slug,
        title: payload.title.trim().to_string(),
        content,
        excerpt: payload.excerpt.as_deref().and_then(clean_text),
        image: payload.image,
        category: payload
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        tags: payload.tags.iter().map(|t| t.trim().to_string()).collect(),
        author: payload.author.as_deref().and_then(clean_text),
        is_featured: payload.is_featured,
        published: payload.published,
        likes: 0,
        bookmarks: 0,
        shares: 0,
        comments_count: 0,
        created_at: now,
        updated_at: now,
    };

    // 3. Insert Article
    store.insert_article(&article).await?;
    tracing::info!(article_id = %article.id, slug = %article.slug, "article created");

    Ok((StatusCode::CREATED, Json(article)))
}

/// Partially update an article. Only supplied fields change.
pub async fn update_article(
    State(store): State<DynStore>,
    Path(key): Path<String>,
    Json(mut payload): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if let Some(slug) = payload.slug.take() {
        let slug = slugify(&slug)
            .ok_or(AppError::BadRequest("Slug must contain letters or digits".to_string()))?;
        payload.slug = Some(slug);
    }
    if let Some(content) = payload.content.take() {
        let content = clean_text(&content)
            .ok_or(AppError::BadRequest("Content must not be empty".to_string()))?;
        payload.content = Some(content);
    }
    if let Some(category) = payload.category.take() {
        let category = category.trim();
        if category.is_empty() {
            return Err(AppError::BadRequest("Category must not be empty".to_string()));
        }
        payload.category = Some(category.to_string());
    }
    payload.title = payload.title.map(|t| t.trim().to_string());
    payload.excerpt = payload.excerpt.as_deref().and_then(clean_text);
    payload.author = payload.author.as_deref().and_then(clean_text);
    payload.tags = payload
        .tags
        .map(|tags| tags.iter().map(|t| t.trim().to_string()).collect());

    apply_update(&store, &key, &payload).await.map(Json)
}

/// Mark an article as published.
pub async fn publish_article(
    State(store): State<DynStore>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let changes = UpdateArticleRequest {
        published: Some(true),
        ..Default::default()
    };

    apply_update(&store, &key, &changes).await.map(Json)
}

/// Hide an article again.
pub async fn unpublish_article(
    State(store): State<DynStore>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let changes = UpdateArticleRequest {
        published: Some(false),
        ..Default::default()
    };

    apply_update(&store, &key, &changes).await.map(Json)
}

async fn apply_update(
    store: &DynStore,
    key: &str,
    changes: &UpdateArticleRequest,
) -> Result<Article, AppError> {
    let existing = store
        .find_article(key)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    store
        .update_article(&existing.id, changes)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))
}

/// Delete an article together with its comments and reactions.
pub async fn delete_article(
    State(store): State<DynStore>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let existing = store
        .find_article(&key)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    if !store.delete_article(&existing.id).await? {
        return Err(AppError::NotFound("Article not found".to_string()));
    }
    tracing::info!(article_id = %existing.id, "article deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Article counts per category, largest first.
pub async fn category_stats(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let stats = store.category_stats().await?;

    Ok(Json(stats))
}
