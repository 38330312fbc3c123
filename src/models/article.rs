use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Represents the 'articles' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Article {
    pub id: String,

    /// URL-friendly unique key, derived from the title unless supplied.
    pub slug: String,

    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,

    /// URL to the cover image.
    pub image: Option<String>,

    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,

    pub is_featured: bool,
    pub published: bool,

    pub likes: i64,
    pub bookmarks: i64,
    pub shares: i64,
    pub comments_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new article.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(max = 200))]
    pub slug: Option<String>,

    #[validate(length(
        min = 1,
        max = 100000,
        message = "Content length must be between 1 and 100000 chars"
    ))]
    pub content: String,

    #[validate(length(max = 500))]
    pub excerpt: Option<String>,

    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub image: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,

    #[serde(default)]
    #[validate(custom(function = validate_tags))]
    pub tags: Vec<String>,

    #[validate(length(max = 100))]
    pub author: Option<String>,

    #[serde(default)]
    pub is_featured: bool,

    #[serde(default)]
    pub published: bool,
}

/// DTO for updating an article. Only supplied fields change.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 100000))]
    pub content: Option<String>,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub image: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(custom(function = validate_tags))]
    pub tags: Option<Vec<String>>,
    #[validate(length(max = 100))]
    pub author: Option<String>,
    pub is_featured: Option<bool>,
    pub published: Option<bool>,
}

impl UpdateArticleRequest {
    /// Applies the supplied fields onto `article` in place.
    pub fn apply_to(&self, article: &mut Article) {
        if let Some(title) = &self.title {
            article.title = title.clone();
        }
        if let Some(slug) = &self.slug {
            article.slug = slug.clone();
        }
        if let Some(content) = &self.content {
            article.content = content.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            article.excerpt = Some(excerpt.clone());
        }
        if let Some(image) = &self.image {
            article.image = Some(image.clone());
        }
        if let Some(category) = &self.category {
            article.category = Some(category.clone());
        }
        if let Some(tags) = &self.tags {
            article.tags = tags.clone();
        }
        if let Some(author) = &self.author {
            article.author = Some(author.clone());
        }
        if let Some(is_featured) = self.is_featured {
            article.is_featured = is_featured;
        }
        if let Some(published) = self.published {
            article.published = published;
        }
    }
}

/// Query parameters for listing articles.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleListParams {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,

    /// Search keyword for title match.
    pub q: Option<String>,

    /// Cursor for pagination: the created_at timestamp of the last article in the previous page.
    pub cursor: Option<DateTime<Utc>>,

    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,
}

impl ArticleListParams {
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

/// Number of articles per category.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: String,
    pub count: i64,
}

/// Label used in stats for articles without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), validator::ValidationError> {
    if tags.len() > 20 {
        return Err(validator::ValidationError::new("too_many_tags"));
    }
    for tag in tags {
        if tag.trim().is_empty() || tag.len() > 40 {
            return Err(validator::ValidationError::new("invalid_tag"));
        }
    }
    Ok(())
}
