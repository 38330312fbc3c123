use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Display name used when a commenter leaves the author field empty.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub article_id: String,
    pub content: String,
    pub author: String,

    /// The comment this one replies to. `None` for a root comment.
    pub parent_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub likes: i64,
    pub dislikes: i64,
}

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 64, message = "article_id is required"))]
    pub article_id: String,

    #[validate(length(
        min = 1,
        max = 2000,
        message = "Comment must be between 1 and 2000 characters"
    ))]
    pub content: String,

    #[validate(length(max = 50, message = "Author name must be at most 50 characters"))]
    pub author: Option<String>,

    /// Optional: the ID of the comment being replied to.
    pub parent_id: Option<String>,
}

/// Query parameters for `GET /api/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentListParams {
    pub article_id: String,
}

/// A comment with its nested replies and the requesting session's reaction flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentView>,
    /// Number of direct replies, not descendants.
    pub reply_count: usize,
    pub liked: bool,
    pub disliked: bool,
}

impl CommentView {
    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.replies.iter().map(CommentView::node_count).sum::<usize>()
    }
}

/// Response body for comment listings.
#[derive(Debug, Serialize)]
pub struct CommentThread {
    pub article_id: String,
    pub total: usize,
    pub comments: Vec<CommentView>,
}

/// A session's standing reaction to a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl ReactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ReactionKind::Like),
            "dislike" => Ok(ReactionKind::Dislike),
            other => Err(format!("unknown comment reaction '{}'", other)),
        }
    }
}

/// Result of a comment like/dislike toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentReactionState {
    pub comment_id: String,
    pub likes: i64,
    pub dislikes: i64,
    pub liked: bool,
    pub disliked: bool,
}
