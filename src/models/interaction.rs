use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-session toggles a reader can hold on an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleReaction {
    Like,
    Bookmark,
}

impl ArticleReaction {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleReaction::Like => "like",
            ArticleReaction::Bookmark => "bookmark",
        }
    }
}

impl fmt::Display for ArticleReaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denormalized article counters that reactions mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleCounter {
    Likes,
    Bookmarks,
    Shares,
    Comments,
}

impl ArticleCounter {
    pub fn column(self) -> &'static str {
        match self {
            ArticleCounter::Likes => "likes",
            ArticleCounter::Bookmarks => "bookmarks",
            ArticleCounter::Shares => "shares",
            ArticleCounter::Comments => "comments_count",
        }
    }
}

impl From<ArticleReaction> for ArticleCounter {
    fn from(reaction: ArticleReaction) -> Self {
        match reaction {
            ArticleReaction::Like => ArticleCounter::Likes,
            ArticleReaction::Bookmark => ArticleCounter::Bookmarks,
        }
    }
}

/// Article counters plus the requesting session's flags, returned by toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleReactionState {
    pub article_id: String,
    pub likes: i64,
    pub bookmarks: i64,
    pub shares: i64,
    pub liked: bool,
    pub bookmarked: bool,
}
