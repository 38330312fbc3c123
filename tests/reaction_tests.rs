// tests/reaction_tests.rs

use chrono::Utc;
use newsroom::{
    error::AppError,
    models::{
        article::Article,
        comment::{Comment, ReactionKind},
        interaction::ArticleReaction,
    },
    services::{reactions, threads},
    store::{MemoryStore, Store},
};

async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let now = Utc::now();

    store
        .insert_article(&Article {
            id: "article-1".to_string(),
            slug: "first-article".to_string(),
            title: "First article".to_string(),
            content: "<p>Hello</p>".to_string(),
            excerpt: None,
            image: None,
            category: Some("east".to_string()),
            tags: vec![],
            author: None,
            is_featured: false,
            published: true,
            likes: 0,
            bookmarks: 0,
            shares: 0,
            comments_count: 0,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

    store
        .insert_comment(&Comment {
            id: "comment-1".to_string(),
            article_id: "article-1".to_string(),
            content: "Nice read".to_string(),
            author: "Anonymous".to_string(),
            parent_id: None,
            created_at: now,
            likes: 0,
            dislikes: 0,
        })
        .await
        .unwrap();

    store
}

#[tokio::test]
async fn like_twice_returns_to_starting_count() {
    // Arrange
    let store = seeded_store().await;

    // Act
    let first = reactions::toggle_comment_reaction(&store, "comment-1", "s1", ReactionKind::Like)
        .await
        .unwrap();
    let second = reactions::toggle_comment_reaction(&store, "comment-1", "s1", ReactionKind::Like)
        .await
        .unwrap();

    // Assert
    assert_eq!(first.likes, 1);
    assert!(first.liked);
    assert_eq!(second.likes, 0);
    assert!(!second.liked && !second.disliked);
    assert!(
        store
            .comment_reactions("comment-1", "s1")
            .await
            .unwrap()
            .is_empty(),
        "no reaction record should remain"
    );
}

#[tokio::test]
async fn dislike_replaces_an_existing_like() {
    // Arrange
    let store = seeded_store().await;
    reactions::toggle_comment_reaction(&store, "comment-1", "s1", ReactionKind::Like)
        .await
        .unwrap();

    // Act
    let state = reactions::toggle_comment_reaction(&store, "comment-1", "s1", ReactionKind::Dislike)
        .await
        .unwrap();

    // Assert
    assert_eq!(state.likes, 0);
    assert_eq!(state.dislikes, 1);
    assert!(!state.liked);
    assert!(state.disliked);
    assert_eq!(
        store.comment_reactions("comment-1", "s1").await.unwrap(),
        vec![ReactionKind::Dislike]
    );
}

#[tokio::test]
async fn like_replaces_an_existing_dislike() {
    // Arrange
    let store = seeded_store().await;
    reactions::toggle_comment_reaction(&store, "comment-1", "s1", ReactionKind::Dislike)
        .await
        .unwrap();

    // Act
    let state = reactions::toggle_comment_reaction(&store, "comment-1", "s1", ReactionKind::Like)
        .await
        .unwrap();

    // Assert
    assert_eq!(state.likes, 1);
    assert_eq!(state.dislikes, 0);
    assert!(state.liked);
    assert!(!state.disliked);
    assert_eq!(
        store.comment_reactions("comment-1", "s1").await.unwrap(),
        vec![ReactionKind::Like]
    );
}

#[tokio::test]
async fn id_and_slug_collisions_are_reported_separately() {
    // Arrange
    let store = seeded_store().await;
    let existing = store.find_article("article-1").await.unwrap().unwrap();

    // Act
    let same_id = Article {
        slug: "another-slug".to_string(),
        ..existing.clone()
    };
    let same_slug = Article {
        id: "article-2".to_string(),
        ..existing
    };
    let id_err = store.insert_article(&same_id).await.unwrap_err();
    let slug_err = store.insert_article(&same_slug).await.unwrap_err();

    // Assert
    match id_err {
        AppError::Conflict(msg) => assert_eq!(msg, "Article 'article-1' already exists"),
        other => panic!("expected conflict, got {:?}", other),
    }
    match slug_err {
        AppError::Conflict(msg) => assert_eq!(msg, "Slug 'first-article' already exists"),
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn comment_insert_bumps_the_article_comment_count() {
    let store = seeded_store().await;

    let article = store.find_article("article-1").await.unwrap().unwrap();

    assert_eq!(article.comments_count, 1);
}

#[tokio::test]
async fn sessions_do_not_share_reactions() {
    // Arrange
    let store = seeded_store().await;

    // Act
    reactions::toggle_comment_reaction(&store, "comment-1", "s1", ReactionKind::Like)
        .await
        .unwrap();
    let state = reactions::toggle_comment_reaction(&store, "comment-1", "s2", ReactionKind::Like)
        .await
        .unwrap();

    // Assert
    assert_eq!(state.likes, 2);
    let thread = threads::load_thread(&store, "article-1", "s3").await.unwrap();
    assert!(!thread.comments[0].liked);
    let thread = threads::load_thread(&store, "article-1", "s1").await.unwrap();
    assert!(thread.comments[0].liked);
}

#[tokio::test]
async fn corrupt_double_reaction_is_cleared_by_a_toggle() {
    // Arrange: both kinds held, as a racing writer could leave it
    let store = seeded_store().await;
    for kind in [ReactionKind::Like, ReactionKind::Dislike] {
        store
            .insert_comment_reaction("comment-1", "s1", kind)
            .await
            .unwrap();
        store
            .adjust_comment_counter("comment-1", kind, 1)
            .await
            .unwrap();
    }

    // Act
    let state = reactions::toggle_comment_reaction(&store, "comment-1", "s1", ReactionKind::Like)
        .await
        .unwrap();

    // Assert
    assert_eq!((state.likes, state.dislikes), (0, 0));
    assert!(!state.liked && !state.disliked);
}

#[tokio::test]
async fn counters_never_go_negative() {
    let store = seeded_store().await;

    store
        .adjust_comment_counter("comment-1", ReactionKind::Dislike, -1)
        .await
        .unwrap();

    let comment = store.find_comment("comment-1").await.unwrap().unwrap();
    assert_eq!(comment.dislikes, 0);
}

#[tokio::test]
async fn unknown_comment_is_not_found() {
    let store = seeded_store().await;

    let result =
        reactions::toggle_comment_reaction(&store, "nope", "s1", ReactionKind::Like).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn blank_session_is_rejected() {
    let store = seeded_store().await;

    let result =
        reactions::toggle_comment_reaction(&store, "comment-1", "  ", ReactionKind::Like).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn article_like_and_bookmark_are_independent_toggles() {
    // Arrange
    let store = seeded_store().await;

    // Act
    let liked = reactions::toggle_article_reaction(&store, "article-1", "s1", ArticleReaction::Like)
        .await
        .unwrap();
    let bookmarked =
        reactions::toggle_article_reaction(&store, "first-article", "s1", ArticleReaction::Bookmark)
            .await
            .unwrap();
    let unliked =
        reactions::toggle_article_reaction(&store, "article-1", "s1", ArticleReaction::Like)
            .await
            .unwrap();

    // Assert
    assert_eq!((liked.likes, liked.bookmarks), (1, 0));
    assert!(liked.liked && !liked.bookmarked);
    assert_eq!((bookmarked.likes, bookmarked.bookmarks), (1, 1));
    assert!(bookmarked.liked && bookmarked.bookmarked);
    assert_eq!((unliked.likes, unliked.bookmarks), (0, 1));
    assert!(!unliked.liked && unliked.bookmarked);
}

#[tokio::test]
async fn shares_accumulate_without_a_session() {
    let store = seeded_store().await;

    reactions::record_share(&store, "article-1", None).await.unwrap();
    let state = reactions::record_share(&store, "article-1", None).await.unwrap();

    assert_eq!(state.shares, 2);
    assert!(!state.liked && !state.bookmarked);
}
