// tests/api_tests.rs

use newsroom::{config::Config, routes, state::AppState, store::MemoryStore};
use serde_json::{Value, json};

const SESSION: &str = "x-session-id";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // 1. In-memory store, no database needed
    let config = Config {
        rust_log: "error".to_string(),
        ..Config::default()
    };
    let state = AppState::new(MemoryStore::new(), config);

    // 2. Create the router with the app state
    let app = routes::create_router(state);

    // 3. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 4. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn create_article(client: &reqwest::Client, address: &str, title: &str, category: &str) -> Value {
    let response = client
        .post(&format!("{}/api/articles", address))
        .json(&json!({
            "title": title,
            "content": "<p>Body</p><script>alert(1)</script>",
            "category": category,
            "tags": ["anime"]
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    response.json().await.unwrap()
}

async fn post_comment(
    client: &reqwest::Client,
    address: &str,
    article_id: &str,
    content: &str,
    parent_id: Option<&str>,
) -> reqwest::Response {
    client
        .post(&format!("{}/api/comments", address))
        .json(&json!({
            "article_id": article_id,
            "content": content,
            "parent_id": parent_id,
        }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn health_check_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn article_crud_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Create: slug derived, script stripped
    let article = create_article(&client, &address, "Hello, World!", "east").await;
    let id = article["id"].as_str().unwrap().to_string();
    assert_eq!(article["slug"], "hello-world");
    assert!(!article["content"].as_str().unwrap().contains("script"));
    assert_eq!(article["published"], false);

    // Read by id and by slug
    for key in [id.as_str(), "hello-world"] {
        let response = client
            .get(&format!("{}/api/articles/{}", address, key))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let fetched: Value = response.json().await.unwrap();
        assert_eq!(fetched["id"], id.as_str());
    }

    // Partial update
    let response = client
        .patch(&format!("{}/api/articles/{}", address, id))
        .json(&json!({ "title": "Renamed", "is_featured": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["is_featured"], true);
    assert_eq!(updated["slug"], "hello-world");
    assert_eq!(updated["category"], "east");

    // Publish
    let response = client
        .patch(&format!("{}/api/articles/{}/publish", address, id))
        .send()
        .await
        .unwrap();
    let published: Value = response.json().await.unwrap();
    assert_eq!(published["published"], true);

    // Delete
    let response = client
        .delete(&format!("{}/api/articles/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .get(&format!("{}/api/articles/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn non_ascii_title_gets_a_readable_slug() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let article = create_article(&client, &address, "進撃の巨人 レビュー", "east").await;

    // Assert: the slug keeps the script and resolves back to the article
    assert_eq!(article["slug"], "進撃の巨人-レビュー");
    let response = client
        .get(&format!("{}/api/articles/{}", address, "進撃の巨人-レビュー"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["id"], article["id"]);
}

#[tokio::test]
async fn update_sanitises_like_create() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let article = create_article(&client, &address, "Patch me", "east").await;
    let id = article["id"].as_str().unwrap();

    // Act
    let response = client
        .patch(&format!("{}/api/articles/{}", address, id))
        .json(&json!({
            "author": "<script>x</script>Bob",
            "excerpt": "  <b>Short</b> intro  ",
            "category": "  west  "
        }))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["author"], "Bob");
    assert_eq!(updated["excerpt"], "<b>Short</b> intro");
    assert_eq!(updated["category"], "west");

    // A blank category is rejected rather than stored
    let response = client
        .patch(&format!("{}/api/articles/{}", address, id))
        .json(&json!({ "category": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn create_article_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: empty title and a relative image URL
    let response = client
        .post(&format!("{}/api/articles", address))
        .json(&json!({
            "title": "",
            "content": "Body",
            "image": "not-a-url"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_slug_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    create_article(&client, &address, "Same Title", "east").await;

    let response = client
        .post(&format!("{}/api/articles", address))
        .json(&json!({ "title": "Same title", "content": "Other body" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn list_filters_and_category_stats() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    create_article(&client, &address, "East one", "east").await;
    create_article(&client, &address, "East two", "east").await;
    create_article(&client, &address, "West one", "west").await;

    // Act
    let east: Vec<Value> = client
        .get(&format!("{}/api/articles?category=east", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let searched: Vec<Value> = client
        .get(&format!("{}/api/articles?q=WEST", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stats: Vec<Value> = client
        .get(&format!("{}/api/categories/stats", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(east.len(), 2);
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0]["title"], "West one");
    assert_eq!(
        stats,
        vec![
            json!({ "category": "east", "count": 2 }),
            json!({ "category": "west", "count": 1 }),
        ]
    );
}

#[tokio::test]
async fn threaded_comments_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let article = create_article(&client, &address, "Thread host", "east").await;
    let article_id = article["id"].as_str().unwrap();

    let root: Value = post_comment(&client, &address, article_id, "First!", None)
        .await
        .json()
        .await
        .unwrap();
    let root_id = root["id"].as_str().unwrap();
    assert_eq!(root["author"], "Anonymous");

    let reply = post_comment(&client, &address, article_id, "Reply", Some(root_id)).await;
    assert_eq!(reply.status().as_u16(), 201);

    // Act
    let response = client
        .get(&format!("{}/api/comments?article_id={}", address, article_id))
        .send()
        .await
        .unwrap();

    // Assert: a session id is issued because none was sent
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().get(SESSION).is_some());
    let thread: Value = response.json().await.unwrap();
    assert_eq!(thread["total"], 2);
    let comments = thread["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["id"], root_id);
    assert_eq!(comments[0]["reply_count"], 1);
    assert_eq!(comments[0]["replies"][0]["content"], "Reply");
    assert_eq!(comments[0]["liked"], false);

    // Same thread through the article path; comment counter bumped
    let by_path: Value = client
        .get(&format!("{}/api/articles/{}/comments", address, article_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_path["comments"], thread["comments"]);

    let article: Value = client
        .get(&format!("{}/api/articles/{}", address, article_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(article["comments_count"], 2);
}

#[tokio::test]
async fn comment_on_missing_article_or_parent_fails() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let first = create_article(&client, &address, "First host", "east").await;
    let second = create_article(&client, &address, "Second host", "west").await;
    let first_id = first["id"].as_str().unwrap();
    let second_id = second["id"].as_str().unwrap();

    let response = post_comment(&client, &address, "no-such-article", "Hi", None).await;
    assert_eq!(response.status().as_u16(), 404);

    let response = post_comment(&client, &address, first_id, "Hi", Some("no-such-comment")).await;
    assert_eq!(response.status().as_u16(), 404);

    // A reply may not cross articles
    let other: Value = post_comment(&client, &address, second_id, "Elsewhere", None)
        .await
        .json()
        .await
        .unwrap();
    let response = post_comment(
        &client,
        &address,
        first_id,
        "Cross",
        other["id"].as_str(),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);

    let response = post_comment(&client, &address, first_id, "   ", None).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn comment_reaction_toggles_over_http() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let article = create_article(&client, &address, "Reactions", "east").await;
    let article_id = article["id"].as_str().unwrap();
    let comment: Value = post_comment(&client, &address, article_id, "React to me", None)
        .await
        .json()
        .await
        .unwrap();
    let comment_id = comment["id"].as_str().unwrap();

    // Missing session is rejected
    let response = client
        .post(&format!("{}/api/comments/{}/like", address, comment_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Like, then dislike from the same session
    let liked: Value = client
        .post(&format!("{}/api/comments/{}/like", address, comment_id))
        .header(SESSION, "reader-1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(liked["likes"], 1);
    assert_eq!(liked["liked"], true);

    let disliked: Value = client
        .post(&format!("{}/api/comments/{}/dislike", address, comment_id))
        .header("cookie", "theme=dark; session_id=reader-1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(disliked["likes"], 0);
    assert_eq!(disliked["dislikes"], 1);
    assert_eq!(disliked["disliked"], true);
    assert_eq!(disliked["liked"], false);

    // The thread reflects the session's flag
    let thread: Value = client
        .get(&format!("{}/api/comments?article_id={}", address, article_id))
        .header(SESSION, "reader-1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(thread["comments"][0]["disliked"], true);
    assert_eq!(thread["comments"][0]["dislikes"], 1);

    // Unknown comment
    let response = client
        .post(&format!("{}/api/comments/missing/like", address))
        .header(SESSION, "reader-1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn article_interactions_over_http() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let article = create_article(&client, &address, "Interactions", "west").await;
    let article_id = article["id"].as_str().unwrap();

    let liked: Value = client
        .post(&format!("{}/api/articles/{}/like", address, article_id))
        .header(SESSION, "reader-2")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(liked["likes"], 1);
    assert_eq!(liked["liked"], true);

    let bookmarked: Value = client
        .post(&format!("{}/api/articles/{}/bookmark", address, article_id))
        .header(SESSION, "reader-2")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bookmarked["bookmarks"], 1);
    assert_eq!(bookmarked["liked"], true);

    let shared: Value = client
        .post(&format!("{}/api/articles/{}/share", address, article_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(shared["shares"], 1);

    let response = client
        .post(&format!("{}/api/articles/{}/bookmark", address, article_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn deleting_an_article_removes_its_comments() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let article = create_article(&client, &address, "Short lived", "east").await;
    let article_id = article["id"].as_str().unwrap();
    let comment: Value = post_comment(&client, &address, article_id, "Soon gone", None)
        .await
        .json()
        .await
        .unwrap();
    let comment_id = comment["id"].as_str().unwrap();

    client
        .delete(&format!("{}/api/articles/{}", address, article_id))
        .send()
        .await
        .unwrap();

    let response = client
        .post(&format!("{}/api/comments/{}/like", address, comment_id))
        .header(SESSION, "reader-3")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .get(&format!("{}/api/comments?article_id={}", address, article_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
