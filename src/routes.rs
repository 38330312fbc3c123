// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{article, comment, health, interaction},
    state::AppState,
    utils::session::{SESSION_HEADER, session_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (articles, comments, categories).
/// * Applies global middleware (Trace, CORS, Session).
/// * Injects global state (store handle and config).
pub fn create_router(state: AppState) -> Router {
    let allow_origin = if state.config.cors_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    let session_header = HeaderName::from_static(SESSION_HEADER);
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, session_header.clone()])
        .expose_headers([session_header]);

    let article_routes = Router::new()
        .route(
            "/",
            get(article::list_articles).post(article::create_article),
        )
        .route(
            "/{id}",
            get(article::get_article)
                .put(article::update_article)
                .patch(article::update_article)
                .delete(article::delete_article),
        )
        .route("/{id}/publish", patch(article::publish_article))
        .route("/{id}/unpublish", patch(article::unpublish_article))
        .route("/{id}/like", post(interaction::toggle_article_like))
        .route("/{id}/bookmark", post(interaction::toggle_article_bookmark))
        .route("/{id}/share", post(interaction::share_article))
        .route("/{id}/comments", get(comment::list_article_comments));

    let comment_routes = Router::new()
        .route(
            "/",
            get(comment::list_comments).post(comment::create_comment),
        )
        .route("/{id}/like", post(interaction::toggle_comment_like))
        .route("/{id}/dislike", post(interaction::toggle_comment_dislike));

    let category_routes = Router::new().route("/stats", get(article::category_stats));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/articles", article_routes)
        .nest("/api/comments", comment_routes)
        .nest("/api/categories", category_routes)
        // Global Middleware (outermost first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn(session_middleware)),
        )
        .with_state(state)
}
