// src/utils/session.rs

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::AppError;

/// Request/response header carrying the session id.
pub const SESSION_HEADER: &str = "x-session-id";
/// Cookie consulted when the header is absent.
pub const SESSION_COOKIE: &str = "session_id";

const MAX_SESSION_ID_LEN: usize = 128;

/// Anonymous reader identity, injected into request extensions by [`session_middleware`].
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    /// True when the client sent no id and the server generated this one.
    pub issued: bool,
}

impl Session {
    /// The id the client supplied. Reactions need one the client can send again,
    /// so a freshly issued id is rejected.
    pub fn client_id(&self) -> Result<&str, AppError> {
        if self.issued {
            return Err(AppError::missing_session());
        }
        Ok(&self.id)
    }
}

/// Reads the session id from the `x-session-id` header, falling back to the `session_id` cookie.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(valid_id);
    if from_header.is_some() {
        return from_header;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| valid_id(value))
}

fn valid_id(raw: &str) -> Option<String> {
    let id = raw.trim();
    if id.is_empty() || id.len() > MAX_SESSION_ID_LEN {
        return None;
    }
    Some(id.to_string())
}

/// Axum Middleware: Session identity.
///
/// Injects a `Session` into the request extensions for handlers to use.
/// When the client sent none, a new UUID is generated and returned in the
/// `x-session-id` response header so the client can adopt it.
pub async fn session_middleware(mut req: Request<Body>, next: Next) -> Response {
    let session = match session_from_headers(req.headers()) {
        Some(id) => Session { id, issued: false },
        None => Session {
            id: Uuid::new_v4().to_string(),
            issued: true,
        },
    };
    let issued_id = session.issued.then(|| session.id.clone());
    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;

    if let Some(id) = issued_id {
        match HeaderValue::from_str(&id) {
            Ok(value) => {
                response.headers_mut().insert(SESSION_HEADER, value);
            }
            Err(e) => tracing::warn!("Could not encode issued session id: {}", e),
        }
    }

    response
}
