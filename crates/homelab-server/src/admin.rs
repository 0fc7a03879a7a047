//! Admin endpoints for managing the posts comments attach to.
//!
//! Every handler checks the bearer token first; see
//! [`crate::auth::verify_admin_token`].

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use homelab_shared::PostSlug;
use homelab_store::{Post, PostDraft};

use crate::api::{parse_kind, AppState};
use crate::auth::verify_admin_token;
use crate::error::ServerError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/status", get(admin_status))
        .route("/api/admin/posts", get(list_all_posts).post(upsert_post))
        .route("/api/admin/posts/:slug", delete(delete_post))
}

#[derive(Serialize)]
struct AdminStatusResponse {
    name: String,
    version: &'static str,
    uptime_secs: u64,
}

#[derive(Deserialize)]
struct AdminPostQuery {
    kind: Option<String>,
}

async fn admin_status(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<AdminStatusResponse>, ServerError> {
    verify_admin_token(&headers, &state.config)?;

    Ok(Json(AdminStatusResponse {
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
    }))
}

/// All posts, drafts included.
async fn list_all_posts(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(query): Query<AdminPostQuery>,
) -> Result<Json<Vec<Post>>, ServerError> {
    verify_admin_token(&headers, &state.config)?;

    let kind = parse_kind(query.kind.as_deref())?;
    let posts = state.with_db(move |db| db.list_posts(kind, true)).await?;
    Ok(Json(posts))
}

async fn upsert_post(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Result<Json<PostDraft>, JsonRejection>,
) -> Result<Json<Post>, ServerError> {
    verify_admin_token(&headers, &state.config)?;
    let Json(draft) = body?;

    if draft.title.trim().is_empty() {
        return Err(ServerError::BadRequest("Post title must not be empty".into()));
    }

    let post = state.with_db(move |db| db.upsert_post(&draft)).await?;
    info!(slug = %post.slug, kind = post.kind.as_str(), published = post.published, "Admin saved post");
    Ok(Json(post))
}

/// Delete a post together with its comments and their likes.
async fn delete_post(
    headers: HeaderMap,
    State(state): State<AppState>,
    slug: Result<Path<String>, PathRejection>,
) -> Result<Json<serde_json::Value>, ServerError> {
    verify_admin_token(&headers, &state.config)?;
    let Path(slug) = slug?;

    let slug = PostSlug::parse(&slug)?;
    let target = slug.clone();
    let deleted = state.with_db(move |db| db.delete_post(&target)).await?;
    if !deleted {
        return Err(ServerError::NotFound(format!("Post {slug}")));
    }

    info!(slug = %slug, "Admin deleted post");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};

    use crate::api::tests::{send, test_router};
    use crate::config::ServerConfig;

    const TOKEN: &str = "Bearer correct-horse";

    fn admin_config() -> ServerConfig {
        ServerConfig {
            admin_token: Some("correct-horse".into()),
            ..ServerConfig::default()
        }
    }

    fn admin_req(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("authorization", t);
        }
        match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn draft(slug: &str, published: bool) -> Value {
        json!({ "slug": slug, "kind": "project", "title": "Proxmox cluster", "published": published })
    }

    #[tokio::test]
    async fn test_admin_requires_token() {
        let router = test_router(admin_config());

        let (status, _) = send(&router, admin_req("GET", "/api/admin/posts", None, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &router,
            admin_req("GET", "/api/admin/posts", Some("Bearer wrong"), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&router, admin_req("GET", "/api/admin/status", Some(TOKEN), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["uptime_secs"].is_u64());
    }

    #[tokio::test]
    async fn test_admin_disabled_without_configured_token() {
        let router = test_router(ServerConfig::default());
        let (status, _) = send(&router, admin_req("GET", "/api/admin/posts", Some(TOKEN), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_drafts_only_visible_to_admin() {
        let router = test_router(admin_config());

        let (status, _) = send(
            &router,
            admin_req("POST", "/api/admin/posts", Some(TOKEN), Some(draft("proxmox", false))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, public) = send(&router, admin_req("GET", "/api/posts", None, None)).await;
        assert_eq!(public, json!([]));

        let (_, all) = send(&router, admin_req("GET", "/api/admin/posts", Some(TOKEN), None)).await;
        assert_eq!(all[0]["slug"], "proxmox");

        send(
            &router,
            admin_req("POST", "/api/admin/posts", Some(TOKEN), Some(draft("proxmox", true))),
        )
        .await;
        let (_, public) = send(&router, admin_req("GET", "/api/posts?kind=project", None, None)).await;
        assert_eq!(public.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let router = test_router(admin_config());
        let body = json!({ "slug": "proxmox", "kind": "article", "title": "  " });
        let (status, _) = send(&router, admin_req("POST", "/api/admin/posts", Some(TOKEN), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_unregistered_post_keeps_comments() {
        let router = test_router(admin_config());
        let comment = Request::builder()
            .method("POST")
            .uri("/api/comments")
            .header("content-type", "application/json")
            .header("x-viewer-id", "alice")
            .body(Body::from(json!({ "post_slug": "never-registered", "content": "Hi" }).to_string()))
            .unwrap();
        let (status, _) = send(&router, comment).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &router,
            admin_req("DELETE", "/api/admin/posts/never-registered", Some(TOKEN), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, count) = send(
            &router,
            admin_req("GET", "/api/comments/count?post_slug=never-registered", None, None),
        )
        .await;
        assert_eq!(count["count"], 1);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_json_400() {
        let router = test_router(admin_config());
        let body = json!({ "slug": "Not A Slug", "kind": "article", "title": "Title" });
        let (status, body) = send(&router, admin_req("POST", "/api/admin/posts", Some(TOKEN), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_delete_post_removes_comments() {
        let router = test_router(admin_config());
        send(
            &router,
            admin_req("POST", "/api/admin/posts", Some(TOKEN), Some(draft("proxmox", true))),
        )
        .await;

        let comment = Request::builder()
            .method("POST")
            .uri("/api/comments")
            .header("content-type", "application/json")
            .header("x-viewer-id", "alice")
            .body(Body::from(json!({ "post_slug": "proxmox", "content": "Cool" }).to_string()))
            .unwrap();
        let (status, _) = send(&router, comment).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &router,
            admin_req("DELETE", "/api/admin/posts/proxmox", Some(TOKEN), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, count) = send(
            &router,
            admin_req("GET", "/api/comments/count?post_slug=proxmox", None, None),
        )
        .await;
        assert_eq!(count["count"], 0);

        let (status, _) = send(
            &router,
            admin_req("DELETE", "/api/admin/posts/proxmox", Some(TOKEN), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
