use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use homelab_shared::comment::resolve_username;
use homelab_shared::{tree, wire};
use homelab_shared::{Comment, CommentId, CommentRecord, PostSlug};
use homelab_store::{Database, NewComment, Post, PostKind, StoreError};

use crate::admin;
use crate::auth::{MaybeViewer, RequireViewer};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
    pub rate_limiter: RateLimiter,
    pub config: Arc<ServerConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            rate_limiter: RateLimiter::new(config.rate_limit_per_sec, config.rate_limit_burst),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Run a store call on the blocking pool.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|_| ServerError::Internal("database lock poisoned".into()))?;
            f(&guard).map_err(ServerError::from)
        })
        .await
        .map_err(|e| ServerError::Internal(format!("database task failed: {e}")))?
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let limited = middleware::from_fn_with_state(state.rate_limiter.clone(), rate_limit_middleware);

    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(server_info))
        .route("/api/comments", get(list_comments))
        .route("/api/comments", post(create_comment).route_layer(limited.clone()))
        .route("/api/comments/flat", get(list_comments_flat))
        .route("/api/comments/count", get(count_comments))
        .route("/api/comments/:id/like", post(toggle_like).route_layer(limited))
        .route("/api/posts", get(list_posts))
        .merge(admin::routes())
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ServerInfoResponse {
    name: String,
    version: &'static str,
    admin_enabled: bool,
}

#[derive(Deserialize)]
struct PostQuery {
    post_slug: Option<String>,
}

impl PostQuery {
    fn slug(self) -> Result<PostSlug, ServerError> {
        let raw = self
            .post_slug
            .ok_or_else(|| ServerError::BadRequest("post_slug is required".into()))?;
        Ok(PostSlug::parse(&raw)?)
    }
}

#[derive(Serialize)]
struct CountResponse {
    post_slug: PostSlug,
    count: u64,
}

#[derive(Deserialize)]
struct CreateCommentRequest {
    #[serde(default)]
    post_slug: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    parent_id: Option<CommentId>,
}

#[derive(Serialize)]
struct LikeResponse {
    liked: bool,
}

#[derive(Deserialize)]
struct PostListQuery {
    kind: Option<String>,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn server_info(State(state): State<AppState>) -> Json<ServerInfoResponse> {
    Json(ServerInfoResponse {
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        admin_enabled: state.config.admin_token.is_some(),
    })
}

// ─── Comments ───

/// The assembled tree for a post, with like state for the current viewer.
async fn list_comments(
    State(state): State<AppState>,
    MaybeViewer(viewer): MaybeViewer,
    Query(query): Query<PostQuery>,
) -> Result<Response, ServerError> {
    let records = fetch_records(&state, query.slug()?, viewer.map(|v| v.id)).await?;
    let forest = tree::assemble(records);
    let body = wire::forest_to_json(&forest)
        .map_err(|e| ServerError::Internal(format!("failed to encode comment tree: {e}")))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Same rows as [`list_comments`] without nesting, oldest first.
async fn list_comments_flat(
    State(state): State<AppState>,
    MaybeViewer(viewer): MaybeViewer,
    Query(query): Query<PostQuery>,
) -> Result<Json<Vec<CommentRecord>>, ServerError> {
    let records = fetch_records(&state, query.slug()?, viewer.map(|v| v.id)).await?;
    Ok(Json(records))
}

async fn fetch_records(
    state: &AppState,
    slug: PostSlug,
    viewer: Option<homelab_shared::ViewerId>,
) -> Result<Vec<CommentRecord>, ServerError> {
    state
        .with_db(move |db| db.comments_for_post(&slug, viewer.as_ref()))
        .await
}

async fn count_comments(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<Json<CountResponse>, ServerError> {
    let slug = query.slug()?;
    let lookup = slug.clone();
    let count = state.with_db(move |db| db.comment_count(&lookup)).await?;
    Ok(Json(CountResponse {
        post_slug: slug,
        count,
    }))
}

async fn create_comment(
    State(state): State<AppState>,
    RequireViewer(viewer): RequireViewer,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ServerError> {
    let Json(req) = body?;
    let new = NewComment {
        post_slug: PostSlug::parse(&req.post_slug)?,
        author_id: viewer.id,
        username: resolve_username(viewer.display_name.as_deref()),
        content: req.content,
        parent_id: req.parent_id,
    };

    let comment = state.with_db(move |db| db.insert_comment(&new)).await?;

    info!(
        id = %comment.id,
        post = %comment.post_slug,
        author = %comment.author_id,
        reply = comment.parent_id.is_some(),
        "Comment created"
    );

    Ok((StatusCode::CREATED, Json(comment)))
}

async fn toggle_like(
    State(state): State<AppState>,
    RequireViewer(viewer): RequireViewer,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<LikeResponse>, ServerError> {
    let Path(id) = id?;
    let comment_id = CommentId(id);
    let viewer_id = viewer.id;
    let liked = state
        .with_db(move |db| db.toggle_like(comment_id, &viewer_id))
        .await
        .map_err(|e| match e {
            ServerError::NotFound(_) => ServerError::NotFound(format!("Comment {comment_id}")),
            other => other,
        })?;

    tracing::debug!(comment = %comment_id, liked, "Like toggled");
    Ok(Json(LikeResponse { liked }))
}

// ─── Posts ───

/// Published posts, newest first, optionally filtered by `?kind=`.
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Vec<Post>>, ServerError> {
    let kind = parse_kind(query.kind.as_deref())?;
    let posts = state.with_db(move |db| db.list_posts(kind, false)).await?;
    Ok(Json(posts))
}

pub(crate) fn parse_kind(raw: Option<&str>) -> Result<Option<PostKind>, ServerError> {
    match raw {
        None => Ok(None),
        Some(raw) => PostKind::parse(raw)
            .map(Some)
            .ok_or_else(|| ServerError::BadRequest(format!("Unknown post kind: {raw}"))),
    }
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
