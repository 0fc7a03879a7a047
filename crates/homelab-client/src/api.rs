//! HTTP client for the comment endpoints.

use serde::{Deserialize, Serialize};

use homelab_shared::constants::{VIEWER_ID_HEADER, VIEWER_NAME_HEADER};
use homelab_shared::tree;
use homelab_shared::{Comment, CommentId, CommentRecord, Forest, PostSlug, ViewerId};

use crate::error::ClientError;

/// The signed-in user on whose behalf requests are made.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: ViewerId,
    pub display_name: Option<String>,
}

#[derive(Serialize)]
struct NewCommentBody<'a> {
    post_slug: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<CommentId>,
}

#[derive(Deserialize)]
struct LikeResponse {
    liked: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct CommentsApi {
    http: reqwest::Client,
    base_url: String,
    viewer: Option<Viewer>,
}

impl CommentsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            viewer: None,
        }
    }

    pub fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, self.url(path));
        if let Some(viewer) = &self.viewer {
            req = req.header(VIEWER_ID_HEADER, viewer.id.as_str());
            if let Some(name) = &viewer.display_name {
                req = req.header(VIEWER_NAME_HEADER, name);
            }
        }
        req
    }

    /// Fetch a post's comments and nest them locally.
    ///
    /// The flat listing is requested instead of the nested one so that
    /// decoding depth does not grow with the reply chain.
    pub async fn fetch_tree(&self, post_slug: &PostSlug) -> Result<Forest, ClientError> {
        let resp = self
            .request(reqwest::Method::GET, "/api/comments/flat")
            .query(&[("post_slug", post_slug.as_str())])
            .send()
            .await?;
        let body = check(resp).await?.bytes().await?;
        decode_tree(&body)
    }

    pub async fn post_comment(
        &self,
        post_slug: &PostSlug,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Comment, ClientError> {
        if self.viewer.is_none() {
            return Err(ClientError::SignInRequired);
        }
        let resp = self
            .request(reqwest::Method::POST, "/api/comments")
            .json(&NewCommentBody {
                post_slug: post_slug.as_str(),
                content,
                parent_id,
            })
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    /// Toggle the viewer's like and return the server's resulting state.
    pub async fn toggle_like(&self, comment_id: CommentId) -> Result<bool, ClientError> {
        if self.viewer.is_none() {
            return Err(ClientError::SignInRequired);
        }
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/api/comments/{comment_id}/like"),
            )
            .send()
            .await?;
        let body: LikeResponse = check(resp).await?.json().await?;
        Ok(body.liked)
    }
}

/// Parse the flat listing and assemble it into a tree.
fn decode_tree(body: &[u8]) -> Result<Forest, ClientError> {
    let records: Vec<CommentRecord> = serde_json::from_slice(body)?;
    Ok(tree::assemble(records))
}

/// Turn a non-success response into [`ClientError::Status`].
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    tracing::warn!(status = status.as_u16(), %message, "comment API request failed");
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
