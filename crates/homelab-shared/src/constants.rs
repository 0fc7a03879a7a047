/// Application name
pub const APP_NAME: &str = "homelab";

/// Maximum comment body length, in characters, after trimming
pub const MAX_COMMENT_LEN: usize = 4000;

/// Maximum stored display name length, in characters
pub const MAX_USERNAME_LEN: usize = 64;

/// Display name used when the identity provider supplies none
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// Maximum post slug length
pub const MAX_SLUG_LEN: usize = 128;

/// Header carrying the viewer identity, set by the authenticating proxy
pub const VIEWER_ID_HEADER: &str = "x-viewer-id";

/// Header carrying the viewer display name, set by the authenticating proxy
pub const VIEWER_NAME_HEADER: &str = "x-viewer-name";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;
