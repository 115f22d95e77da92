use async_trait::async_trait;
use reqwest::{Request, Response};

/// Minimal transport seam. Wrappers such as [`super::auth::UrlParam`] decorate
/// requests before handing them to the inner client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
