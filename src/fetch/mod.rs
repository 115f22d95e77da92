mod client;
mod basic;
pub mod auth;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::Result;
use reqwest::StatusCode;

/// Issues a GET and decodes the body as JSON, whatever the status.
///
/// The status is returned alongside so callers can map provider error codes
/// themselves.
pub async fn fetch_json<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<(StatusCode, serde_json::Value)> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()?,
    );

    let resp = client.execute(req).await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}
