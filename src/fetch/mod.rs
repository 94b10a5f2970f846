mod client;
mod basic;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Result, anyhow};

/// GETs `url` with the given query parameters and returns the body as text.
///
/// Non-2xx responses are errors carrying the status and the head of the
/// body, which is usually enough to see what the API objected to.
/// Interpreting the body (including APIs that report "no data" inside a 200
/// response) is the caller's job.
pub async fn fetch_text<C: HttpClient>(
    client: &C,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String> {
    let url = reqwest::Url::parse_with_params(url, params)?;
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client
        .execute(req)
        .await
        .map_err(|e| anyhow!("Request to {} failed: {}", url, e))?;

    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let head: String = body.chars().take(200).collect();
        return Err(anyhow!("{} returned status {}: {}", url, status, head));
    }

    Ok(body)
}
