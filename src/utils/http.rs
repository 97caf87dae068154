use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub fn create_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(timeout)
        .pool_max_idle_per_host(2)
        .build()?;

    Ok(client)
}

/// Single best-effort GET returning the response body.
///
/// There is deliberately no retry ladder: a failed pass simply finds the
/// same announcements again on the next one.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request failed for {url}"))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP error {status} for {url}");
    }

    response
        .text()
        .await
        .with_context(|| format!("failed to read body from {url}"))
}
