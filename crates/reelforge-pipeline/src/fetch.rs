//! Small HTTP download helper shared by the transcoder and the orchestrator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),
}

/// Download a resource into memory. Returns an error for any non-2xx status.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(response.bytes().await?.to_vec())
}

/// Whether a video reference is a URL (as opposed to a local path).
pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}
