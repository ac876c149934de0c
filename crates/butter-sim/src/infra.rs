//! Fetches the address book published by a deployment's artifacts server.

use std::time::Duration;

use butter_addresses::ButterAddresses;
use eyre::{eyre, Result};
use tokio::time::sleep;
use tracing::debug;

const RETRIES: usize = 5;
const RETRY_TIME: Duration = Duration::from_millis(500);

pub async fn query_addresses(artifacts_url: &str) -> Result<ButterAddresses> {
    for attempt in 0..RETRIES {
        let response = reqwest::get(artifacts_url).await?;
        if response.status().is_success() {
            return Ok(response.json::<ButterAddresses>().await?);
        }
        debug!(attempt, status = %response.status(), "artifacts server not ready");
        sleep(RETRY_TIME).await;
    }
    Err(eyre!(
        "couldn't get Butter addresses from {} after {} retries",
        artifacts_url,
        RETRIES
    ))
}

/// The published address book when `BUTTER_ADDRESSES_URL` is set, otherwise
/// the mainnet one.
pub async fn load_addresses() -> Result<ButterAddresses> {
    match std::env::var("BUTTER_ADDRESSES_URL") {
        Ok(url) => query_addresses(&url).await,
        Err(_) => Ok(ButterAddresses::default()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Serves `responses` in order, repeating the last one, and counts the
    /// requests it has answered.
    async fn artifacts_server(responses: Vec<(u16, String)>) -> Result<(String, Arc<AtomicUsize>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}/addresses.json", listener.local_addr()?);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let hit = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = &responses[hit.min(responses.len() - 1)];
                let mut request = vec![];
                let mut buf = [0; 1024];
                while !request.windows(4).any(|w: &[u8]| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Ok((url, hits))
    }

    #[tokio::test]
    async fn test_query_addresses_retries_until_ready() -> Result<()> {
        let addresses = ButterAddresses::default();
        let (url, hits) = artifacts_server(vec![
            (503, String::new()),
            (503, String::new()),
            (200, serde_json::to_string(&addresses)?),
        ])
        .await?;
        assert_eq!(query_addresses(&url).await?, addresses);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_query_addresses_gives_up() -> Result<()> {
        let (url, hits) = artifacts_server(vec![(404, String::new())]).await?;
        let err = query_addresses(&url)
            .await
            .err()
            .ok_or_else(|| eyre!("expected an error"))?;
        assert!(err.to_string().contains("after 5 retries"));
        assert_eq!(hits.load(Ordering::SeqCst), RETRIES);
        Ok(())
    }
}
