//! HTTP client for the physical board
//!
//! Every call is bounded by the configured timeout. Failures are returned
//! to the caller, which logs them; nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::protocol::{DisplayFrame, PhysicalVotes};

/// Commands the engine can send to the physical board
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Relative motor move
    async fn move_motor(&self, steps: i64) -> Result<()>;

    /// Refresh the display
    async fn update_display(&self, frame: &DisplayFrame) -> Result<()>;

    /// Votes cast on the device since the last successful poll
    async fn poll_votes(&self) -> Result<PhysicalVotes>;

    /// Whether there is a device to talk to at all
    fn is_configured(&self) -> bool {
        true
    }
}

/// Actuator reached over HTTP
#[derive(Clone)]
pub struct HttpActuator {
    client: Client,
    base_url: String,
}

impl HttpActuator {
    /// `base_url` must not carry a trailing slash
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<Q: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        Ok(response)
    }
}

#[async_trait]
impl Actuator for HttpActuator {
    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn move_motor(&self, steps: i64) -> Result<()> {
        let response = self.get("/move", &[("steps", steps)]).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        debug!(steps, "Motor moved");
        Ok(())
    }

    #[instrument(skip(self, frame), fields(base = %self.base_url))]
    async fn update_display(&self, frame: &DisplayFrame) -> Result<()> {
        let response = self.get("/quiz", &frame.query()).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        debug!(question = %frame.question, "Display updated");
        Ok(())
    }

    async fn poll_votes(&self) -> Result<PhysicalVotes> {
        let url = format!("{}/poll_votes", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Status(status.as_u16()));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Malformed(e.to_string()))
    }
}

/// Stand-in used when no device URL is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineActuator;

#[async_trait]
impl Actuator for OfflineActuator {
    async fn move_motor(&self, steps: i64) -> Result<()> {
        debug!(steps, "No actuator, dropping move");
        Err(Error::NotConfigured)
    }

    async fn update_display(&self, frame: &DisplayFrame) -> Result<()> {
        debug!(question = %frame.question, "No actuator, dropping display update");
        Err(Error::NotConfigured)
    }

    async fn poll_votes(&self) -> Result<PhysicalVotes> {
        Err(Error::NotConfigured)
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[derive(Clone)]
    enum Reply {
        Respond { status: &'static str, body: &'static str },
        Stall,
    }

    /// One-shot-per-connection HTTP server that records request lines
    async fn mock_device(reply: Reply) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let reply = reply.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let text = String::from_utf8_lossy(&buf);
                    if let Some(line) = text.lines().next() {
                        log.lock().unwrap().push(line.to_string());
                    }

                    match reply {
                        Reply::Respond { status, body } => {
                            let response = format!(
                                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status,
                                body.len(),
                                body
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                        }
                        Reply::Stall => {
                            tokio::time::sleep(Duration::from_secs(5)).await;
                        }
                    }
                });
            }
        });

        (format!("http://{}", addr), seen)
    }

    fn client(base: &str) -> HttpActuator {
        HttpActuator::new(base, Duration::from_millis(300)).unwrap()
    }

    #[tokio::test]
    async fn test_move_motor_sends_signed_steps() {
        let (base, seen) = mock_device(Reply::Respond { status: "200 OK", body: "" }).await;
        client(&base).move_motor(-68).await.unwrap();

        let lines = seen.lock().unwrap().clone();
        assert_eq!(lines, vec!["GET /move?steps=-68 HTTP/1.1".to_string()]);
    }

    #[tokio::test]
    async fn test_update_display_sends_sanitized_query() {
        let (base, seen) = mock_device(Reply::Respond { status: "200 OK", body: "" }).await;
        let frame = DisplayFrame::new("Caffè?", "Yes", "No");
        client(&base).update_display(&frame).await.unwrap();

        let line = seen.lock().unwrap()[0].clone();
        assert!(line.starts_with("GET /quiz?q=Caffe%27%3F&a1=1%3A+Yes&a2=2%3A+No "));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let (base, _) = mock_device(Reply::Respond {
            status: "503 Service Unavailable",
            body: "",
        })
        .await;
        let err = client(&base).move_motor(10).await.unwrap_err();
        assert!(matches!(err, Error::Status(503)));
    }

    #[tokio::test]
    async fn test_poll_votes_parses_counts() {
        let (base, seen) = mock_device(Reply::Respond {
            status: "200 OK",
            body: r#"{"A": 2, "B": 5}"#,
        })
        .await;
        let votes = client(&base).poll_votes().await.unwrap();
        assert_eq!(votes, PhysicalVotes { a: 2, b: 5 });
        assert!(seen.lock().unwrap()[0].starts_with("GET /poll_votes"));
    }

    #[tokio::test]
    async fn test_poll_votes_requires_200() {
        let (base, _) = mock_device(Reply::Respond {
            status: "204 No Content",
            body: "",
        })
        .await;
        assert!(matches!(
            client(&base).poll_votes().await,
            Err(Error::Status(204))
        ));
    }

    #[tokio::test]
    async fn test_poll_votes_malformed_body() {
        let (base, _) = mock_device(Reply::Respond {
            status: "200 OK",
            body: "votes: lots",
        })
        .await;
        assert!(matches!(
            client(&base).poll_votes().await,
            Err(Error::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_stalled_device_times_out() {
        let (base, _) = mock_device(Reply::Stall).await;
        assert!(matches!(
            client(&base).move_motor(1).await,
            Err(Error::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_device_is_transport_error() {
        // bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr))
            .move_motor(1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_offline_actuator_refuses() {
        let offline = OfflineActuator;
        assert!(!offline.is_configured());
        assert!(matches!(
            offline.move_motor(5).await,
            Err(Error::NotConfigured)
        ));
        assert!(matches!(
            offline.poll_votes().await,
            Err(Error::NotConfigured)
        ));
    }
}
