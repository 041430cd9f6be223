use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub struct WebSocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketClient {
    pub async fn connect_retry(
        url: &str,
        timeout: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let start = tokio::time::Instant::now();
        loop {
            match connect_async(url).await {
                Ok((stream, _)) => return Ok(Self { stream }),
                Err(err) => {
                    if start.elapsed() >= timeout {
                        return Err(Box::new(err));
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            }
        }
    }

    pub async fn send_json(&mut self, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.send(Message::text(value.to_string())).await?;
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.close(None).await?;
        Ok(())
    }

    /// Next text frame as JSON, skipping pings. `None` on close or timeout.
    pub async fn recv_json_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Value>, Box<dyn std::error::Error>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let next = match tokio::time::timeout(remaining, self.stream.next()).await {
                Ok(next) => next,
                Err(_) => return Ok(None),
            };
            match next {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(serde_json::from_str(text.as_str())?));
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(_)) | None => return Ok(None),
                Some(Err(err)) => return Err(Box::new(err)),
            }
        }
    }
}
