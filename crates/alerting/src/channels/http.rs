use crate::channel::{ChannelError, ChannelSender};
use crate::contact::AlertContact;
use crate::formatter::MessageFormatter;
use crate::message::DeviceMessage;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error};

/// POSTs the JSON payload to a fixed endpoint
pub struct HttpPostSender {
    client: reqwest::Client,
    url: String,
}

impl HttpPostSender {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChannelSender for HttpPostSender {
    async fn send(
        &self,
        message: &DeviceMessage,
        contact: &AlertContact,
    ) -> Result<(), ChannelError> {
        let payload = MessageFormatter::json_payload(message)?;
        let request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);

        check_response(request.send().await, &self.url)?;
        debug!("HTTP POST of {} for {} sent to {}", message.message_id, contact.name, self.url);
        Ok(())
    }
}

/// Posts a chat-style attachment to an incoming-webhook URL
pub struct WebhookSender {
    client: reqwest::Client,
    url: String,
}

impl WebhookSender {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChannelSender for WebhookSender {
    async fn send(
        &self,
        message: &DeviceMessage,
        contact: &AlertContact,
    ) -> Result<(), ChannelError> {
        let payload = MessageFormatter::webhook_payload(message);
        let request = self.client.post(&self.url).json(&payload);

        check_response(request.send().await, &self.url)?;
        debug!("Webhook for {} ({}) sent", message.message_id, contact.name);
        Ok(())
    }
}

fn check_response(
    result: Result<reqwest::Response, reqwest::Error>,
    url: &str,
) -> Result<(), ChannelError> {
    let response = result.map_err(|e| ChannelError::Delivery(format!("{url}: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        error!("POST to {} failed with status {}", url, status);
        return Err(ChannelError::Delivery(format!("{url} returned {status}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ChannelKind;
    use crate::message::MessageType;
    use risk_engine::RiskLevel;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one request with `status`, handing back the request body
    async fn serve_once(status: u16) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/alerts", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 4096];
            let body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                raw.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break text[split + 4..].to_string();
                    }
                }
                if n == 0 {
                    break String::new();
                }
            };

            let response = format!(
                "HTTP/1.1 {status} Status\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(body);
        });

        (url, rx)
    }

    fn alert() -> (DeviceMessage, AlertContact) {
        let message = DeviceMessage::new(
            "TANK_A_001",
            1_700_000_000.0,
            MessageType::Alert,
            RiskLevel::Critical,
        )
        .with_location(-17.8216, 31.0492);
        let contact =
            AlertContact::new("Ops", "", "", "Operations", 1, vec![ChannelKind::HttpPost]);
        (message, contact)
    }

    #[tokio::test]
    async fn test_http_post_sends_json_payload() {
        let (url, body) = serve_once(200).await;
        let (message, contact) = alert();

        HttpPostSender::new(url).send(&message, &contact).await.unwrap();

        let body: serde_json::Value = serde_json::from_str(&body.await.unwrap()).unwrap();
        assert_eq!(body["device_id"], "TANK_A_001");
        assert_eq!(body["risk_level"], 4);
        assert_eq!(body["message_id"], message.message_id.as_str());
    }

    #[tokio::test]
    async fn test_webhook_sends_attachment() {
        let (url, body) = serve_once(204).await;
        let (message, contact) = alert();

        WebhookSender::new(url).send(&message, &contact).await.unwrap();

        let body: serde_json::Value = serde_json::from_str(&body.await.unwrap()).unwrap();
        assert_eq!(body["text"], "Fire Alert: CRITICAL");
        assert_eq!(body["attachments"][0]["color"], "danger");
    }

    #[tokio::test]
    async fn test_non_success_status_is_delivery_error() {
        let (url, _body) = serve_once(500).await;
        let (message, contact) = alert();

        let err = HttpPostSender::new(url).send(&message, &contact).await.unwrap_err();
        assert!(matches!(err, ChannelError::Delivery(reason) if reason.contains("500")));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_delivery_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        drop(listener);
        let (message, contact) = alert();

        let err = WebhookSender::new(url).send(&message, &contact).await.unwrap_err();
        assert!(matches!(err, ChannelError::Delivery(_)));
    }
}
