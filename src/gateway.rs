use log::debug;
use reqwest::Client;

use crate::config::GatewayConfig;
use crate::error::DispatchError;
use crate::models::SendFileByUrl;

/// Client for the messaging gateway's send-file-by-url endpoint. One request
/// per call, no retries.
pub struct Gateway {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl Gateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.send_file_url(),
            chat_id: config.chat_id(),
        }
    }

    /// Send an image with a caption to the configured chat. Only a 2xx answer
    /// counts as delivered.
    pub async fn send_file_by_url(
        &self,
        url_file: &str,
        file_name: &str,
        caption: &str,
    ) -> Result<(), DispatchError> {
        let payload = SendFileByUrl {
            chat_id: self.chat_id.clone(),
            url_file: url_file.to_string(),
            file_name: file_name.to_string(),
            caption: caption.to_string(),
        };

        // The endpoint embeds the auth token, so never log it.
        debug!("Sending {} to {}", file_name, self.chat_id);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
