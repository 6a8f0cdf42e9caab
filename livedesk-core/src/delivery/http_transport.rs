use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use livedesk_common::models::OutboundView;

use crate::Error;
use crate::delivery::Transport;
use crate::http::HttpClient;

/// Posts views as JSON to a platform adapter, which answers with
/// `{"message_id": ...}` for messages it created.
pub struct HttpTransport {
    client: Arc<dyn HttpClient>,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(client: Arc<dyn HttpClient>, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

fn message_id_of(response: &Value) -> Option<String> {
    match response.get("message_id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn deliver(&self, view: &OutboundView) -> Result<Option<String>, Error> {
        let body = serde_json::to_value(view)?;
        let response = self
            .client
            .post_json(&self.endpoint, &body)
            .await
            .map_err(|e| Error::TransportDelivery(e.to_string()))?;

        let message_id = message_id_of(&response).or_else(|| view.target_message_id.clone());
        debug!("Delivered view to {} -> {:?}", self.endpoint, message_id);
        Ok(message_id)
    }
}
