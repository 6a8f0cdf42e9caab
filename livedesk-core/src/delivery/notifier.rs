use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::Error;
use crate::delivery::VisitorNotifier;
use crate::http::HttpClient;

/// Sends `{sender_id, text}` to the widget's `/livechat/message` endpoint.
pub struct WidgetNotifier {
    client: Arc<dyn HttpClient>,
    endpoint: String,
}

impl WidgetNotifier {
    pub fn new(client: Arc<dyn HttpClient>, widget_base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/livechat/message", widget_base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VisitorNotifier for WidgetNotifier {
    async fn notify(&self, visitor_id: &str, text: &str) -> Result<(), Error> {
        let body = json!({ "sender_id": visitor_id, "text": text });
        self.client.post_json(&self.endpoint, &body).await?;
        debug!("Posted message to widget for visitor '{}'", visitor_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use serde_json::Value;

    #[tokio::test]
    async fn test_posts_sender_and_text() {
        let mut client = MockHttpClient::new();
        client
            .expect_post_json()
            .withf(|url, body| {
                url == "http://widget/livechat/message"
                    && body["sender_id"] == "v-9"
                    && body["text"] == "hi there"
            })
            .times(1)
            .returning(|_, _| Ok(Value::Null));

        let notifier = WidgetNotifier::new(Arc::new(client), "http://widget/");
        notifier.notify("v-9", "hi there").await.unwrap();
    }
}
