//! HTTP client abstraction for outbound calls.
//!
//! Both the transport adapter bridge and the widget notifier talk JSON over
//! HTTP. Going through this trait lets tests swap in a mock instead of making
//! real network requests. The default implementation wraps reqwest.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POSTs `body` as JSON. An empty response body yields `Value::Null`.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, Error>;
}

#[derive(Clone)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, Error> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if response.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&response)?)
    }
}
