// File: src/delivery/mod.rs

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use livedesk_common::models::OutboundView;

use crate::Error;

pub mod http_transport;
pub mod logging;
pub mod notifier;

pub use http_transport::HttpTransport;
pub use logging::LoggingTransport;
pub use notifier::WidgetNotifier;

/// Hands rendered views to the admin messaging platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a new message or edits `view.target_message_id`.
    /// Returns the id of the message the view ended up in, when known.
    async fn deliver(&self, view: &OutboundView) -> Result<Option<String>, Error>;
}

/// Pushes admin replies back to the visitor's widget.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitorNotifier: Send + Sync {
    async fn notify(&self, visitor_id: &str, text: &str) -> Result<(), Error>;
}

/// Delivers a view within `limit`. Failures are logged and swallowed.
pub async fn deliver_bounded(
    transport: &dyn Transport,
    view: &OutboundView,
    limit: Duration,
) -> Option<String> {
    match tokio::time::timeout(limit, transport.deliver(view)).await {
        Ok(Ok(message_id)) => message_id,
        Ok(Err(e)) => {
            error!("Transport delivery failed: {}", e);
            None
        }
        Err(elapsed) => {
            let e = Error::TransportDelivery(format!("timed out after {:?}: {}", limit, elapsed));
            error!("{}", e);
            None
        }
    }
}

/// Notifies a visitor within `limit`, best effort.
pub async fn notify_bounded(
    notifier: &dyn VisitorNotifier,
    visitor_id: &str,
    text: &str,
    limit: Duration,
) {
    match tokio::time::timeout(limit, notifier.notify(visitor_id, text)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Could not notify visitor '{}': {}", visitor_id, e),
        Err(_) => warn!("Notifying visitor '{}' timed out after {:?}", visitor_id, limit),
    }
}
