// src/services/widget_events.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};

use livedesk_common::models::{VisitorRecord, WidgetEvent};

use crate::services::ledger_service::LedgerService;

/// Applies widget webhooks to the ledger.
pub struct WidgetEventService {
    ledger: Arc<LedgerService>,
}

impl WidgetEventService {
    pub fn new(ledger: Arc<LedgerService>) -> Self {
        Self { ledger }
    }

    /// Returns the record after the update, or `None` if the write failed.
    /// Failures are only logged; the widget never sees them.
    pub async fn handle(&self, event: WidgetEvent) -> Option<VisitorRecord> {
        if event.visitor_id.trim().is_empty() {
            debug!("Dropping widget event without a visitor id");
            return None;
        }

        let (visitor_id, update) = event.into_update(Utc::now());
        match self.ledger.update(&visitor_id, update).await {
            Ok(record) => Some(record),
            Err(e) => {
                error!("Widget event for visitor '{}' dropped: {}", visitor_id, e);
                None
            }
        }
    }
}
