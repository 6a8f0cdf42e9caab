//! livedesk-server/src/context.rs
//!
//! Wires repositories, delivery adapters and services from the command line.

use std::sync::Arc;

use tracing::info;

use livedesk_common::traits::{LivechatRepository, MessageContextRepository};
use livedesk_core::config::{DeskConfig, StatsConfig};
use livedesk_core::delivery::{
    HttpTransport, LoggingTransport, Transport, VisitorNotifier, WidgetNotifier,
};
use livedesk_core::repositories::{
    InMemoryLivechatRepository, InMemoryMessageContextRepository, PostgresLivechatRepository,
    PostgresMessageContextRepository,
};
use livedesk_core::services::{AdminActionService, LedgerService, StatsService, WidgetEventService};
use livedesk_core::{Database, DefaultHttpClient, Error, HttpClient};

use crate::{Args, StoreKind};

/// Everything the HTTP handlers need, shared behind one `Arc`.
pub struct ServerContext {
    pub admin_actions: AdminActionService,
    pub widget_events: WidgetEventService,
}

impl ServerContext {
    pub async fn new(args: &Args) -> Result<Arc<Self>, Error> {
        let (livechats, contexts): (Arc<dyn LivechatRepository>, Arc<dyn MessageContextRepository>) =
            match args.store {
                StoreKind::Postgres => {
                    let db = Database::new(&args.db_url).await?;
                    db.migrate().await?;
                    (
                        Arc::new(PostgresLivechatRepository::new(db.pool().clone())),
                        Arc::new(PostgresMessageContextRepository::new(db.pool().clone())),
                    )
                }
                StoreKind::Memory => {
                    info!("Using in-memory store; nothing survives a restart.");
                    (
                        Arc::new(InMemoryLivechatRepository::new()),
                        Arc::new(InMemoryMessageContextRepository::new()),
                    )
                }
            };

        let config = DeskConfig {
            admin_chat_id: args.admin_chat_id.clone(),
            brand_name: args.brand_name.clone(),
            timezone: DeskConfig::parse_timezone(&args.timezone)?,
            delivery_timeout: args.delivery_timeout(),
            compact_notifications: args.compact_notifications,
        };

        let http: Arc<dyn HttpClient> = Arc::new(DefaultHttpClient::new(config.delivery_timeout)?);
        let transport: Arc<dyn Transport> = match &args.transport_url {
            Some(url) => Arc::new(HttpTransport::new(http.clone(), url)),
            None => Arc::new(LoggingTransport),
        };
        let notifier: Arc<dyn VisitorNotifier> = match &args.widget_url {
            Some(url) => Arc::new(WidgetNotifier::new(http.clone(), url)),
            None => Arc::new(LoggingTransport),
        };

        Ok(Arc::new(Self::from_parts(livechats, contexts, transport, notifier, config)))
    }

    pub fn from_parts(
        livechats: Arc<dyn LivechatRepository>,
        contexts: Arc<dyn MessageContextRepository>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn VisitorNotifier>,
        config: DeskConfig,
    ) -> Self {
        let ledger = Arc::new(LedgerService::new(livechats.clone()));
        let stats = Arc::new(StatsService::new(livechats, StatsConfig::default()));

        Self {
            admin_actions: AdminActionService::new(
                ledger.clone(),
                stats,
                contexts,
                transport,
                notifier,
                config,
            ),
            widget_events: WidgetEventService::new(ledger),
        }
    }
}
