// src/services/admin_actions.rs
//
// Turns admin button presses and replies into ledger updates and views.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use livedesk_common::models::{
    ActionInvocation, ActionMetadata, LedgerUpdate, LifecycleStage, MessageContext, OutboundView,
    SenderType, TranscriptMessage, VisitorFilter, VisitorRecord,
};
use livedesk_common::traits::MessageContextRepository;

use crate::Error;
use crate::codec::{
    self, ChatSelector, ChatsNav, NavCommand, QuickResponse, ScrollDirection, StatsNav, StatsView,
};
use crate::config::DeskConfig;
use crate::delivery::{Transport, VisitorNotifier, deliver_bounded, notify_bounded};
use crate::render::{self, CardMode, View, VisitorSummary, card, chat_list};
use crate::services::ledger_service::LedgerService;
use crate::services::stats_service::StatsService;

pub const INTENT_REPLY: &str = "reply";
pub const INTENT_LIVECHAT_MESSAGE: &str = "livechat_message";

const CLOSE_TEXT: &str = "Thank you for chatting with us. I hope we were able to help you out. \
If you have any other queries, do ping us and we'll get back to you right away.";

pub struct AdminActionService {
    ledger: Arc<LedgerService>,
    stats: Arc<StatsService>,
    contexts: Arc<dyn MessageContextRepository>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn VisitorNotifier>,
    config: DeskConfig,
}

impl AdminActionService {
    pub fn new(
        ledger: Arc<LedgerService>,
        stats: Arc<StatsService>,
        contexts: Arc<dyn MessageContextRepository>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn VisitorNotifier>,
        config: DeskConfig,
    ) -> Self {
        Self {
            ledger,
            stats,
            contexts,
            transport,
            notifier,
            config,
        }
    }

    /// Handles one invocation end to end. Returns the view that was handed to
    /// the transport, if any. Never fails: lookups that miss fall back to the
    /// chat menu and everything else is logged.
    pub async fn handle(&self, invocation: &ActionInvocation) -> Option<OutboundView> {
        debug!("Admin action '{}' from '{}'", invocation.intent, invocation.metadata.sender_id);

        let view = match self.build_view(invocation).await {
            Ok(Some(view)) => view,
            Ok(None) => return None,
            Err(e) if e.is_not_found() => {
                warn!("{}; showing chat menu", e);
                self.target(render::render(&View::ChatMenu), &invocation.metadata)
            }
            Err(e) => {
                error!("Admin action '{}' failed: {}", invocation.intent, e);
                return None;
            }
        };

        self.send(view).await
    }

    fn target(&self, view: OutboundView, meta: &ActionMetadata) -> OutboundView {
        view.editing(meta.callback_message_id.clone())
            .in_chat(self.config.admin_chat_id.clone())
    }

    /// Delivers a view and registers its context under the resulting message id.
    async fn send(&self, view: OutboundView) -> Option<OutboundView> {
        let message_id = deliver_bounded(self.transport.as_ref(), &view, self.config.delivery_timeout).await;

        if let (Some(context), Some(message_id)) = (&view.context, &message_id) {
            if let Err(e) = self.contexts.put(message_id, context).await {
                error!("Could not store context for message '{}': {}", message_id, e);
            }
        }
        Some(view)
    }

    async fn build_view(&self, invocation: &ActionInvocation) -> Result<Option<OutboundView>, Error> {
        let meta = &invocation.metadata;
        match invocation.intent.as_str() {
            INTENT_REPLY => self.reply(meta).await,
            INTENT_LIVECHAT_MESSAGE => self.visitor_message(meta).await.map(Some),
            intent => {
                let cmd = codec::from_entities(intent, &invocation.entities);
                self.navigate(cmd, meta).await.map(Some)
            }
        }
    }

    async fn navigate(&self, cmd: NavCommand, meta: &ActionMetadata) -> Result<OutboundView, Error> {
        let view = match cmd {
            NavCommand::Chats(nav) => self.chats(nav, meta).await?,
            NavCommand::Stats(nav) => self.stats_view(nav).await?,
            NavCommand::Refresh => {
                let (record, context) = self.pressed_card(meta).await?;
                card_view(record, CardMode::Transcript { offset: None }, context)
            }
            NavCommand::Scroll(direction) => self.scroll(direction, meta).await?,
            NavCommand::Tag(stage) => self.tag(stage, meta).await?,
            NavCommand::Quick(quick) => self.quick(quick, meta).await?,
        };
        Ok(self.target(render::render(&view), meta))
    }

    async fn chats(&self, nav: ChatsNav, meta: &ActionMetadata) -> Result<View, Error> {
        if let Some(selector) = nav.selector {
            let filter = match selector {
                ChatSelector::Online => VisitorFilter::online(),
                ChatSelector::All => VisitorFilter::default(),
            };
            let visitors = self
                .ledger
                .list(&filter)
                .await?
                .iter()
                .map(VisitorSummary::from)
                .collect();
            return Ok(View::ChatList {
                selector,
                visitors,
                page: nav.page,
            });
        }

        match (&nav.visitor_id, &meta.callback_message_id) {
            (Some(visitor_id), Some(message_id)) => {
                let parent = nav.parent.unwrap_or(ChatSelector::All);
                let back = chat_list::back_to_list(parent, nav.page);
                self.contexts.put(message_id, &back).await?;

                let record = self.ledger.get_required(visitor_id).await?;
                Ok(card_view(record, CardMode::Transcript { offset: None }, Some(back)))
            }
            _ => Ok(View::ChatMenu),
        }
    }

    async fn stats_view(&self, nav: StatsNav) -> Result<View, Error> {
        Ok(match (nav.view, nav.date) {
            (StatsView::Lifecycle, _) => View::StatsLifecyclePicker,
            (StatsView::Date, _) | (StatsView::Report, None) => View::StatsDatePicker {
                lifecycle: nav.lifecycle,
            },
            (StatsView::Report, Some(date)) => {
                let mut report = self
                    .stats
                    .report(nav.lifecycle, date, Utc::now(), self.config.timezone)
                    .await?;
                report.page = nav.page;
                View::StatsReport(Box::new(report))
            }
        })
    }

    /// Resolves the visitor shown on the card whose button was pressed.
    async fn pressed_card(
        &self,
        meta: &ActionMetadata,
    ) -> Result<(VisitorRecord, Option<MessageContext>), Error> {
        let message_id = meta
            .callback_message_id
            .as_deref()
            .ok_or_else(|| Error::NotFound("no pressed message".to_string()))?;
        self.card_for_message(message_id).await
    }

    async fn card_for_message(
        &self,
        message_id: &str,
    ) -> Result<(VisitorRecord, Option<MessageContext>), Error> {
        let context = self
            .contexts
            .get(message_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("context for message '{message_id}'")))?;
        let visitor_id = context
            .visitor_id
            .as_deref()
            .ok_or_else(|| Error::NotFound(format!("visitor on message '{message_id}'")))?;
        let record = self.ledger.get_required(visitor_id).await?;
        Ok((record, Some(context)))
    }

    async fn scroll(&self, direction: ScrollDirection, meta: &ActionMetadata) -> Result<View, Error> {
        let (record, context) = self.pressed_card(meta).await?;
        let current = context.as_ref().and_then(|c| c.transcript_offset);
        let offset = card::scroll_offset(record.messages.len(), current, direction);
        Ok(card_view(record, CardMode::Transcript { offset: Some(offset) }, context))
    }

    async fn tag(&self, stage: Option<LifecycleStage>, meta: &ActionMetadata) -> Result<View, Error> {
        let (mut record, context) = self.pressed_card(meta).await?;
        if let Some(stage) = stage {
            let mut patch = Map::new();
            patch.insert("lifecycle_stage".into(), Value::String(stage.as_str().to_string()));
            record = self
                .ledger
                .update(&record.visitor_id, LedgerUpdate::default().with_metadata(patch))
                .await?;
            info!("Tagged visitor '{}' as {}", record.visitor_id, stage.as_str());
        }
        Ok(card_view(record, CardMode::Transcript { offset: None }, context))
    }

    fn quick_text(&self, quick: QuickResponse, meta: &ActionMetadata) -> String {
        match quick {
            QuickResponse::Greet => format!(
                "Hi, you are chatting with {} from {}.",
                meta.sender_name.as_deref().unwrap_or("our team"),
                self.config.brand_name
            ),
            QuickResponse::Close => CLOSE_TEXT.to_string(),
        }
    }

    async fn quick(&self, quick: Option<QuickResponse>, meta: &ActionMetadata) -> Result<View, Error> {
        let (mut record, context) = self.pressed_card(meta).await?;
        if let Some(quick) = quick {
            let text = self.quick_text(quick, meta);
            record = self
                .admin_says(&record.visitor_id, &text, quick != QuickResponse::Close)
                .await?;
        }
        Ok(card_view(record, CardMode::Transcript { offset: None }, context))
    }

    /// Appends an admin message, sets `enabled`, then tells the visitor.
    async fn admin_says(&self, visitor_id: &str, text: &str, enabled: bool) -> Result<VisitorRecord, Error> {
        let message = TranscriptMessage::new(SenderType::Admin, text, Utc::now());
        let record = self
            .ledger
            .update(
                visitor_id,
                LedgerUpdate::default()
                    .with_message(message)
                    .with_enabled(enabled),
            )
            .await?;
        notify_bounded(self.notifier.as_ref(), visitor_id, text, self.config.delivery_timeout).await;
        Ok(record)
    }

    /// Free-text admin reply to a card. Nothing is rendered back.
    async fn reply(&self, meta: &ActionMetadata) -> Result<Option<OutboundView>, Error> {
        let Some(text) = meta.text.as_deref().filter(|t| !t.trim().is_empty()) else {
            debug!("Ignoring empty admin reply");
            return Ok(None);
        };
        let message_id = meta
            .reply_to_message_id
            .as_deref()
            .ok_or_else(|| Error::NotFound("reply without a replied-to message".to_string()))?;

        let (record, _) = self.card_for_message(message_id).await?;
        self.admin_says(&record.visitor_id, text, true).await?;
        Ok(None)
    }

    /// A visitor wrote in: store it and post a fresh card to the admins.
    async fn visitor_message(&self, meta: &ActionMetadata) -> Result<OutboundView, Error> {
        let text = meta.text.clone().unwrap_or_default();
        let message = TranscriptMessage::new(SenderType::User, &text, Utc::now());
        let record = self
            .ledger
            .update(&meta.sender_id, LedgerUpdate::default().with_message(message))
            .await?;

        let mode = if self.config.compact_notifications {
            CardMode::LatestUserMessage
        } else {
            CardMode::Transcript { offset: None }
        };
        let view = render::render(&card_view(record, mode, None));
        Ok(view.in_chat(self.config.admin_chat_id.clone()))
    }
}

fn card_view(record: VisitorRecord, mode: CardMode, context: Option<MessageContext>) -> View {
    View::VisitorCard {
        record: Box::new(record),
        mode,
        context,
    }
}
