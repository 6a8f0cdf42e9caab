// File: livedesk-core/tests/admin_dispatch_tests.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use livedesk_core::codec;
use livedesk_core::config::{DeskConfig, StatsConfig};
use livedesk_core::delivery::{Transport, VisitorNotifier};
use livedesk_core::models::visitor::ENABLE_LIVECHAT_LABEL;
use livedesk_core::models::{
    ActionInvocation, ActionMetadata, LedgerUpdate, MessageContext, OutboundView, SenderType,
};
use livedesk_core::repositories::{
    InMemoryLivechatRepository, InMemoryMessageContextRepository, MessageContextRepository,
};
use livedesk_core::services::{AdminActionService, LedgerService, StatsService};
use livedesk_core::Error;

mock! {
    pub Outbox {}

    #[async_trait]
    impl Transport for Outbox {
        async fn deliver(&self, view: &OutboundView) -> Result<Option<String>, Error>;
    }
}

mock! {
    pub Widget {}

    #[async_trait]
    impl VisitorNotifier for Widget {
        async fn notify(&self, visitor_id: &str, text: &str) -> Result<(), Error>;
    }
}

const ADMIN_CHAT: &str = "admins";

struct Desk {
    service: AdminActionService,
    ledger: Arc<LedgerService>,
    contexts: Arc<InMemoryMessageContextRepository>,
    sent: Arc<Mutex<Vec<OutboundView>>>,
}

/// Transport that records every view. Edits keep their message id; new
/// messages get `msg-N`.
fn recording_outbox(sent: Arc<Mutex<Vec<OutboundView>>>) -> MockOutbox {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut outbox = MockOutbox::new();
    outbox.expect_deliver().returning(move |view| {
        sent.lock().unwrap().push(view.clone());
        let id = view
            .target_message_id
            .clone()
            .unwrap_or_else(|| format!("msg-{}", counter.fetch_add(1, Ordering::SeqCst)));
        Ok(Some(id))
    });
    outbox
}

fn desk_with(widget: MockWidget) -> Desk {
    desk_configured(widget, DeskConfig::default())
}

fn desk_configured(widget: MockWidget, config: DeskConfig) -> Desk {
    let repo = Arc::new(InMemoryLivechatRepository::new());
    let ledger = Arc::new(LedgerService::new(repo.clone()));
    let stats = Arc::new(StatsService::new(repo, StatsConfig::default()));
    let contexts = Arc::new(InMemoryMessageContextRepository::new());
    let sent = Arc::new(Mutex::new(Vec::new()));

    let config = DeskConfig {
        admin_chat_id: ADMIN_CHAT.to_string(),
        ..config
    };
    let service = AdminActionService::new(
        ledger.clone(),
        stats,
        contexts.clone(),
        Arc::new(recording_outbox(sent.clone())),
        Arc::new(widget),
        config,
    );

    Desk {
        service,
        ledger,
        contexts,
        sent,
    }
}

fn desk() -> Desk {
    desk_with(MockWidget::new())
}

fn press(payload: &str, message_id: &str) -> ActionInvocation {
    let (intent, entities) = codec::try_split(payload).unwrap();
    ActionInvocation::new(
        &intent,
        entities,
        ActionMetadata {
            sender_id: "admin-1".into(),
            sender_name: Some("Asha".into()),
            callback_message_id: Some(message_id.to_string()),
            ..Default::default()
        },
    )
}

fn visitor_writes(visitor_id: &str, text: &str) -> ActionInvocation {
    ActionInvocation::new(
        "livechat_message",
        Default::default(),
        ActionMetadata {
            sender_id: visitor_id.into(),
            text: Some(text.into()),
            ..Default::default()
        },
    )
}

fn button_payload(view: &OutboundView, title: &str) -> String {
    view.all_buttons()
        .find(|b| b.title == title)
        .map(|b| b.payload.clone())
        .unwrap_or_else(|| panic!("no '{title}' button in {view:?}"))
}

#[tokio::test]
async fn test_offline_visitor_enabled_is_not_live() {
    let desk = desk_with({
        let mut widget = MockWidget::new();
        widget
            .expect_notify()
            .withf(|id, text| id == "visitor-v" && text.contains("Asha from Rappo"))
            .times(1)
            .returning(|_, _| Ok(()));
        widget
    });

    let card = desk
        .service
        .handle(&visitor_writes("visitor-v", "hello?"))
        .await
        .unwrap();
    assert_eq!(card.target_chat_id.as_deref(), Some(ADMIN_CHAT));
    assert!(!card.is_edit());

    let rec = desk.ledger.get_required("visitor-v").await.unwrap();
    assert!(!rec.online);
    assert_eq!(rec.messages.len(), 1);
    assert_eq!(rec.user_metadata["lifecycle_stage"], "subscriber");

    // the card went out as msg-0; the admin greets from it
    let greet = button_payload(&card, "🙋 Greet");
    let view = desk.service.handle(&press(&greet, "msg-0")).await.unwrap();

    let rec = desk.ledger.get_required("visitor-v").await.unwrap();
    assert!(rec.enabled);
    let enables: Vec<_> = rec
        .events
        .iter()
        .filter(|e| e.label == ENABLE_LIVECHAT_LABEL)
        .collect();
    assert_eq!(enables.len(), 1);
    assert_eq!(enables[0].value, Value::Bool(true));

    assert_eq!(view.target_message_id.as_deref(), Some("msg-0"));
    assert!(view.text.contains("Status: 🔴 Offline\n"));
    assert!(!view.text.contains("❤️ Live"));
}

#[tokio::test]
async fn test_compact_notification_expands_to_card() {
    let desk = desk_configured(
        MockWidget::new(),
        DeskConfig {
            compact_notifications: true,
            ..Default::default()
        },
    );
    desk.service.handle(&visitor_writes("v-q", "first")).await.unwrap();
    let note = desk
        .service
        .handle(&visitor_writes("v-q", "is anyone there?"))
        .await
        .unwrap();

    assert_eq!(note.target_chat_id.as_deref(), Some(ADMIN_CHAT));
    assert!(note.text.starts_with("is anyone there?\n\nSent by "));
    assert!(note.all_buttons().all(|b| b.title != "🙋 Greet"));

    // second post went out as msg-1; expanding edits it into the full card
    let expand = button_payload(&note, "🔍 Expand");
    let card = desk.service.handle(&press(&expand, "msg-1")).await.unwrap();
    assert_eq!(card.target_message_id.as_deref(), Some("msg-1"));
    assert!(card.text.contains("#v-q"));
    button_payload(&card, "🙋 Greet");
}

#[tokio::test]
async fn test_unknown_message_degrades_to_menu() {
    let desk = desk();
    let view = desk.service.handle(&press("/refresh", "nobody-knows")).await.unwrap();

    assert_eq!(view.text, "Select which chats you want to see:");
    assert_eq!(view.target_message_id.as_deref(), Some("nobody-knows"));
}

#[tokio::test]
async fn test_malformed_payload_shows_menu() {
    let desk = desk();
    let mut inv = press("/chats", "m1");
    inv.entities.insert("s".into(), Value::from(17));
    let view = desk.service.handle(&inv).await.unwrap();
    assert_eq!(view.text, "Select which chats you want to see:");
}

#[tokio::test]
async fn test_drill_in_keeps_back_target() {
    let desk = desk();
    for id in ["v-a", "v-b"] {
        desk.ledger
            .update(id, LedgerUpdate::default().with_online(true))
            .await
            .unwrap();
    }

    let list = desk.service.handle(&press("/chats{\"s\":\"online\"}", "m1")).await.unwrap();
    assert!(list.text.starts_with("Online chats: "));
    let visitor_button = list
        .all_buttons()
        .find(|b| b.payload.contains("\"u\":\"v-a\""))
        .cloned()
        .unwrap();

    let card = desk.service.handle(&press(&visitor_button.payload, "m1")).await.unwrap();
    assert!(card.text.contains("#v-a"));
    let back = button_payload(&card, "↩️ Back to Online chats");
    assert_eq!(codec::decode(&back), codec::decode("/chats{\"s\":\"online\"}"));

    // refresh on the same message still finds both the visitor and the back target
    let refreshed = desk.service.handle(&press("/refresh", "m1")).await.unwrap();
    assert!(refreshed.text.contains("#v-a"));
    button_payload(&refreshed, "↩️ Back to Online chats");

    let stored = desk.contexts.get("m1").await.unwrap().unwrap();
    assert_eq!(stored.visitor_id.as_deref(), Some("v-a"));
}

#[tokio::test]
async fn test_context_put_overwrites() {
    let desk = desk();
    desk.contexts
        .put("m9", &MessageContext::for_visitor("first", 0))
        .await
        .unwrap();
    desk.contexts
        .put("m9", &MessageContext::for_visitor("second", 3))
        .await
        .unwrap();

    let ctx = desk.contexts.get("m9").await.unwrap().unwrap();
    assert_eq!(ctx.visitor_id.as_deref(), Some("second"));
    assert_eq!(ctx.transcript_offset, Some(3));
}

#[tokio::test]
async fn test_tag_updates_lifecycle() {
    let desk = desk();
    let card = desk.service.handle(&visitor_writes("v-t", "pricing?")).await.unwrap();

    let tag = button_payload(&card, "✅ Qualified Lead");
    let view = desk.service.handle(&press(&tag, "msg-0")).await.unwrap();

    let rec = desk.ledger.get_required("v-t").await.unwrap();
    assert_eq!(rec.user_metadata["lifecycle_stage"], "lead");
    assert!(view.text.contains("Lead Status: ✅ Qualified Lead"));
}

#[tokio::test]
async fn test_close_disables_livechat() {
    let desk = desk_with({
        let mut widget = MockWidget::new();
        widget
            .expect_notify()
            .withf(|_, text| text.starts_with("Thank you for chatting with us."))
            .times(1)
            .returning(|_, _| Ok(()));
        widget
    });
    desk.service.handle(&visitor_writes("v-c", "bye")).await.unwrap();
    desk.ledger
        .update("v-c", LedgerUpdate::default().with_enabled(true))
        .await
        .unwrap();

    desk.service
        .handle(&press("/quick{\"d\":\"close\"}", "msg-0"))
        .await
        .unwrap();

    let rec = desk.ledger.get_required("v-c").await.unwrap();
    assert!(!rec.enabled);
    let last = rec.messages.last().unwrap();
    assert_eq!(last.sender_type, SenderType::Admin);
}

#[tokio::test]
async fn test_reply_notifies_visitor_without_view() {
    let desk = desk_with({
        let mut widget = MockWidget::new();
        widget
            .expect_notify()
            .withf(|id, text| id == "v-r" && text == "We can help with that")
            .times(1)
            .returning(|_, _| Err(Error::TransportDelivery("widget down".into())));
        widget
    });
    desk.service.handle(&visitor_writes("v-r", "help")).await.unwrap();
    let before = desk.sent.lock().unwrap().len();

    let reply = ActionInvocation::new(
        "reply",
        Default::default(),
        ActionMetadata {
            sender_id: "admin-1".into(),
            text: Some("We can help with that".into()),
            reply_to_message_id: Some("msg-0".into()),
            ..Default::default()
        },
    );
    assert!(desk.service.handle(&reply).await.is_none());
    assert_eq!(desk.sent.lock().unwrap().len(), before);

    // the ledger write stands even though the widget call failed
    let rec = desk.ledger.get_required("v-r").await.unwrap();
    assert!(rec.enabled);
    assert_eq!(rec.messages.len(), 2);
    assert_eq!(rec.messages[1].text, "We can help with that");
}

#[tokio::test]
async fn test_stats_navigation_reaches_report() {
    let desk = desk();
    desk.ledger
        .update("v-s", LedgerUpdate::default().with_online(true))
        .await
        .unwrap();

    let picker = desk.service.handle(&press("/stats{\"v\":\"lifecycle\"}", "s1")).await.unwrap();
    let leads = button_payload(&picker, "✅ Qualified Lead");

    let dates = desk.service.handle(&press(&leads, "s1")).await.unwrap();
    assert!(dates.text.contains("✅ Qualified Lead"));
    let all_time = dates
        .all_buttons()
        .find(|b| b.payload.contains("all-time"))
        .cloned()
        .unwrap();

    let report = desk.service.handle(&press(&all_time.payload, "s1")).await.unwrap();
    assert_eq!(report.target_message_id.as_deref(), Some("s1"));
    assert!(report.text.starts_with("Stats for ✅ Qualified Lead for All Time:"));
    assert!(report.text.contains("Total Users: 0\n"));
    assert!(!report.text.contains('%'));

    // the second page keeps both the filter and the date
    let lists = desk
        .service
        .handle(&press(&button_payload(&report, "Top lists »"), "s1"))
        .await
        .unwrap();
    assert!(lists.text.starts_with("Stats for ✅ Qualified Lead for All Time:"));
    assert!(!lists.text.contains("Total Users"));

    let counters = desk
        .service
        .handle(&press(&button_payload(&lists, "« Counters"), "s1"))
        .await
        .unwrap();
    assert_eq!(counters.text, report.text);
}
