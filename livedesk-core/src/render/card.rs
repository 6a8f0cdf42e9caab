// src/render/card.rs

use livedesk_common::models::{
    Button, LifecycleStage, MessageContext, OutboundView, SenderType, VisitorRecord,
};

use crate::codec::{self, NavCommand, QuickResponse, ScrollDirection};
use crate::render::{CardMode, TRANSCRIPT_WINDOW, push_back_button};

/// `Brave Otter #1234567`: display name plus the last seven id characters.
pub fn card_title(record: &VisitorRecord) -> String {
    let id = &record.visitor_id;
    let tail: String = id
        .chars()
        .skip(id.chars().count().saturating_sub(7))
        .collect();
    format!("{} #{}", record.display_name(), tail)
}

pub fn status_line(record: &VisitorRecord) -> String {
    let mut status = String::from(if record.online { "🟢 Online" } else { "🔴 Offline" });
    if record.online && record.visible {
        status.push_str(" + 📖 Open");
    }
    if record.online && record.enabled {
        status.push_str(" + ❤️ Live");
    }
    status
}

pub fn lead_status(stage: LifecycleStage) -> &'static str {
    match stage {
        LifecycleStage::Lead => "✅ Qualified Lead",
        LifecycleStage::Subscriber => "🆕 New Visitor",
        LifecycleStage::Unqualified => "❌ Unqualified",
    }
}

fn meta_or_unknown<'a>(record: &'a VisitorRecord, path: &[&str]) -> &'a str {
    record.metadata_str(path).unwrap_or("?")
}

fn last_offset(len: usize) -> usize {
    len.saturating_sub(TRANSCRIPT_WINDOW)
}

/// Moves a transcript window one step in `direction`.
pub fn scroll_offset(len: usize, current: Option<usize>, direction: ScrollDirection) -> usize {
    let last = last_offset(len);
    let current = current.unwrap_or(last).min(last);
    match direction {
        ScrollDirection::Start => 0,
        ScrollDirection::Up => current.saturating_sub(TRANSCRIPT_WINDOW),
        ScrollDirection::Down => (current + TRANSCRIPT_WINDOW).min(last),
        ScrollDirection::End => last,
    }
}

fn scroll_row(len: usize, offset: usize) -> Vec<Button> {
    if len <= TRANSCRIPT_WINDOW {
        return Vec::new();
    }
    let mut row = Vec::new();
    if offset > 0 {
        row.push(Button::new("⏫", codec::encode(&NavCommand::Scroll(ScrollDirection::Start))));
        row.push(Button::new("🔼", codec::encode(&NavCommand::Scroll(ScrollDirection::Up))));
    }
    if offset < last_offset(len) {
        row.push(Button::new("🔽", codec::encode(&NavCommand::Scroll(ScrollDirection::Down))));
        row.push(Button::new("⏬", codec::encode(&NavCommand::Scroll(ScrollDirection::End))));
    }
    row
}

fn transcript_card(record: &VisitorRecord, offset: Option<usize>) -> (OutboundView, usize) {
    let len = record.messages.len();
    let offset = offset.unwrap_or(usize::MAX).min(last_offset(len));

    let mut text = format!("Chat with {}\n\n", card_title(record));
    for message in record.messages.iter().skip(offset).take(TRANSCRIPT_WINDOW) {
        text.push_str(&format!("{}: {}\n", message.sender_type.label(), message.text));
    }

    let form_factor = record.metadata_str(&["wurfl_data", "form_factor"]);
    let device = match form_factor {
        Some(ff) => format!("{} ({})", ff, meta_or_unknown(record, &["wurfl_data", "complete_device_name"])),
        None => "?".to_string(),
    };

    text.push_str(&format!(
        "\nStatus: {}\nLocation: {}, {}\nLead Status: {}\nDevice: {}\nBrowser: {} {}\nReferrer: {}\nSessions: {}\n",
        status_line(record),
        meta_or_unknown(record, &["location_data", "city"]),
        meta_or_unknown(record, &["location_data", "country"]),
        lead_status(record.lifecycle_stage()),
        device,
        meta_or_unknown(record, &["browser_data", "browserName"]),
        meta_or_unknown(record, &["browser_data", "fullVersion"]),
        meta_or_unknown(record, &["referrer_data", "referrer"]),
        record.sessions.len(),
    ));

    let mut view = OutboundView::text(text).with_rows(vec![
        vec![Button::new("🔄 Refresh", codec::encode(&NavCommand::Refresh))],
        vec![
            Button::new("🙋 Greet", codec::encode(&NavCommand::Quick(Some(QuickResponse::Greet)))),
            Button::new("👋 Close", codec::encode(&NavCommand::Quick(Some(QuickResponse::Close)))),
        ],
        vec![
            Button::new("✅ Qualified Lead", codec::encode(&NavCommand::Tag(Some(LifecycleStage::Lead)))),
            Button::new("❌ Unqualified", codec::encode(&NavCommand::Tag(Some(LifecycleStage::Unqualified)))),
        ],
    ]);
    view.push_row(scroll_row(len, offset));
    (view, offset)
}

fn latest_message_card(record: &VisitorRecord) -> OutboundView {
    let text = record
        .messages
        .iter()
        .rev()
        .find(|m| m.sender_type == SenderType::User)
        .map(|m| format!("{}\n\nSent by {}", m.text, card_title(record)))
        .unwrap_or_default();

    OutboundView::text(text).with_rows(vec![vec![Button::new(
        "🔍 Expand",
        codec::encode(&NavCommand::Refresh),
    )]])
}

/// Renders a visitor card. The returned view carries the context to store
/// for its message: visitor, transcript offset and any existing back target.
pub fn render_card(
    record: &VisitorRecord,
    mode: CardMode,
    context: Option<&MessageContext>,
) -> OutboundView {
    let (mut view, offset) = match mode {
        CardMode::Transcript { offset } => transcript_card(record, offset),
        CardMode::LatestUserMessage => (
            latest_message_card(record),
            last_offset(record.messages.len()),
        ),
    };
    push_back_button(&mut view, context);

    let mut next = MessageContext::for_visitor(&record.visitor_id, offset);
    next.back = context.and_then(|c| c.back.clone());
    view.context = Some(next);
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use livedesk_common::models::{LedgerUpdate, TranscriptMessage};
    use serde_json::{Map, json};

    fn record_with_messages(n: usize) -> VisitorRecord {
        let now = Utc::now();
        let mut rec = VisitorRecord::new("visitor-000-abcdefg", "Swift Otter", now);
        for i in 0..n {
            let sender = if i % 2 == 0 { SenderType::User } else { SenderType::Admin };
            rec.apply(
                LedgerUpdate::default().with_message(TranscriptMessage::new(sender, &format!("m{i}"), now)),
                now,
            );
        }
        rec
    }

    #[test]
    fn test_status_line_flags() {
        let mut rec = record_with_messages(0);
        assert_eq!(status_line(&rec), "🔴 Offline");
        rec.visible = true;
        rec.enabled = true;
        assert_eq!(status_line(&rec), "🔴 Offline");
        rec.online = true;
        assert_eq!(status_line(&rec), "🟢 Online + 📖 Open + ❤️ Live");
    }

    #[test]
    fn test_transcript_card_text() {
        let mut rec = record_with_messages(2);
        let mut meta = Map::new();
        meta.insert("location_data".into(), json!({"city": "Pune", "country": "India"}));
        meta.insert("wurfl_data".into(), json!({"form_factor": "Desktop"}));
        rec.apply(LedgerUpdate::default().with_metadata(meta), Utc::now());

        let view = render_card(&rec, CardMode::Transcript { offset: None }, None);
        assert!(view.text.starts_with("Chat with Swift Otter #abcdefg\n\nUser: m0\nAdmin: m1\n"));
        assert!(view.text.contains("Location: Pune, India\n"));
        assert!(view.text.contains("Lead Status: 🆕 New Visitor\n"));
        assert!(view.text.contains("Device: Desktop (?)\n"));
        assert!(view.text.contains("Browser: ? ?\n"));
        assert!(view.text.contains("Sessions: 0\n"));
        assert_eq!(view.buttons.len(), 3);
        assert_eq!(view.buttons[2][0].payload, r#"/tag{"d":"lead"}"#);
    }

    #[test]
    fn test_back_button_only_from_context() {
        let rec = record_with_messages(1);
        let without = render_card(&rec, CardMode::Transcript { offset: None }, None);
        assert!(without.all_buttons().all(|b| !b.title.starts_with("↩️")));
        assert!(without.context.as_ref().unwrap().back.is_none());

        let ctx = MessageContext::with_back("↩️ Back to All chats", r#"/chats{"s":"all"}"#);
        let with = render_card(&rec, CardMode::Transcript { offset: None }, Some(&ctx));
        let last = with.buttons.last().unwrap();
        assert_eq!(last[0].title, "↩️ Back to All chats");
        let carried = with.context.unwrap();
        assert_eq!(carried.back, ctx.back);
        assert_eq!(carried.visitor_id.as_deref(), Some("visitor-000-abcdefg"));
    }

    #[test]
    fn test_transcript_window_and_scroll() {
        let rec = record_with_messages(25);
        let view = render_card(&rec, CardMode::Transcript { offset: None }, None);
        assert!(view.text.contains("m24"));
        assert!(!view.text.contains("m14\n"));
        assert_eq!(view.context.as_ref().unwrap().transcript_offset, Some(15));

        let titles: Vec<&str> = view.buttons[3].iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["⏫", "🔼"]);

        assert_eq!(scroll_offset(25, Some(15), ScrollDirection::Up), 5);
        assert_eq!(scroll_offset(25, Some(5), ScrollDirection::Up), 0);
        assert_eq!(scroll_offset(25, Some(5), ScrollDirection::Down), 15);
        assert_eq!(scroll_offset(25, None, ScrollDirection::Start), 0);
        assert_eq!(scroll_offset(3, Some(0), ScrollDirection::End), 0);
    }

    #[test]
    fn test_latest_user_message_mode() {
        let rec = record_with_messages(4);
        let view = render_card(&rec, CardMode::LatestUserMessage, None);
        assert_eq!(view.text, "m2\n\nSent by Swift Otter #abcdefg");
        assert_eq!(view.buttons[0][0].title, "🔍 Expand");
        assert_eq!(view.buttons[0][0].payload, "/refresh");
    }
}
