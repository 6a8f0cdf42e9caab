// src/render/chat_list.rs

use livedesk_common::models::{Button, MessageContext, OutboundView};

use crate::codec::{self, ChatSelector, ChatsNav, NavCommand};
use crate::render::{CHAT_MAX_ROWS, CHAT_ROW_WIDTH, VisitorSummary, paginate};

fn list_payload(selector: ChatSelector, page: usize) -> String {
    codec::encode(&NavCommand::Chats(ChatsNav::list(selector, page)))
}

/// Back target stored on a message when a visitor is opened from a list.
pub fn back_to_list(parent: ChatSelector, page: usize) -> MessageContext {
    MessageContext::with_back(
        format!("↩️ Back to {} chats", parent.name()),
        list_payload(parent, page),
    )
}

pub fn render_list(selector: ChatSelector, visitors: &[VisitorSummary], page: usize) -> OutboundView {
    let page = paginate(visitors, page, CHAT_ROW_WIDTH, CHAT_MAX_ROWS);
    let rows: Vec<Vec<Button>> = page
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| {
                    let nav = ChatsNav::visitor(selector, &v.visitor_id, page.page_index);
                    Button::new(v.display_name.clone(), codec::encode(&NavCommand::Chats(nav)))
                })
                .collect()
        })
        .collect();
    let found = !rows.is_empty();

    let mut view = OutboundView::text(format!(
        "{} chats: {}",
        selector.name(),
        if found { "" } else { "No chats found" }
    ))
    .with_rows(rows);

    if page.total_pages > 1 {
        let mut scroll = Vec::new();
        if page.has_prev {
            scroll.push(Button::new("«", list_payload(selector, page.page_index - 1)));
        }
        if page.has_next {
            scroll.push(Button::new("»", list_payload(selector, page.page_index + 1)));
        }
        view.push_row(scroll);
    }

    view.push_row(vec![
        Button::new("🔄 Refresh", list_payload(selector, page.page_index)),
        Button::new("↩️ Back", codec::encode(&NavCommand::default())),
    ]);
    view
}
