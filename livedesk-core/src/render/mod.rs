// src/render/mod.rs
//
// Every admin-facing message is described by a `View` and turned into a
// platform-neutral `OutboundView` by the single `render` function.

pub mod card;
pub mod chat_list;
pub mod menu;
pub mod pagination;
pub mod stats_report;

use livedesk_common::models::{Button, MessageContext, OutboundView, Snapshot, VisitorRecord};

use crate::codec::{ChatSelector, DateSelector, LifecycleSelector};

pub use pagination::{Page, paginate};

/// Chat-list entries per row and rows per page.
pub const CHAT_ROW_WIDTH: usize = 4;
pub const CHAT_MAX_ROWS: usize = 10;

/// Messages shown at once on a transcript card.
pub const TRANSCRIPT_WINDOW: usize = 10;

/// Stats reports have two pages: counters and averages, then top lists.
pub const REPORT_PAGES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorSummary {
    pub visitor_id: String,
    pub display_name: String,
}

impl From<&VisitorRecord> for VisitorSummary {
    fn from(record: &VisitorRecord) -> Self {
        Self {
            visitor_id: record.visitor_id.clone(),
            display_name: record.display_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMode {
    /// Full card with a window of the transcript. `None` shows the newest messages.
    Transcript { offset: Option<usize> },
    /// Short notification quoting the visitor's last message.
    LatestUserMessage,
}

#[derive(Debug, Clone)]
pub struct StatsReport {
    pub lifecycle: LifecycleSelector,
    pub date: DateSelector,
    pub snapshot: Snapshot,
    pub funnel_order: Vec<String>,
    pub average_order: Vec<String>,
    pub list_order: Vec<String>,
    pub top_n: usize,
    pub page: usize,
}

#[derive(Debug, Clone)]
pub enum View {
    ChatMenu,
    ChatList {
        selector: ChatSelector,
        visitors: Vec<VisitorSummary>,
        page: usize,
    },
    VisitorCard {
        record: Box<VisitorRecord>,
        mode: CardMode,
        /// Context already registered for the message being edited.
        context: Option<MessageContext>,
    },
    StatsLifecyclePicker,
    StatsDatePicker {
        lifecycle: LifecycleSelector,
    },
    StatsReport(Box<StatsReport>),
}

pub fn render(view: &View) -> OutboundView {
    match view {
        View::ChatMenu => menu::chat_menu(),
        View::ChatList {
            selector,
            visitors,
            page,
        } => chat_list::render_list(*selector, visitors, *page),
        View::VisitorCard {
            record,
            mode,
            context,
        } => card::render_card(record, *mode, context.as_ref()),
        View::StatsLifecyclePicker => menu::lifecycle_picker(),
        View::StatsDatePicker { lifecycle } => menu::date_picker(*lifecycle),
        View::StatsReport(report) => stats_report::render_report(report),
    }
}

/// Appends the back button stored for the message, if any.
pub(crate) fn push_back_button(view: &mut OutboundView, context: Option<&MessageContext>) {
    if let Some(back) = context.and_then(|c| c.back.as_ref()) {
        view.push_row(vec![Button::new(back.title.clone(), back.payload.clone())]);
    }
}
