// src/codec/nav.rs
//
// Navigation vocabulary carried inside button payloads.

use livedesk_common::models::LifecycleStage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatSelector {
    Online,
    All,
}

impl ChatSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatSelector::Online => "online",
            ChatSelector::All => "all",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatSelector::Online => "Online",
            ChatSelector::All => "All",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChatSelector::Online => "🟢 Online",
            ChatSelector::All => "🔷 All",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsView {
    #[default]
    Lifecycle,
    Date,
    Report,
}

impl StatsView {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsView::Lifecycle => "lifecycle",
            StatsView::Date => "date",
            StatsView::Report => "report",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleSelector {
    #[default]
    All,
    QualifiedLead,
    Unqualified,
}

impl LifecycleSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleSelector::All => "all",
            LifecycleSelector::QualifiedLead => "qualified-lead",
            LifecycleSelector::Unqualified => "unqualified",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LifecycleSelector::All => "🔷 All",
            LifecycleSelector::QualifiedLead => "✅ Qualified Lead",
            LifecycleSelector::Unqualified => "❌ Unqualified",
        }
    }

    pub fn stage(&self) -> Option<LifecycleStage> {
        match self {
            LifecycleSelector::All => None,
            LifecycleSelector::QualifiedLead => Some(LifecycleStage::Lead),
            LifecycleSelector::Unqualified => Some(LifecycleStage::Unqualified),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateSelector {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
    AllTime,
}

impl DateSelector {
    pub const ALL: [DateSelector; 9] = [
        DateSelector::Today,
        DateSelector::Yesterday,
        DateSelector::ThisWeek,
        DateSelector::LastWeek,
        DateSelector::ThisMonth,
        DateSelector::LastMonth,
        DateSelector::ThisYear,
        DateSelector::LastYear,
        DateSelector::AllTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateSelector::Today => "today",
            DateSelector::Yesterday => "yesterday",
            DateSelector::ThisWeek => "this-week",
            DateSelector::LastWeek => "last-week",
            DateSelector::ThisMonth => "this-month",
            DateSelector::LastMonth => "last-month",
            DateSelector::ThisYear => "this-year",
            DateSelector::LastYear => "last-year",
            DateSelector::AllTime => "all-time",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DateSelector::Today => "Today",
            DateSelector::Yesterday => "Yesterday",
            DateSelector::ThisWeek => "This Week",
            DateSelector::LastWeek => "Last Week",
            DateSelector::ThisMonth => "This Month",
            DateSelector::LastMonth => "Last Month",
            DateSelector::ThisYear => "This Year",
            DateSelector::LastYear => "Last Year",
            DateSelector::AllTime => "All Time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollDirection {
    #[default]
    Start,
    Up,
    Down,
    End,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollDirection::Start => "start",
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
            ScrollDirection::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickResponse {
    Greet,
    Close,
}

impl QuickResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuickResponse::Greet => "greet",
            QuickResponse::Close => "close",
        }
    }
}

/// `chats` command state. All fields absent means the chat menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatsNav {
    pub selector: Option<ChatSelector>,
    /// Selector of the list a visitor was opened from.
    pub parent: Option<ChatSelector>,
    pub visitor_id: Option<String>,
    pub page: usize,
}

impl ChatsNav {
    pub fn list(selector: ChatSelector, page: usize) -> Self {
        Self {
            selector: Some(selector),
            page,
            ..Default::default()
        }
    }

    pub fn visitor(parent: ChatSelector, visitor_id: &str, page: usize) -> Self {
        Self {
            selector: None,
            parent: Some(parent),
            visitor_id: Some(visitor_id.to_string()),
            page,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsNav {
    pub view: StatsView,
    pub lifecycle: LifecycleSelector,
    pub date: Option<DateSelector>,
    /// Report page; see `render::REPORT_PAGES`.
    pub page: usize,
}

/// A decoded button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCommand {
    Chats(ChatsNav),
    Stats(StatsNav),
    Refresh,
    Scroll(ScrollDirection),
    Tag(Option<LifecycleStage>),
    Quick(Option<QuickResponse>),
}

impl Default for NavCommand {
    fn default() -> Self {
        NavCommand::Chats(ChatsNav::default())
    }
}

impl NavCommand {
    pub fn command(&self) -> &'static str {
        match self {
            NavCommand::Chats(_) => "chats",
            NavCommand::Stats(_) => "stats",
            NavCommand::Refresh => "refresh",
            NavCommand::Scroll(_) => "scroll",
            NavCommand::Tag(_) => "tag",
            NavCommand::Quick(_) => "quick",
        }
    }
}
